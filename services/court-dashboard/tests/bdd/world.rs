//! BDD test world for court dashboard

use std::sync::Arc;

use court_api::{ApiClient, ApiError, HealthCheckResponse, MockBackend, Schedule};
use court_dashboard::{make_query_client, Queries};
use cucumber::World;

#[derive(Debug, Default, World)]
pub struct DashboardWorld {
    pub backend: MockBackend,
    queries: Option<Queries>,

    // Query results
    pub health_reads: Vec<Arc<HealthCheckResponse>>,
    pub last_schedules: Option<Arc<Vec<Schedule>>>,
    pub last_error: Option<ApiError>,

    // Dashboard testing
    pub dashboard_response_body: Option<String>,
}

impl DashboardWorld {
    /// Queries against the scripted backend, created on first use
    pub fn queries(&mut self) -> Queries {
        let backend = self.backend.clone();
        self.queries
            .get_or_insert_with(|| {
                let api = ApiClient::new("http://scheduler.test", Arc::new(backend));
                Queries::new(make_query_client(), api)
            })
            .clone()
    }

    pub fn record<T>(&mut self, result: Result<T, ApiError>) -> Option<T> {
        match result {
            Ok(value) => {
                self.last_error = None;
                Some(value)
            }
            Err(e) => {
                self.last_error = Some(e);
                None
            }
        }
    }
}
