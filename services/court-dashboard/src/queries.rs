//! Cached reads of the scheduler backend

use std::sync::Arc;

use court_api::{
    ApiClient, ApiError, HealthCheckResponse, Schedule, ScheduleId, SchedulerStatusResponse,
    SchedulesFilters, StatsResponse, TokenStatusResponse,
};

use crate::config::PollingConfig;
use crate::poller;
use crate::query::{QueryClient, QueryKey, QueryObserver, QueryPolicy};

/// Backend reads routed through the shared query cache
#[derive(Debug, Clone)]
pub struct Queries {
    client: QueryClient,
    api: ApiClient,
    health_policy: QueryPolicy,
    scheduler_status_policy: QueryPolicy,
}

impl Queries {
    pub fn new(client: QueryClient, api: ApiClient) -> Self {
        Self {
            client,
            api,
            health_policy: QueryPolicy::health(),
            scheduler_status_policy: QueryPolicy::scheduler_status(),
        }
    }

    /// Override the background refetch cadence of the polled queries
    pub fn with_polling(mut self, polling: &PollingConfig) -> Self {
        self.health_policy = self
            .health_policy
            .with_refetch_interval(Some(polling.health_interval));
        self.scheduler_status_policy = self
            .scheduler_status_policy
            .with_refetch_interval(Some(polling.scheduler_status_interval));
        self
    }

    pub fn client(&self) -> &QueryClient {
        &self.client
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn health_policy(&self) -> QueryPolicy {
        self.health_policy
    }

    pub async fn health(&self) -> Result<Arc<HealthCheckResponse>, ApiError> {
        let api = self.api.clone();
        self.client
            .fetch_query(QueryKey::health(), self.health_policy, move || {
                let api = api.clone();
                async move { api.health().await }
            })
            .await
    }

    pub async fn schedules(
        &self,
        filters: SchedulesFilters,
    ) -> Result<Arc<Vec<Schedule>>, ApiError> {
        let api = self.api.clone();
        let key = QueryKey::schedules_list(&filters);
        self.client
            .fetch_query(key, QueryPolicy::schedules(), move || {
                let api = api.clone();
                let filters = filters.clone();
                async move { api.list_schedules(&filters).await }
            })
            .await
    }

    pub async fn upcoming_schedules(
        &self,
        days: Option<u32>,
    ) -> Result<Arc<Vec<Schedule>>, ApiError> {
        let api = self.api.clone();
        self.client
            .fetch_query(QueryKey::schedules_upcoming(days), QueryPolicy::schedules(), move || {
                let api = api.clone();
                async move { api.upcoming_schedules(days).await }
            })
            .await
    }

    pub async fn schedule(&self, id: ScheduleId) -> Result<Arc<Schedule>, ApiError> {
        let api = self.api.clone();
        self.client
            .fetch_query(QueryKey::schedules_detail(id), QueryPolicy::schedules(), move || {
                let api = api.clone();
                async move { api.get_schedule(id).await }
            })
            .await
    }

    pub async fn stats(&self) -> Result<Arc<StatsResponse>, ApiError> {
        let api = self.api.clone();
        self.client
            .fetch_query(QueryKey::stats(), QueryPolicy::stats(), move || {
                let api = api.clone();
                async move { api.stats().await }
            })
            .await
    }

    pub async fn scheduler_status(&self) -> Result<Arc<SchedulerStatusResponse>, ApiError> {
        let api = self.api.clone();
        self.client
            .fetch_query(
                QueryKey::scheduler_status(),
                self.scheduler_status_policy,
                move || {
                    let api = api.clone();
                    async move { api.scheduler_status().await }
                },
            )
            .await
    }

    pub async fn token_status(&self) -> Result<Arc<TokenStatusResponse>, ApiError> {
        let api = self.api.clone();
        self.client
            .fetch_query(QueryKey::token_status(), QueryPolicy::token_status(), move || {
                let api = api.clone();
                async move { api.token_status().await }
            })
            .await
    }

    /// Observe health and keep it refreshed in the background
    ///
    /// Polling stops when the returned observer is dropped.
    pub async fn watch_health(&self) -> QueryObserver {
        let observer = self.client.observe(QueryKey::health());
        if let Err(e) = self.health().await {
            tracing::warn!("Initial health check failed: {}", e);
        }
        if let Some(interval) = self.health_policy.refetch_interval {
            poller::spawn_refetch_loop(
                self.client.clone(),
                QueryKey::health(),
                interval,
                observer.cancellation_token(),
            );
        }
        observer
    }

    /// Observe scheduler status and keep it refreshed in the background
    pub async fn watch_scheduler_status(&self) -> QueryObserver {
        let observer = self.client.observe(QueryKey::scheduler_status());
        if let Err(e) = self.scheduler_status().await {
            tracing::warn!("Initial scheduler status fetch failed: {}", e);
        }
        if let Some(interval) = self.scheduler_status_policy.refetch_interval {
            poller::spawn_refetch_loop(
                self.client.clone(),
                QueryKey::scheduler_status(),
                interval,
                observer.cancellation_token(),
            );
        }
        observer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use court_api::{CourtId, Method, MockBackend};
    use serde_json::json;
    use std::time::Duration;

    use crate::query::make_query_client;

    fn queries(backend: &MockBackend) -> Queries {
        let api = ApiClient::new("http://scheduler.test", Arc::new(backend.clone()));
        Queries::new(make_query_client(), api)
    }

    fn health_body() -> serde_json::Value {
        json!({
            "status": "healthy",
            "service": "tennis-scheduler",
            "timestamp": "2026-01-01T00:00:00Z"
        })
    }

    #[tokio::test(start_paused = true)]
    async fn health_is_fetched_once_within_stale_time() {
        let backend = MockBackend::new();
        backend.respond_json(Method::Get, "/api/health", &health_body());
        let queries = queries(&backend);

        let first = queries.health().await.unwrap();
        tokio::time::advance(Duration::from_secs(20)).await;
        let second = queries.health().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(backend.request_count(Method::Get, "/api/health"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn filtered_lists_are_cached_separately() {
        let backend = MockBackend::new();
        backend.respond_json(Method::Get, "/api/schedules?court_id=1", &json!([]));
        backend.respond_json(Method::Get, "/api/schedules?court_id=2", &json!([]));
        let queries = queries(&backend);

        queries
            .schedules(SchedulesFilters::default().with_court(CourtId::One))
            .await
            .unwrap();
        queries
            .schedules(SchedulesFilters::default().with_court(CourtId::Two))
            .await
            .unwrap();
        queries
            .schedules(SchedulesFilters::default().with_court(CourtId::One))
            .await
            .unwrap();

        assert_eq!(backend.request_count(Method::Get, "/api/schedules?court_id=1"), 1);
        assert_eq!(backend.request_count(Method::Get, "/api/schedules?court_id=2"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn upcoming_without_days_shares_the_seven_day_entry() {
        let backend = MockBackend::new();
        backend.respond_json(Method::Get, "/api/schedules/upcoming?days=7", &json!([]));
        let queries = queries(&backend);

        queries.upcoming_schedules(None).await.unwrap();
        queries.upcoming_schedules(Some(7)).await.unwrap();

        assert_eq!(backend.request_count(Method::Get, "/api/schedules/upcoming?days=7"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_schedule_fails_without_retry() {
        let backend = MockBackend::new();
        let queries = queries(&backend);

        let err = queries.schedule(404).await.unwrap_err();

        assert_eq!(err.status(), Some(404));
        assert_eq!(backend.request_count(Method::Get, "/api/schedules/404"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn polling_refreshes_observed_health() {
        let backend = MockBackend::new();
        backend.respond_json(Method::Get, "/api/health", &health_body());
        let queries = queries(&backend);

        let observer = queries.watch_health().await;
        assert_eq!(backend.request_count(Method::Get, "/api/health"), 1);

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(backend.request_count(Method::Get, "/api/health"), 3);

        drop(observer);
        tokio::time::sleep(Duration::from_secs(90)).await;
        assert_eq!(backend.request_count(Method::Get, "/api/health"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn polling_interval_follows_config() {
        let backend = MockBackend::new();
        backend.respond_json(
            Method::Get,
            "/api/scheduler/status",
            &json!({"is_running": true, "total_jobs": 0, "jobs": []}),
        );
        let polling = PollingConfig {
            scheduler_status_interval: Duration::from_secs(10),
            ..PollingConfig::default()
        };
        let queries = queries(&backend).with_polling(&polling);

        let _observer = queries.watch_scheduler_status().await;
        tokio::time::sleep(Duration::from_secs(35)).await;

        assert_eq!(backend.request_count(Method::Get, "/api/scheduler/status"), 4);
    }
}
