//! Writes against the scheduler backend
//!
//! Mutations are never retried and go straight to the backend. The ones
//! that change cached resources update the cache on success.

use std::sync::Arc;

use court_api::{
    ApiClient, ApiError, CancelScheduleResponse, HealthCheckResponse, Method, ScheduleId,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::queries::Queries;
use crate::query::QueryKey;

type SuccessCallback<T, V> = Box<dyn Fn(&T, &V) + Send + Sync>;
type ErrorCallback<V> = Box<dyn Fn(&ApiError, &V) + Send + Sync>;

impl Queries {
    /// Fetch health now and store it as fresh, bypassing the cache
    ///
    /// On failure the cached entry is left as it was.
    pub async fn refresh_health(&self) -> Result<Arc<HealthCheckResponse>, ApiError> {
        match self.api().health().await {
            Ok(health) => {
                tracing::debug!("Manual health check: {}", health.status);
                Ok(self
                    .client()
                    .set_query_data(QueryKey::health(), health, self.health_policy()))
            }
            Err(e) => {
                tracing::error!("Manual health check failed: {}", e);
                Err(e)
            }
        }
    }

    /// Cancel a schedule, then invalidate schedule lists and stats and drop
    /// the schedule's detail entry
    pub async fn cancel_schedule(
        &self,
        id: ScheduleId,
    ) -> Result<CancelScheduleResponse, ApiError> {
        let confirmation = self.api().cancel_schedule(id).await?;
        tracing::info!("Cancelled schedule {}", id);
        self.client().invalidate_queries(&QueryKey::schedules());
        self.client().invalidate_queries(&QueryKey::stats());
        self.client().remove_queries(&QueryKey::schedules_detail(id));
        Ok(confirmation)
    }

    /// `POST` mutation against an arbitrary endpoint
    pub fn create_mutation<T, V>(&self, endpoint: impl Into<String>) -> Mutation<T, V> {
        Mutation::new(self.api().clone(), Method::Post, endpoint)
    }

    /// `PUT` mutation against an arbitrary endpoint
    pub fn update_mutation<T, V>(&self, endpoint: impl Into<String>) -> Mutation<T, V> {
        Mutation::new(self.api().clone(), Method::Put, endpoint)
    }
}

/// A write that sends its variables as the JSON body
///
/// Variables that serialize to `null`, such as `()` or `None`, send no body.
/// Does not touch the query cache.
pub struct Mutation<T, V> {
    api: ApiClient,
    method: Method,
    endpoint: String,
    on_success: Option<SuccessCallback<T, V>>,
    on_error: Option<ErrorCallback<V>>,
}

impl<T, V> Mutation<T, V> {
    fn new(api: ApiClient, method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            api,
            method,
            endpoint: endpoint.into(),
            on_success: None,
            on_error: None,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn on_success(mut self, callback: impl Fn(&T, &V) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Box::new(callback));
        self
    }

    pub fn on_error(mut self, callback: impl Fn(&ApiError, &V) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Box::new(callback));
        self
    }
}

impl<T: DeserializeOwned, V: Serialize + Sync> Mutation<T, V> {
    pub async fn mutate(&self, variables: V) -> Result<T, ApiError> {
        let result = self.send(&variables).await;
        match &result {
            Ok(data) => {
                if let Some(callback) = &self.on_success {
                    callback(data, &variables);
                }
            }
            Err(e) => {
                tracing::warn!("{} {} failed: {}", self.method, self.endpoint, e);
                if let Some(callback) = &self.on_error {
                    callback(e, &variables);
                }
            }
        }
        result
    }

    async fn send(&self, variables: &V) -> Result<T, ApiError> {
        let body = serde_json::to_value(variables).map_err(|e| {
            ApiError::unavailable(format!("Failed to encode mutation variables: {}", e))
        })?;
        let body = (!body.is_null()).then_some(&body);
        match self.method {
            Method::Put => self.api.put(&self.endpoint, body).await,
            _ => self.api.post(&self.endpoint, body).await,
        }
    }
}
