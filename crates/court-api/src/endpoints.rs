//! Typed endpoint functions, one per backend operation

use serde::Deserialize;

use crate::error::{ApiError, Result};
use crate::io::Method;
use crate::request::{ApiClient, RequestOptions};
use crate::types::{
    CancelScheduleResponse, HealthCheckResponse, HealthStatus, Schedule, ScheduleId,
    SchedulerState, SchedulerStatusResponse, SchedulesFilters, StatsResponse,
    TokenStatusResponse,
};

pub const HEALTH: &str = "/api/health";
pub const SCHEDULES: &str = "/api/schedules";
pub const SCHEDULES_UPCOMING: &str = "/api/schedules/upcoming";
pub const STATS: &str = "/api/stats";
pub const SCHEDULER_STATUS: &str = "/api/scheduler/status";
pub const TOKEN_STATUS: &str = "/api/token/status";

/// Look-ahead window for upcoming schedules when none is given
pub const DEFAULT_UPCOMING_DAYS: u32 = 7;

/// Message of every health failure that is not already an [`ApiError`]
pub const HEALTH_FAILURE_MESSAGE: &str = "Failed to fetch health status";

/// Health payload as the backend sends it; every field may be missing
#[derive(Debug, Deserialize)]
struct RawHealthResponse {
    #[serde(default)]
    status: Option<HealthStatus>,
    #[serde(default)]
    service: Option<String>,
    #[serde(default)]
    scheduler_status: Option<SchedulerState>,
    #[serde(default)]
    scheduled_jobs: Option<u32>,
    #[serde(default)]
    timestamp: Option<String>,
}

pub fn schedule_path(id: ScheduleId) -> String {
    format!("{}/{}", SCHEDULES, id)
}

pub fn schedules_path(filters: &SchedulesFilters) -> String {
    format!("{}{}", SCHEDULES, filters.to_query_string())
}

pub fn upcoming_path(days: Option<u32>) -> String {
    format!(
        "{}?days={}",
        SCHEDULES_UPCOMING,
        days.unwrap_or(DEFAULT_UPCOMING_DAYS)
    )
}

impl ApiClient {
    /// `GET /api/health`, stamped with the current time when the server omits one
    pub async fn health(&self) -> Result<HealthCheckResponse> {
        let value = self.request_value(HEALTH, RequestOptions::default()).await?;

        let raw: RawHealthResponse = serde_json::from_value(value).map_err(|e| {
            tracing::debug!("Malformed health response: {}", e);
            ApiError::unavailable(HEALTH_FAILURE_MESSAGE)
        })?;

        Ok(HealthCheckResponse {
            status: raw.status.unwrap_or_default(),
            service: raw.service.unwrap_or_default(),
            scheduler_status: raw.scheduler_status,
            scheduled_jobs: raw.scheduled_jobs,
            timestamp: raw.timestamp.unwrap_or_else(now_rfc3339),
        })
    }

    /// `GET /api/schedules` with only the provided filters
    pub async fn list_schedules(&self, filters: &SchedulesFilters) -> Result<Vec<Schedule>> {
        self.get(&schedules_path(filters)).await
    }

    /// `GET /api/schedules/{id}`
    pub async fn get_schedule(&self, id: ScheduleId) -> Result<Schedule> {
        self.get(&schedule_path(id)).await
    }

    /// `GET /api/schedules/upcoming?days=N`, seven days by default
    pub async fn upcoming_schedules(&self, days: Option<u32>) -> Result<Vec<Schedule>> {
        self.get(&upcoming_path(days)).await
    }

    /// `DELETE /api/schedules/{id}`
    pub async fn cancel_schedule(&self, id: ScheduleId) -> Result<CancelScheduleResponse> {
        tracing::debug!("Cancelling schedule {}", id);
        self.request(&schedule_path(id), RequestOptions::method(Method::Delete))
            .await
    }

    /// `GET /api/stats`
    pub async fn stats(&self) -> Result<StatsResponse> {
        self.get(STATS).await
    }

    /// `GET /api/scheduler/status`
    pub async fn scheduler_status(&self) -> Result<SchedulerStatusResponse> {
        self.get(SCHEDULER_STATUS).await
    }

    /// `GET /api/token/status`
    pub async fn token_status(&self) -> Result<TokenStatusResponse> {
        self.get(TOKEN_STATUS).await
    }
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
