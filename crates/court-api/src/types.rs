//! Response and filter types of the court scheduler API
//!
//! Timestamps are kept as the ISO-8601 strings the backend sends.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Server-assigned schedule identifier
pub type ScheduleId = u64;

/// Lifecycle status of a schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleStatus {
    Pending,
    Success,
    Failed,
    Cancelled,
}

impl ScheduleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleStatus::Pending => "pending",
            ScheduleStatus::Success => "success",
            ScheduleStatus::Failed => "failed",
            ScheduleStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bookable court
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CourtId {
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
}

impl CourtId {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourtId::One => "1",
            CourtId::Two => "2",
        }
    }
}

impl fmt::Display for CourtId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScheduleType {
    #[serde(rename = "one-off")]
    OneOff,
    #[serde(rename = "recurring")]
    Recurring,
}

/// Overall backend health
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    #[default]
    Healthy,
    Unhealthy,
    Degraded,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Unhealthy => write!(f, "unhealthy"),
            HealthStatus::Degraded => write!(f, "degraded"),
        }
    }
}

/// State of the backend's job scheduler as reported by the health check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerState {
    Running,
    Stopped,
    Error,
}

/// Result of `GET /api/health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    pub status: HealthStatus,
    pub service: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduler_status: Option<SchedulerState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_jobs: Option<u32>,
    pub timestamp: String,
}

/// A booking request owned by the backend scheduler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: ScheduleId,
    #[serde(rename = "type")]
    pub schedule_type: ScheduleType,
    pub desired_time: String,
    pub trigger_time: String,
    pub court_id: CourtId,
    pub status: ScheduleStatus,
    /// Minutes
    pub duration: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rrule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Filters for `GET /api/schedules`
///
/// Fields left as `None` are not sent, and neither is a `limit` or
/// `offset` of zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchedulesFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ScheduleStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub court_id: Option<CourtId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

impl SchedulesFilters {
    pub fn with_status(mut self, status: ScheduleStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_court(mut self, court_id: CourtId) -> Self {
        self.court_id = Some(court_id);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// True when no field would be sent
    pub fn is_empty(&self) -> bool {
        self.query_pairs().is_empty()
    }

    /// Provided fields as `(name, value)` pairs in wire order
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if let Some(court_id) = self.court_id {
            pairs.push(("court_id", court_id.as_str().to_string()));
        }
        if let Some(limit) = self.limit.filter(|&n| n > 0) {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset.filter(|&n| n > 0) {
            pairs.push(("offset", offset.to_string()));
        }
        pairs
    }

    /// `?name=value&...` for the provided fields, or an empty string
    pub fn to_query_string(&self) -> String {
        let pairs = self.query_pairs();
        if pairs.is_empty() {
            return String::new();
        }
        let joined: Vec<String> = pairs
            .into_iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();
        format!("?{}", joined.join("&"))
    }
}

/// Aggregate counts from `GET /api/stats`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_schedules: u64,
    pub pending_schedules: u64,
    pub successful_schedules: u64,
    pub failed_schedules: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_booking: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerJob {
    pub job_id: String,
    #[serde(default)]
    pub next_run_time: Option<String>,
    pub name: String,
}

/// Result of `GET /api/scheduler/status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStatusResponse {
    pub is_running: bool,
    pub total_jobs: u32,
    #[serde(default)]
    pub jobs: Vec<SchedulerJob>,
}

/// Result of `GET /api/token/status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenStatusResponse {
    pub has_refresh_token: bool,
    pub access_token_valid: bool,
    #[serde(default)]
    pub access_expiry: Option<String>,
    #[serde(default)]
    pub refresh_expiry: Option<String>,
}

/// Confirmation of `DELETE /api/schedules/{id}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelScheduleResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub schedule_id: ScheduleId,
}
