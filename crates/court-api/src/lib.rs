//! Court API - typed client for the tennis court scheduler backend
//!
//! Wraps the backend's HTTP+JSON contract: health, schedules, stats,
//! scheduler status and token status. Every failure is reported as an
//! [`ApiError`] whose status distinguishes transport failures (`0`) from
//! error responses.

pub mod endpoints;
pub mod error;
pub mod io;
#[cfg(feature = "mock")]
pub mod mock;
pub mod request;
pub mod types;

pub use endpoints::DEFAULT_UPCOMING_DAYS;
pub use error::{ApiError, Result};
pub use io::{HttpClient, HttpRequest, HttpResponse, Method, ReqwestHttpClient};
pub use request::{ApiClient, RequestOptions, DEFAULT_BASE_URL};
pub use types::{
    CancelScheduleResponse, CourtId, HealthCheckResponse, HealthStatus, Schedule, ScheduleId,
    ScheduleStatus, ScheduleType, SchedulerJob, SchedulerState, SchedulerStatusResponse,
    SchedulesFilters, StatsResponse, TokenStatusResponse,
};

#[cfg(feature = "mock")]
pub use mock::MockBackend;
