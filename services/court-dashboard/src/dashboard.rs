//! Web dashboard: server-rendered status page and cached JSON endpoints

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use court_api::{ApiError, HealthStatus, ScheduleId, SchedulesFilters};
use humantime_serde::re::humantime::format_duration;
use serde::Deserialize;
use std::time::Duration;

use crate::queries::Queries;

/// Dashboard application state
#[derive(Clone)]
pub struct DashboardState {
    pub queries: Queries,
    pub upcoming_days: u32,
}

/// Build the dashboard axum router
pub fn build_router(queries: Queries, upcoming_days: u32) -> Router {
    let dashboard_state = DashboardState {
        queries,
        upcoming_days,
    };

    Router::new()
        .route("/", get(index_handler))
        .route("/api/health", get(api_health_handler))
        .route("/api/health/refresh", post(refresh_health_handler))
        .route("/api/stats", get(stats_handler))
        .route("/api/schedules", get(schedules_handler))
        .route("/api/schedules/upcoming", get(upcoming_handler))
        .route(
            "/api/schedules/{id}",
            get(schedule_handler).delete(cancel_schedule_handler),
        )
        .route("/api/scheduler/status", get(scheduler_status_handler))
        .route("/api/token/status", get(token_status_handler))
        .route("/health", get(health_handler))
        .with_state(dashboard_state)
}

/// Backend failure surfaced to dashboard clients
pub struct ApiFailure(pub ApiError);

impl From<ApiError> for ApiFailure {
    fn from(err: ApiError) -> Self {
        ApiFailure(err)
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let status = match self.0.status() {
            Some(code) if (400..500).contains(&code) => {
                StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            _ => StatusCode::BAD_GATEWAY,
        };
        let body = serde_json::json!({
            "error": self.0.to_string(),
            "status": self.0.status(),
        });
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiFailure>;

#[derive(Debug, Deserialize)]
struct UpcomingParams {
    days: Option<u32>,
}

async fn api_health_handler(
    State(dashboard): State<DashboardState>,
) -> ApiResult<court_api::HealthCheckResponse> {
    let health = dashboard.queries.health().await?;
    Ok(Json(health.as_ref().clone()))
}

async fn refresh_health_handler(
    State(dashboard): State<DashboardState>,
) -> ApiResult<court_api::HealthCheckResponse> {
    let health = dashboard.queries.refresh_health().await?;
    Ok(Json(health.as_ref().clone()))
}

async fn stats_handler(
    State(dashboard): State<DashboardState>,
) -> ApiResult<court_api::StatsResponse> {
    let stats = dashboard.queries.stats().await?;
    Ok(Json(stats.as_ref().clone()))
}

async fn schedules_handler(
    State(dashboard): State<DashboardState>,
    Query(filters): Query<SchedulesFilters>,
) -> ApiResult<Vec<court_api::Schedule>> {
    let schedules = dashboard.queries.schedules(filters).await?;
    Ok(Json(schedules.as_ref().clone()))
}

async fn upcoming_handler(
    State(dashboard): State<DashboardState>,
    Query(params): Query<UpcomingParams>,
) -> ApiResult<Vec<court_api::Schedule>> {
    let schedules = dashboard.queries.upcoming_schedules(params.days).await?;
    Ok(Json(schedules.as_ref().clone()))
}

async fn schedule_handler(
    State(dashboard): State<DashboardState>,
    Path(id): Path<ScheduleId>,
) -> ApiResult<court_api::Schedule> {
    let schedule = dashboard.queries.schedule(id).await?;
    Ok(Json(schedule.as_ref().clone()))
}

async fn cancel_schedule_handler(
    State(dashboard): State<DashboardState>,
    Path(id): Path<ScheduleId>,
) -> ApiResult<court_api::CancelScheduleResponse> {
    Ok(Json(dashboard.queries.cancel_schedule(id).await?))
}

async fn scheduler_status_handler(
    State(dashboard): State<DashboardState>,
) -> ApiResult<court_api::SchedulerStatusResponse> {
    let status = dashboard.queries.scheduler_status().await?;
    Ok(Json(status.as_ref().clone()))
}

async fn token_status_handler(
    State(dashboard): State<DashboardState>,
) -> ApiResult<court_api::TokenStatusResponse> {
    let status = dashboard.queries.token_status().await?;
    Ok(Json(status.as_ref().clone()))
}

async fn health_handler() -> impl IntoResponse {
    "OK"
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Status code shown next to a failure, or "Network Error" for transport failures
fn error_detail(err: &ApiError) -> String {
    match err.status() {
        Some(status) if status != 0 => format!("{} ({})", err, status),
        _ => format!("{} (Network Error)", err),
    }
}

/// "30s", "2m" and so on, or "off" when the query is not polled
fn refresh_label(interval: Option<Duration>) -> String {
    match interval {
        Some(interval) => format_duration(interval).to_string(),
        None => "off".to_string(),
    }
}

fn badge(text: &str, color: &str, bg: &str) -> String {
    format!(
        r#"<span style="display: inline-block; padding: 0.25em 0.6em; border-radius: 0.25rem; font-size: 0.85em; font-weight: 600; color: {}; background-color: {};">{}</span>"#,
        color,
        bg,
        escape_html(text)
    )
}

async fn index_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let queries = &dashboard.queries;
    let (health, stats, upcoming, scheduler) = tokio::join!(
        queries.health(),
        queries.stats(),
        queries.upcoming_schedules(Some(dashboard.upcoming_days)),
        queries.scheduler_status(),
    );

    let health_card = match &health {
        Ok(h) => {
            let label = match h.status {
                HealthStatus::Healthy => badge("API Online", "#155724", "#d4edda"),
                other => badge(&other.to_string(), "#856404", "#fff3cd"),
            };
            format!(
                r#"<p>{}</p><p>Service: {}</p><p>Last check: {}</p><p style="color: #6c757d;">Auto-refresh: {}</p>"#,
                label,
                escape_html(&h.service),
                escape_html(&h.timestamp),
                refresh_label(queries.health_policy().refetch_interval)
            )
        }
        Err(e) => format!(
            r#"<p>{}</p><p style="color: #721c24;">{}</p>"#,
            badge("Connection Failed", "#721c24", "#f8d7da"),
            escape_html(&error_detail(e))
        ),
    };

    let stats_card = match &stats {
        Ok(s) => format!(
            r#"<table style="width: 100%; border-collapse: collapse;">
                <tr><td style="padding: 0.5rem;">Total</td><td style="padding: 0.5rem;">{}</td></tr>
                <tr><td style="padding: 0.5rem;">Pending</td><td style="padding: 0.5rem;">{}</td></tr>
                <tr><td style="padding: 0.5rem;">Successful</td><td style="padding: 0.5rem;">{}</td></tr>
                <tr><td style="padding: 0.5rem;">Failed</td><td style="padding: 0.5rem;">{}</td></tr>
                <tr><td style="padding: 0.5rem;">Next booking</td><td style="padding: 0.5rem;">{}</td></tr>
            </table>"#,
            s.total_schedules,
            s.pending_schedules,
            s.successful_schedules,
            s.failed_schedules,
            escape_html(s.next_booking.as_deref().unwrap_or("None"))
        ),
        Err(_) => r#"<p style="color: #721c24;">Failed to load statistics</p>"#.to_string(),
    };

    let upcoming_card = match &upcoming {
        Ok(schedules) if schedules.is_empty() => "<p>No upcoming bookings</p>".to_string(),
        Ok(schedules) => {
            let rows: String = schedules
                .iter()
                .map(|s| {
                    format!(
                        r#"<tr style="border-bottom: 1px solid #dee2e6;">
                    <td style="padding: 0.5rem;">{}</td>
                    <td style="padding: 0.5rem;">Court {}</td>
                    <td style="padding: 0.5rem;">{}</td>
                    <td style="padding: 0.5rem;">{} min</td>
                    <td style="padding: 0.5rem;">{}</td>
                </tr>"#,
                        s.id,
                        s.court_id,
                        escape_html(&s.desired_time),
                        s.duration,
                        s.status
                    )
                })
                .collect();
            format!(
                r#"<table style="width: 100%; border-collapse: collapse;">
                <thead>
                    <tr style="border-bottom: 2px solid #dee2e6;">
                        <th style="padding: 0.5rem; text-align: left;">ID</th>
                        <th style="padding: 0.5rem; text-align: left;">Court</th>
                        <th style="padding: 0.5rem; text-align: left;">Time</th>
                        <th style="padding: 0.5rem; text-align: left;">Duration</th>
                        <th style="padding: 0.5rem; text-align: left;">Status</th>
                    </tr>
                </thead>
                <tbody>{}</tbody>
            </table>"#,
                rows
            )
        }
        Err(_) => r#"<p style="color: #721c24;">Failed to load schedules</p>"#.to_string(),
    };

    let scheduler_card = match &scheduler {
        Ok(status) => {
            let state = if status.is_running {
                badge("Running", "#155724", "#d4edda")
            } else {
                badge("Stopped", "#721c24", "#f8d7da")
            };
            let jobs: String = status
                .jobs
                .iter()
                .map(|job| {
                    format!(
                        r#"<li>{} <span style="color: #6c757d;">next run: {}</span></li>"#,
                        escape_html(&job.name),
                        escape_html(job.next_run_time.as_deref().unwrap_or("not scheduled"))
                    )
                })
                .collect();
            format!(
                "<p>{} {} jobs</p><ul>{}</ul>",
                state, status.total_jobs, jobs
            )
        }
        Err(_) => {
            r#"<p style="color: #721c24;">Failed to load scheduler status</p>"#.to_string()
        }
    };

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Tennis Court Scheduler</title>
</head>
<body style="font-family: system-ui, sans-serif; max-width: 960px; margin: 0 auto; padding: 1rem;">
    <h1>Tennis Court Scheduler</h1>
    <section>
        <h2>API Health</h2>
        {health_card}
    </section>
    <section>
        <h2>Statistics</h2>
        {stats_card}
    </section>
    <section>
        <h2>Upcoming Bookings</h2>
        {upcoming_card}
    </section>
    <section>
        <h2>Scheduler</h2>
        {scheduler_card}
    </section>
</body>
</html>"#,
        health_card = health_card,
        stats_card = stats_card,
        upcoming_card = upcoming_card,
        scheduler_card = scheduler_card,
    );

    Html(html)
}
