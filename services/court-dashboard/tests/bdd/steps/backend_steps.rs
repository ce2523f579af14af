//! Scripting the backend

use court_api::{ApiError, HttpResponse, Method};
use cucumber::{given, then};
use serde_json::json;

use crate::world::DashboardWorld;

pub fn pending_schedule(id: u64) -> serde_json::Value {
    json!({
        "id": id,
        "type": "one-off",
        "desired_time": "2026-03-14T18:00:00",
        "trigger_time": "2026-03-07T18:00:00",
        "court_id": "1",
        "status": "pending",
        "duration": 60
    })
}

fn status_text(status: u16) -> &'static str {
    match status {
        404 => "Not Found",
        409 => "Conflict",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        _ => "Error",
    }
}

#[given("the backend reports a healthy service")]
fn healthy_service(world: &mut DashboardWorld) {
    world.backend.respond_json(
        Method::Get,
        "/api/health",
        &json!({
            "status": "healthy",
            "service": "tennis-scheduler",
            "timestamp": "2026-03-01T10:00:00Z"
        }),
    );
}

#[given(expr = "the backend now reports a {string} service")]
fn service_status(world: &mut DashboardWorld, status: String) {
    world.backend.respond_json(
        Method::Get,
        "/api/health",
        &json!({
            "status": status,
            "service": "tennis-scheduler",
            "timestamp": "2026-03-01T10:05:00Z"
        }),
    );
}

#[given("the health check is unreachable")]
fn health_unreachable(world: &mut DashboardWorld) {
    world.backend.fail(
        Method::Get,
        "/api/health",
        ApiError::network("connection refused"),
    );
}

#[given(expr = "the backend lists one pending schedule for {string}")]
fn one_pending_schedule(world: &mut DashboardWorld, path: String) {
    world
        .backend
        .respond_json(Method::Get, &path, &json!([pending_schedule(1)]));
}

#[given(expr = "the backend answers {string} with status {int}")]
fn answers_with_status(world: &mut DashboardWorld, path: String, status: u16) {
    world.backend.respond(
        Method::Get,
        &path,
        HttpResponse::empty(status, status_text(status)),
    );
}

#[then(expr = "the backend received {int} request(s) for {string}")]
fn received_requests(world: &mut DashboardWorld, count: usize, path: String) {
    let seen = world.backend.request_count(Method::Get, &path);
    assert_eq!(seen, count, "requests for {}: {:?}", path, world.backend.requests());
}
