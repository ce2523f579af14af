//! Cancelling schedules and its effect on the cache

use court_api::{HttpResponse, Method, SchedulesFilters};
use court_dashboard::QueryKey;
use cucumber::{given, then, when};
use serde_json::json;

use crate::steps::backend_steps::pending_schedule;
use crate::world::DashboardWorld;

fn cached_key(name: &str) -> QueryKey {
    match name {
        "list" => QueryKey::schedules_list(&SchedulesFilters::default()),
        "upcoming" => QueryKey::schedules_upcoming(None),
        "stats" => QueryKey::stats(),
        "health" => QueryKey::health(),
        other => panic!("Unknown cache entry: {}", other),
    }
}

#[given(expr = "the backend accepts cancelling schedule {int}")]
fn accepts_cancel(world: &mut DashboardWorld, id: u64) {
    world.backend.respond_json(
        Method::Delete,
        &format!("/api/schedules/{}", id),
        &json!({"message": "Schedule cancelled successfully", "schedule_id": id}),
    );
}

#[given(expr = "the backend rejects cancelling schedule {int} with status {int}")]
fn rejects_cancel(world: &mut DashboardWorld, id: u64, status: u16) {
    world.backend.respond_once(
        Method::Delete,
        &format!("/api/schedules/{}", id),
        HttpResponse::empty(status, "Conflict"),
    );
}

#[given(expr = "schedule {int} and its lists and stats are cached")]
async fn cache_schedule(world: &mut DashboardWorld, id: u64) {
    let backend = world.backend.clone();
    backend
        .respond_json(Method::Get, &format!("/api/schedules/{}", id), &pending_schedule(id))
        .respond_json(Method::Get, "/api/schedules", &json!([pending_schedule(id)]))
        .respond_json(
            Method::Get,
            "/api/schedules/upcoming?days=7",
            &json!([pending_schedule(id)]),
        )
        .respond_json(
            Method::Get,
            "/api/stats",
            &json!({
                "total_schedules": 1,
                "pending_schedules": 1,
                "successful_schedules": 0,
                "failed_schedules": 0
            }),
        );

    let queries = world.queries();
    queries.schedule(id).await.expect("detail");
    queries
        .schedules(SchedulesFilters::default())
        .await
        .expect("list");
    queries.upcoming_schedules(None).await.expect("upcoming");
    queries.stats().await.expect("stats");
}

#[when(expr = "schedule {int} is cancelled")]
async fn cancel(world: &mut DashboardWorld, id: u64) {
    let result = world.queries().cancel_schedule(id).await;
    world.record(result);
}

#[then(expr = "the cached {string} entry is stale")]
fn entry_is_stale(world: &mut DashboardWorld, name: String) {
    let state = world
        .queries()
        .client()
        .query_state(&cached_key(&name))
        .expect("entry missing");
    assert!(state.is_stale, "{} should be stale", name);
    assert!(state.has_data, "{} should keep its data", name);
}

#[then(expr = "the cached {string} entry is fresh")]
fn entry_is_fresh(world: &mut DashboardWorld, name: String) {
    let state = world
        .queries()
        .client()
        .query_state(&cached_key(&name))
        .expect("entry missing");
    assert!(!state.is_stale, "{} should be fresh", name);
}

#[then(expr = "schedule {int} is no longer cached")]
fn detail_evicted(world: &mut DashboardWorld, id: u64) {
    assert!(!world
        .queries()
        .client()
        .contains(&QueryKey::schedules_detail(id)));
}

#[then(expr = "schedule {int} is still cached")]
fn detail_kept(world: &mut DashboardWorld, id: u64) {
    assert!(world
        .queries()
        .client()
        .contains(&QueryKey::schedules_detail(id)));
}
