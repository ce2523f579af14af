//! Cached reads and manual refresh

use std::sync::Arc;

use court_api::{CourtId, SchedulesFilters};
use court_dashboard::QueryKey;
use cucumber::{given, then, when};

use crate::world::DashboardWorld;

async fn read_health(world: &mut DashboardWorld) {
    let result = world.queries().health().await;
    if let Some(health) = world.record(result) {
        world.health_reads.push(health);
    }
}

#[given("health has been read")]
async fn health_has_been_read(world: &mut DashboardWorld) {
    read_health(world).await;
}

#[when("health is read twice")]
async fn read_health_twice(world: &mut DashboardWorld) {
    read_health(world).await;
    read_health(world).await;
}

#[when("health is refreshed manually")]
async fn refresh_health(world: &mut DashboardWorld) {
    let result = world.queries().refresh_health().await;
    world.record(result);
}

#[when(expr = "schedules are listed for court {string} with limit {int}")]
async fn list_for_court(world: &mut DashboardWorld, court: String, limit: u32) {
    let court = match court.as_str() {
        "1" => CourtId::One,
        "2" => CourtId::Two,
        other => panic!("Unknown court: {}", other),
    };
    let filters = SchedulesFilters::default()
        .with_court(court)
        .with_limit(limit);
    let result = world.queries().schedules(filters).await;
    world.last_schedules = world.record(result);
}

#[when("upcoming schedules are read without days")]
async fn upcoming_default(world: &mut DashboardWorld) {
    let result = world.queries().upcoming_schedules(None).await;
    world.last_schedules = world.record(result);
}

#[when(expr = "upcoming schedules are read for {int} days")]
async fn upcoming_days(world: &mut DashboardWorld, days: u32) {
    let result = world.queries().upcoming_schedules(Some(days)).await;
    world.last_schedules = world.record(result);
}

#[when("stats are read")]
async fn read_stats(world: &mut DashboardWorld) {
    let result = world.queries().stats().await;
    world.record(result);
}

#[when(expr = "schedule {int} is read")]
async fn read_schedule(world: &mut DashboardWorld, id: u64) {
    let result = world.queries().schedule(id).await;
    world.record(result);
}

#[then("both reads return the same cached object")]
fn same_cached_object(world: &mut DashboardWorld) {
    assert_eq!(world.health_reads.len(), 2);
    assert!(Arc::ptr_eq(&world.health_reads[0], &world.health_reads[1]));
}

#[then(expr = "{int} schedule(s) is/are returned with status {string}")]
fn schedules_returned(world: &mut DashboardWorld, count: usize, status: String) {
    let schedules = world.last_schedules.as_ref().expect("no schedules read");
    assert_eq!(schedules.len(), count);
    for schedule in schedules.iter() {
        assert_eq!(schedule.status.to_string(), status);
    }
}

#[then(expr = "the read fails with status {int}")]
fn read_fails(world: &mut DashboardWorld, status: u16) {
    let err = world.last_error.as_ref().expect("read did not fail");
    assert_eq!(err.status(), Some(status));
}

#[then(expr = "the cached health status is {string}")]
fn cached_health_status(world: &mut DashboardWorld, status: String) {
    let cached = world
        .queries()
        .client()
        .get_query_data::<court_api::HealthCheckResponse>(&QueryKey::health())
        .expect("health not cached");
    assert_eq!(cached.status.to_string(), status);
}
