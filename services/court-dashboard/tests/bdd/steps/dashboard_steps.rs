//! BDD step definitions for the dashboard page

use axum::body::Body;
use axum::http::Request;
use court_dashboard::dashboard::build_router;
use cucumber::{then, when};
use tower::ServiceExt;

use crate::world::DashboardWorld;

#[when("the dashboard index page is requested")]
async fn request_index(world: &mut DashboardWorld) {
    let app = build_router(world.queries(), 7);
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    world.dashboard_response_body = Some(String::from_utf8(body.to_vec()).unwrap());
}

#[then(expr = "the response should contain {string}")]
fn response_contains(world: &mut DashboardWorld, expected: String) {
    let body = world
        .dashboard_response_body
        .as_ref()
        .expect("no response body");
    assert!(
        body.contains(&expected),
        "Expected response to contain '{}', but it didn't.\nResponse body:\n{}",
        expected,
        body
    );
}
