//! Starting and stopping a dashboard against a scripted backend

use std::sync::Arc;
use std::time::Duration;

use court_api::{HealthCheckResponse, Method, MockBackend, SchedulerStatusResponse};
use court_dashboard::{Config, DashboardBuilder, QueryKey};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

fn scripted_backend() -> MockBackend {
    let backend = MockBackend::new();
    backend
        .respond_json(
            Method::Get,
            "/api/health",
            &json!({"status": "healthy", "service": "tennis-scheduler", "timestamp": "now"}),
        )
        .respond_json(
            Method::Get,
            "/api/scheduler/status",
            &json!({"is_running": true, "total_jobs": 0, "jobs": []}),
        );
    backend
}

#[tokio::test]
#[cfg(not(miri))]
async fn start_warms_polled_queries_and_stops_on_cancel() {
    let backend = scripted_backend();
    let mut config = Config::default();
    config.dashboard.enabled = false;

    let dashboard = DashboardBuilder::new(config)
        .with_http_client(Arc::new(backend.clone()))
        .build()
        .await
        .unwrap();
    assert!(dashboard.local_addr().is_none());
    let cancel = dashboard.cancellation_token();
    let client = dashboard.queries().client().clone();
    let handle = tokio::spawn(dashboard.start());

    tokio::time::timeout(Duration::from_secs(5), async {
        while !(client
            .get_query_data::<HealthCheckResponse>(&QueryKey::health())
            .is_some()
            && client
                .get_query_data::<SchedulerStatusResponse>(&QueryKey::scheduler_status())
                .is_some())
        {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    assert_eq!(client.query_state(&QueryKey::health()).unwrap().observers, 1);
    cancel.cancel();
    handle.await.unwrap().unwrap();
    assert_eq!(backend.request_count(Method::Get, "/api/health"), 1);
}

#[tokio::test]
#[cfg(not(miri))]
async fn dashboard_serves_over_tcp() {
    let backend = scripted_backend();
    let mut config = Config::default();
    config.dashboard.port = 0;

    let dashboard = DashboardBuilder::new(config)
        .with_http_client(Arc::new(backend))
        .build()
        .await
        .unwrap();
    let port = dashboard.local_addr().unwrap().port();
    let cancel = dashboard.cancellation_token();
    let handle = tokio::spawn(dashboard.start());

    let response = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let Ok(mut stream) = tokio::net::TcpStream::connect(("127.0.0.1", port)).await {
                let request = b"GET /api/health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n";
                stream.write_all(request).await.unwrap();
                let mut response = String::new();
                stream.read_to_string(&mut response).await.unwrap();
                break response;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    assert!(response.starts_with("HTTP/1.1 200"));
    assert!(response.contains("tennis-scheduler"));

    cancel.cancel();
    handle.await.unwrap().unwrap();
}
