//! Integration tests for the health API and the dashboard poller.
//!
//! Every test runs real loopback servers; the mock probe stands in for the
//! database so no PostgreSQL instance is needed.
//! Run with: cargo test --test integration

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use pretty_assertions::assert_eq;
use tokio::net::TcpListener;
use tokio::sync::watch;

use statusboard::api::{create_router, AppState};
use statusboard::dashboard::{ClientHealthState, HealthClient, HealthPoller};
use statusboard::health::{DbStatus, MockProbe, MockProbeConfig, OverallStatus};

/// Serve `router` on an ephemeral loopback port.
async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// Serve the real API backed by `probe`.
async fn serve_api(probe: MockProbe) -> SocketAddr {
    serve(create_router(AppState::new(probe, "Welcome to Test8 API"))).await
}

/// An address nothing listens on.
async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

fn base_url(addr: SocketAddr) -> String {
    format!("http://{}", addr)
}

fn poller(addr: SocketAddr, interval_ms: u64) -> HealthPoller {
    let client = HealthClient::new(base_url(addr), Some(Duration::from_secs(2))).unwrap();
    HealthPoller::new(client, Duration::from_millis(interval_ms))
}

/// Wait for the next state replacement.
async fn next_state(rx: &mut watch::Receiver<ClientHealthState>) -> ClientHealthState {
    tokio::time::timeout(Duration::from_secs(5), rx.changed())
        .await
        .expect("no poll completed in time")
        .expect("poller closed");
    rx.borrow_and_update().clone()
}

/// Database reachable: the endpoint reports healthy.
#[tokio::test]
async fn reachable_database_reports_healthy() {
    let addr = serve_api(MockProbe::new()).await;

    let response = reqwest::get(format!("{}/api/health", base_url(addr)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["api"]["status"], "healthy");
    assert_eq!(
        body["database"],
        serde_json::json!({ "status": "connected", "error": null })
    );
    assert!(body["api"]["timestamp"].is_string());
}

/// Database refuses connections: still 200, body degraded.
#[tokio::test]
async fn refused_database_reports_degraded_with_200() {
    let addr = serve_api(MockProbe::failing("connection refused")).await;

    let response = reqwest::get(format!("{}/api/health", base_url(addr)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "degraded");
    assert_eq!(
        body["database"],
        serde_json::json!({ "status": "disconnected", "error": "connection refused" })
    );
}

/// Root endpoint serves the welcome message.
#[tokio::test]
async fn root_serves_welcome_message() {
    let addr = serve_api(MockProbe::new()).await;

    let body: serde_json::Value = reqwest::get(base_url(addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body, serde_json::json!({ "message": "Welcome to Test8 API" }));
}

/// The poller stores the report on success.
#[tokio::test]
async fn poller_stores_healthy_report() {
    let addr = serve_api(MockProbe::new()).await;
    let handle = poller(addr, 1000).spawn();
    let mut rx = handle.subscribe();

    assert!(handle.state().loading);

    let state = next_state(&mut rx).await;
    assert!(!state.loading);
    assert_eq!(state.error, None);

    let report = state.report.expect("report");
    assert_eq!(report.status, OverallStatus::Healthy);
    assert_eq!(report.database.status, DbStatus::Connected);

    handle.shutdown().await;
}

/// Network failure: report cleared, fixed message.
#[tokio::test]
async fn network_error_sets_connect_message() {
    let addr = closed_addr().await;
    let handle = poller(addr, 1000).spawn();
    let mut rx = handle.subscribe();

    let state = next_state(&mut rx).await;

    assert_eq!(
        state,
        ClientHealthState {
            report: None,
            loading: false,
            error: Some("Failed to connect to API".to_string()),
        }
    );

    handle.shutdown().await;
}

/// Non-2xx response: the status code becomes the error.
#[tokio::test]
async fn server_error_sets_http_status_message() {
    let router = Router::new().route(
        "/api/health",
        get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    );
    let addr = serve(router).await;
    let handle = poller(addr, 1000).spawn();
    let mut rx = handle.subscribe();

    let state = next_state(&mut rx).await;

    assert_eq!(state.report, None);
    assert!(!state.loading);
    assert_eq!(state.error.as_deref(), Some("HTTP 500"));

    handle.shutdown().await;
}

/// A response slower than the fetch timeout is reported as a timeout.
#[tokio::test]
async fn slow_response_times_out() {
    let probe = MockProbe::with_config(MockProbeConfig {
        failure: None,
        latency_ms: 1000,
    });
    let addr = serve_api(probe).await;

    let client = HealthClient::new(base_url(addr), Some(Duration::from_millis(100))).unwrap();
    let handle = HealthPoller::new(client, Duration::from_secs(5)).spawn();
    let mut rx = handle.subscribe();

    let state = next_state(&mut rx).await;
    assert_eq!(state.error.as_deref(), Some("Request timed out"));

    handle.shutdown().await;
}

/// Unchanged backend: consecutive reports differ only in timestamp.
#[tokio::test]
async fn repeated_polls_are_identical_except_timestamp() {
    let addr = serve_api(MockProbe::failing("connection refused")).await;
    let handle = poller(addr, 30).spawn();
    let mut rx = handle.subscribe();

    let first = next_state(&mut rx).await.report.expect("first report");
    let second = next_state(&mut rx).await.report.expect("second report");

    assert!(first.eq_ignoring_timestamp(&second));
    assert_eq!(first.database, second.database);

    handle.shutdown().await;
}

/// Each poll replaces the state wholesale, so recovery shows up.
#[tokio::test]
async fn state_follows_backend_changes() {
    let probe = MockProbe::failing("connection refused");
    let addr = serve_api(probe.clone()).await;
    let handle = poller(addr, 30).spawn();
    let mut rx = handle.subscribe();

    let degraded = next_state(&mut rx).await.report.expect("report");
    assert_eq!(degraded.status, OverallStatus::Degraded);

    probe.set_failure(None);

    let recovered = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let state = next_state(&mut rx).await;
            if let Some(report) = state.report {
                if report.status == OverallStatus::Healthy {
                    return report;
                }
            }
        }
    })
    .await
    .expect("never recovered");

    assert_eq!(recovered.database.error, None);

    handle.shutdown().await;
}

/// After shutdown no further fetches reach the server.
#[tokio::test]
async fn shutdown_stops_polling() {
    let probe = MockProbe::new();
    let addr = serve_api(probe.clone()).await;
    let handle = poller(addr, 20).spawn();

    tokio::time::timeout(Duration::from_secs(5), async {
        while probe.calls() < 3 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("poller never reached the server");

    handle.shutdown().await;

    // Let fetches issued before shutdown land.
    tokio::time::sleep(Duration::from_millis(200)).await;
    let settled = probe.calls();

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(probe.calls(), settled);
}
