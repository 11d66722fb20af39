//! HTTP API handlers.

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, response::IntoResponse, Json};

use crate::health::{self, DatabaseProbe, HealthReport, WelcomeResponse};
use crate::metrics;

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database probe run on every health check.
    pub probe: Arc<dyn DatabaseProbe>,
    /// Message served on `/`.
    pub welcome: Arc<str>,
}

impl AppState {
    /// Create new app state.
    pub fn new(probe: impl DatabaseProbe, welcome: impl Into<Arc<str>>) -> Self {
        Self {
            probe: Arc::new(probe),
            welcome: welcome.into(),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("welcome", &self.welcome)
            .finish_non_exhaustive()
    }
}

/// Root handler - static welcome message.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Welcome message", body = WelcomeResponse))
)]
pub async fn root(State(state): State<AppState>) -> impl IntoResponse {
    Json(WelcomeResponse {
        message: state.welcome.to_string(),
    })
}

/// Health check handler - always returns 200, the body carries the status.
#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "Composite health report", body = HealthReport))
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();
    let report = health::check(state.probe.as_ref()).await;
    metrics::record_http_latency(start, "/api/health");

    Json(report)
}
