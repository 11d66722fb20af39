//! Prometheus metrics for health checks and dashboard polling.
//!
//! This module provides metrics for:
//! - Health checks served, by overall status
//! - Database probe latency and failures
//! - HTTP request latency
//! - Dashboard poll outcomes

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use tracing::{debug, info};

use crate::health::OverallStatus;

// === Metric Name Constants ===

/// Health checks served counter metric name.
pub const METRIC_HEALTH_CHECKS: &str = "health_checks_total";
/// Database probe latency metric name.
pub const METRIC_DB_PROBE_LATENCY: &str = "db_probe_latency_ms";
/// Database probe failures counter metric name.
pub const METRIC_DB_PROBE_FAILURES: &str = "db_probe_failures_total";
/// HTTP request latency metric name.
pub const METRIC_HTTP_REQUEST_LATENCY: &str = "http_request_latency_ms";
/// Dashboard polls counter metric name.
pub const METRIC_POLLS: &str = "dashboard_polls_total";

/// Register metric descriptions with the current recorder.
/// Descriptions sent before a recorder is installed are lost.
pub fn init_metrics() {
    describe_counter!(
        METRIC_HEALTH_CHECKS,
        "Total number of health reports served, by overall status"
    );
    describe_histogram!(
        METRIC_DB_PROBE_LATENCY,
        "Database liveness query latency in milliseconds"
    );
    describe_counter!(
        METRIC_DB_PROBE_FAILURES,
        "Total number of failed database liveness queries"
    );
    describe_histogram!(
        METRIC_HTTP_REQUEST_LATENCY,
        "HTTP request latency in milliseconds"
    );
    describe_counter!(
        METRIC_POLLS,
        "Total number of dashboard polls, by outcome"
    );

    debug!("Metrics initialized");
}

/// Install the Prometheus exporter listening on `0.0.0.0:port`.
pub fn install_exporter(port: u16) -> Result<(), BuildError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    init_metrics();
    info!("Prometheus exporter listening on {}", addr);
    Ok(())
}

/// Record HTTP request latency.
pub fn record_http_latency(start: Instant, endpoint: &str) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_HTTP_REQUEST_LATENCY, "endpoint" => endpoint.to_string()).record(latency_ms);
}

/// Increment health checks counter.
pub fn inc_health_checks(status: OverallStatus) {
    counter!(METRIC_HEALTH_CHECKS, "status" => status.as_ref().to_string()).increment(1);
}

/// Increment database probe failures counter.
pub fn inc_db_probe_failures() {
    counter!(METRIC_DB_PROBE_FAILURES).increment(1);
}

/// Increment dashboard polls counter.
pub fn inc_polls(outcome: &'static str) {
    counter!(METRIC_POLLS, "outcome" => outcome).increment(1);
}

/// RAII guard for timing operations.
/// Automatically records latency when dropped.
pub struct LatencyTimer {
    start: Instant,
    metric_name: &'static str,
}

impl LatencyTimer {
    /// Create a new latency timer for the given metric.
    pub fn new(metric_name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            metric_name,
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        let latency_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        histogram!(self.metric_name).record(latency_ms);
    }
}

/// Create a latency timer for the database probe.
pub fn timer_db_probe() -> LatencyTimer {
    LatencyTimer::new(METRIC_DB_PROBE_LATENCY)
}
