//! Health module.
//!
//! This module handles:
//! - Health report types
//! - Aggregation of component statuses
//! - Database liveness probe
//! - Mock probe for testing

pub mod aggregator;
pub mod mock;
pub mod probe;
pub mod types;

pub use aggregator::{aggregate, aggregate_at, overall_status};
pub use mock::{MockProbe, MockProbeConfig};
pub use probe::{DatabaseProbe, PgProbe};
pub use types::{
    ApiHealth, ApiStatus, DatabaseHealth, DbStatus, HealthReport, OverallStatus, WelcomeResponse,
};

/// Probe the database once and build a fresh report.
pub async fn check(probe: &dyn DatabaseProbe) -> HealthReport {
    let report = aggregate(probe.probe().await);
    crate::metrics::inc_health_checks(report.status);
    report
}
