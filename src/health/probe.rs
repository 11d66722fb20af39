//! Database liveness probe.

use std::io;

use async_trait::async_trait;
use sqlx::{ConnectOptions, Connection, PgPool};
use tracing::{debug, instrument, warn};

use super::types::DatabaseHealth;
use crate::error::HealthError;
use crate::metrics;

/// Liveness query issued against the database.
pub const PROBE_QUERY: &str = "SELECT 1";

/// A single liveness check against the database.
///
/// Implementations never fail: every error becomes a `disconnected` result.
#[async_trait]
pub trait DatabaseProbe: Send + Sync + 'static {
    /// Run one probe attempt.
    async fn probe(&self) -> DatabaseHealth;
}

/// Probe backed by a PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct PgProbe {
    pool: PgPool,
}

impl PgProbe {
    /// Create a probe over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the pool reference.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Issue the liveness query once, no retry.
    ///
    /// The pool retries refused connects until its acquire timeout, so with
    /// no open pooled connection one direct connection is tried first and
    /// its error is reported as is.
    pub async fn ping(&self) -> Result<(), HealthError> {
        if self.pool.size() == 0 {
            self.connect_once().await?;
        }

        sqlx::query(PROBE_QUERY).execute(&self.pool).await?;
        Ok(())
    }

    async fn connect_once(&self) -> Result<(), HealthError> {
        let limit = self.pool.options().get_acquire_timeout();
        let options = self.pool.connect_options();

        let mut conn = tokio::time::timeout(limit, options.connect())
            .await
            .map_err(|_| {
                sqlx::Error::Io(io::Error::new(
                    io::ErrorKind::TimedOut,
                    "timed out connecting to database",
                ))
            })??;

        let result = sqlx::query(PROBE_QUERY).execute(&mut conn).await;
        if let Err(e) = conn.close().await {
            debug!(error = %e, "Closing direct probe connection failed");
        }
        result?;
        Ok(())
    }
}

#[async_trait]
impl DatabaseProbe for PgProbe {
    #[instrument(skip(self))]
    async fn probe(&self) -> DatabaseHealth {
        let _timer = metrics::timer_db_probe();

        match self.ping().await {
            Ok(()) => {
                debug!("Database reachable");
                DatabaseHealth::connected()
            }
            Err(HealthError::DatabaseUnreachable(e)) => {
                warn!(error = %e, "Database probe failed");
                metrics::inc_db_probe_failures();
                DatabaseHealth::disconnected(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::DbStatus;
    use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
    use std::time::{Duration, Instant};

    fn unreachable_pool() -> PgPool {
        // Port 1 on loopback refuses connections.
        let options = PgConnectOptions::new()
            .host("127.0.0.1")
            .port(1)
            .username("user")
            .password("password")
            .database("dbname");

        PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(3))
            .connect_lazy_with(options)
    }

    #[tokio::test]
    async fn unreachable_database_reports_disconnected() {
        let probe = PgProbe::new(unreachable_pool());

        let started = Instant::now();
        let health = probe.probe().await;
        let elapsed = started.elapsed();

        assert_eq!(health.status, DbStatus::Disconnected);
        let error = health.error.unwrap_or_default().to_lowercase();
        assert!(error.contains("refused"), "{}", error);
        assert!(elapsed < Duration::from_secs(1), "took {:?}", elapsed);
    }

    #[tokio::test]
    async fn every_probe_surfaces_the_refusal() {
        let probe = PgProbe::new(unreachable_pool());

        for _ in 0..2 {
            let health = probe.probe().await;
            let error = health.error.unwrap_or_default();
            assert!(!error.contains("pool timed out"), "{}", error);
        }
    }

    #[tokio::test]
    async fn ping_surfaces_database_unreachable() {
        let probe = PgProbe::new(unreachable_pool());
        tokio_test::assert_err!(probe.ping().await);
    }
}
