//! PostgreSQL connection pool setup.
//!
//! The pool is created lazily: the service starts and keeps answering health
//! checks even when the database is down at boot.

use std::str::FromStr;

use regex::Regex;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgSslMode};
use tracing::{debug, info};
use url::Url;

use crate::config::Config;
use crate::error::{AppError, Result};

/// How TLS is negotiated with the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsPolicy {
    /// The connection string sets `sslmode` itself.
    FromUrl,
    /// Managed database: TLS required, certificate not verified.
    Relaxed,
    /// Plain TCP.
    Disabled,
}

impl TlsPolicy {
    /// Decide the policy for a database URL.
    ///
    /// An explicit `sslmode` always wins; otherwise the host is matched
    /// against the managed-database pattern.
    pub fn for_url(url: &Url, managed_host: &Regex) -> Self {
        if url
            .query_pairs()
            .any(|(key, _)| key == "sslmode" || key == "ssl-mode")
        {
            return Self::FromUrl;
        }

        match url.host_str() {
            Some(host) if managed_host.is_match(host) => Self::Relaxed,
            _ => Self::Disabled,
        }
    }

    fn apply(self, options: PgConnectOptions) -> PgConnectOptions {
        match self {
            Self::FromUrl => options,
            Self::Relaxed => options.ssl_mode(PgSslMode::Require),
            Self::Disabled => options.ssl_mode(PgSslMode::Disable),
        }
    }
}

/// Build connection options from configuration, applying the TLS policy.
pub fn connect_options(config: &Config) -> Result<(PgConnectOptions, TlsPolicy)> {
    let url = Url::parse(&config.database_url)
        .map_err(|e| AppError::InvalidConfig(format!("DATABASE_URL: {}", e)))?;
    let managed_host = Regex::new(&config.database_tls_relax_pattern)
        .map_err(|e| AppError::InvalidConfig(format!("DATABASE_TLS_RELAX_PATTERN: {}", e)))?;

    let policy = TlsPolicy::for_url(&url, &managed_host);
    let options = PgConnectOptions::from_str(&config.database_url)?;

    debug!(host = ?url.host_str(), policy = ?policy, "Resolved database TLS policy");

    Ok((policy.apply(options), policy))
}

/// Pool options sized from configuration.
pub fn pool_options(config: &Config) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(config.acquire_timeout())
}

/// Create the lazily-connecting pool shared by all health checks.
///
/// Must be called from within a Tokio runtime.
pub fn create_pool(config: &Config) -> Result<PgPool> {
    let (options, policy) = connect_options(config)?;

    info!(
        max_connections = config.database_max_connections,
        acquire_timeout_ms = config.database_acquire_timeout_ms,
        tls = ?policy,
        "Created database pool"
    );

    Ok(pool_options(config).connect_lazy_with(options))
}
