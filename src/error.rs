//! Unified error types for the status service and dashboard.

use thiserror::Error;

/// Unified error type for the service.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration loaded but failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Database setup error (pool or connection options).
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// HTTP client construction or request error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON encoding error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Health probe errors.
///
/// Never reaches the HTTP layer: the probe turns it into a
/// `disconnected` database status.
#[derive(Error, Debug)]
pub enum HealthError {
    /// The liveness query failed for any reason (network, auth, timeout).
    #[error("{0}")]
    DatabaseUnreachable(#[from] sqlx::Error),
}

/// Client-side fetch errors seen by the dashboard poller.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The request never produced a response.
    #[error("Failed to connect to API")]
    Connect(#[source] reqwest::Error),

    /// The request exceeded the configured fetch timeout.
    #[error("Request timed out")]
    Timeout(#[source] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("HTTP {0}")]
    Status(u16),

    /// The response body was not a health report.
    #[error("Invalid health report: {0}")]
    Decode(#[source] reqwest::Error),
}

impl TransportError {
    /// Classify a `reqwest` failure raised while sending a request.
    pub fn from_send(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err)
        } else {
            Self::Connect(err)
        }
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_renders_code() {
        assert_eq!(TransportError::Status(500).to_string(), "HTTP 500");
        assert_eq!(TransportError::Status(404).to_string(), "HTTP 404");
    }

    #[test]
    fn invalid_config_is_descriptive() {
        let err = AppError::InvalidConfig("PORT must not be 0".to_string());
        assert_eq!(err.to_string(), "invalid configuration: PORT must not be 0");
    }

    #[test]
    fn database_unreachable_keeps_underlying_message() {
        let err = HealthError::from(sqlx::Error::PoolTimedOut);
        assert_eq!(err.to_string(), sqlx::Error::PoolTimedOut.to_string());
    }
}
