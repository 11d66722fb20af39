//! HTTP client for the health endpoint.

use std::time::Duration;

use tracing::{debug, instrument};

use crate::config::Config;
use crate::error::{AppError, TransportError};
use crate::health::HealthReport;

/// Path of the health endpoint relative to the API base URL.
pub const HEALTH_PATH: &str = "/api/health";

/// Client fetching health reports from the API.
#[derive(Debug, Clone)]
pub struct HealthClient {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// API base URL without trailing slash.
    base_url: String,
}

impl HealthClient {
    /// Create a client for `base_url`, bounding each fetch by `timeout` when set.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, AppError> {
        let mut builder = reqwest::Client::builder()
            .tcp_nodelay(true)
            .pool_idle_timeout(Duration::from_secs(90));

        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            http: builder.build()?,
            base_url,
        })
    }

    /// Create a client from configuration.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::new(config.api_url.clone(), config.poll_timeout())
    }

    /// Get the API base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of the health endpoint.
    pub fn health_url(&self) -> String {
        format!("{}{}", self.base_url, HEALTH_PATH)
    }

    /// Fetch one health report.
    #[instrument(skip(self), fields(url = %self.base_url))]
    pub async fn fetch(&self) -> Result<HealthReport, TransportError> {
        let response = self
            .http
            .get(self.health_url())
            .send()
            .await
            .map_err(TransportError::from_send)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        let report: HealthReport = response.json().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(e)
            } else {
                TransportError::Decode(e)
            }
        })?;

        debug!(status = %report.status, "Fetched health report");

        Ok(report)
    }
}
