//! Health report types shared by the API and the dashboard.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use time::OffsetDateTime;
use utoipa::ToSchema;

/// Service name carried in every report.
pub const SERVICE_NAME: &str = "api";

/// Composite status of the whole service.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OverallStatus {
    /// API alive and database connected.
    Healthy,
    /// At least one component is not healthy.
    Degraded,
}

/// Status of the API process itself.
///
/// Only one value exists: if the code building the report runs, the
/// process is alive.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ApiStatus {
    #[default]
    Healthy,
}

/// Result of the database probe.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DbStatus {
    /// `SELECT 1` succeeded.
    Connected,
    /// `SELECT 1` failed.
    Disconnected,
    /// No probe has run.
    #[default]
    Unknown,
}

/// API section of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ApiHealth {
    pub status: ApiStatus,
    /// When the report was built (RFC 3339).
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = DateTime)]
    pub timestamp: OffsetDateTime,
    pub service: String,
}

impl ApiHealth {
    /// API section for a live process at the given instant.
    pub fn alive(timestamp: OffsetDateTime) -> Self {
        Self {
            status: ApiStatus::Healthy,
            timestamp,
            service: SERVICE_NAME.to_string(),
        }
    }
}

/// Database section of the report.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub struct DatabaseHealth {
    pub status: DbStatus,
    /// Underlying failure message; serialized as `null` when absent.
    pub error: Option<String>,
}

impl DatabaseHealth {
    /// Probe succeeded.
    pub fn connected() -> Self {
        Self {
            status: DbStatus::Connected,
            error: None,
        }
    }

    /// Probe failed with the given message.
    pub fn disconnected(error: impl Into<String>) -> Self {
        Self {
            status: DbStatus::Disconnected,
            error: Some(error.into()),
        }
    }

    /// Probe never ran.
    pub fn unknown() -> Self {
        Self::default()
    }
}

/// Health document served on `/api/health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthReport {
    pub status: OverallStatus,
    pub api: ApiHealth,
    pub database: DatabaseHealth,
    pub service: String,
}

impl HealthReport {
    /// Check if the composite status is healthy.
    pub fn is_healthy(&self) -> bool {
        self.status == OverallStatus::Healthy
    }

    /// Compare two reports, ignoring when they were built.
    pub fn eq_ignoring_timestamp(&self, other: &Self) -> bool {
        self.status == other.status
            && self.api.status == other.api.status
            && self.api.service == other.api.service
            && self.database == other.database
            && self.service == other.service
    }
}

/// Response for the root endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WelcomeResponse {
    pub message: String,
}
