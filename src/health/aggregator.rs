//! Combines process liveness with the database probe into one report.

use time::OffsetDateTime;

use super::types::{
    ApiHealth, ApiStatus, DatabaseHealth, DbStatus, HealthReport, OverallStatus, SERVICE_NAME,
};

/// Overall status: healthy only when the API is healthy and the database is connected.
pub fn overall_status(api: ApiStatus, database: DbStatus) -> OverallStatus {
    if api == ApiStatus::Healthy && database == DbStatus::Connected {
        OverallStatus::Healthy
    } else {
        OverallStatus::Degraded
    }
}

/// Build a report stamped with the current UTC time.
pub fn aggregate(database: DatabaseHealth) -> HealthReport {
    aggregate_at(database, OffsetDateTime::now_utc())
}

/// Build a report stamped with `timestamp`.
pub fn aggregate_at(database: DatabaseHealth, timestamp: OffsetDateTime) -> HealthReport {
    let api = ApiHealth::alive(timestamp);
    let status = overall_status(api.status, database.status);

    HealthReport {
        status,
        api,
        database,
        service: SERVICE_NAME.to_string(),
    }
}
