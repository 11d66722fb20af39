//! Health-check API with a polling status dashboard.
//!
//! The API answers `GET /api/health` with a composite report: the process
//! is alive by construction, and the database is probed with `SELECT 1`.
//! The endpoint always answers 200; the body carries the health.
//!
//! ```text
//! api: healthy  +  database: connected     =>  healthy
//! api: healthy  +  database: disconnected  =>  degraded
//! api: healthy  +  database: unknown       =>  degraded
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`database`]: PostgreSQL pool setup and TLS policy
//! - [`health`]: Report types, aggregation and the database probe
//! - [`api`]: HTTP API for the root and health endpoints
//! - [`dashboard`]: Client poller and status rendering
//! - [`metrics`]: Prometheus metrics
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod dashboard;
pub mod database;
pub mod error;
pub mod health;
pub mod metrics;
pub mod utils;

pub use config::Config;
pub use error::{AppError, Result};
