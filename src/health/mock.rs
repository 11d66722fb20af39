//! Mock database probe for testing.
//!
//! This module provides a probe that can be used in tests
//! without a running database.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use super::probe::DatabaseProbe;
use super::types::DatabaseHealth;

/// Configuration for mock probe behavior.
#[derive(Debug, Clone, Default)]
pub struct MockProbeConfig {
    /// Failure message to report, `None` for a connected database.
    pub failure: Option<String>,
    /// Simulated latency in milliseconds.
    pub latency_ms: u64,
}

/// Mock probe for testing.
///
/// Clones share configuration and call counter, so a test can keep a clone
/// and flip the outcome while a server owns another.
#[derive(Debug, Clone, Default)]
pub struct MockProbe {
    config: Arc<Mutex<MockProbeConfig>>,
    calls: Arc<AtomicU64>,
}

impl MockProbe {
    /// Create a mock probe reporting a connected database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock probe that fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_config(MockProbeConfig {
            failure: Some(message.into()),
            ..Default::default()
        })
    }

    /// Create a mock probe with custom configuration.
    pub fn with_config(config: MockProbeConfig) -> Self {
        Self {
            config: Arc::new(Mutex::new(config)),
            calls: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Set or clear the failure message.
    pub fn set_failure(&self, failure: Option<String>) {
        self.lock().failure = failure;
    }

    /// Number of probes run so far.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockProbeConfig> {
        self.config.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl DatabaseProbe for MockProbe {
    async fn probe(&self) -> DatabaseHealth {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let config = self.lock().clone();
        if config.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(config.latency_ms)).await;
        }

        match config.failure {
            Some(message) => DatabaseHealth::disconnected(message),
            None => DatabaseHealth::connected(),
        }
    }
}
