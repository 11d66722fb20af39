//! Recurring health poller.
//!
//! One fetch runs immediately on spawn, then one per interval until the
//! handle is shut down or dropped. Each tick spawns its own fetch task, so a
//! response slower than the interval overlaps the next one; the state is
//! last-write-wins. Shutting down stops the schedule only, fetches already
//! in flight still complete.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::client::HealthClient;
use crate::error::TransportError;
use crate::health::HealthReport;
use crate::metrics;

/// Dashboard-side view of the API's health.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClientHealthState {
    /// Last report, cleared on error.
    pub report: Option<HealthReport>,
    /// True until the first fetch completes.
    pub loading: bool,
    /// Last fetch error, cleared on success.
    pub error: Option<String>,
}

impl ClientHealthState {
    /// State before the first fetch completes.
    pub fn loading() -> Self {
        Self {
            report: None,
            loading: true,
            error: None,
        }
    }

    /// Replacement state after a fetch completes.
    pub fn from_result(result: Result<HealthReport, TransportError>) -> Self {
        match result {
            Ok(report) => Self {
                report: Some(report),
                loading: false,
                error: None,
            },
            Err(e) => Self {
                report: None,
                loading: false,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Polls the health endpoint on a fixed interval.
#[derive(Debug, Clone)]
pub struct HealthPoller {
    client: HealthClient,
    interval: Duration,
}

impl HealthPoller {
    /// Create a poller. A zero interval is raised to one millisecond.
    pub fn new(client: HealthClient, interval: Duration) -> Self {
        Self {
            client,
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    /// Start polling on the current runtime.
    pub fn spawn(self) -> PollerHandle {
        let (state_tx, state_rx) = watch::channel(ClientHealthState::loading());
        let (stop_tx, stop_rx) = oneshot::channel();

        let task = tokio::spawn(self.run(state_tx, stop_rx));

        PollerHandle {
            state: state_rx,
            stop: Some(stop_tx),
            task: Some(task),
        }
    }

    async fn run(
        self,
        state: watch::Sender<ClientHealthState>,
        mut stop: oneshot::Receiver<()>,
    ) {
        let state = Arc::new(state);
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            url = %self.client.base_url(),
            interval_ms = self.interval.as_millis() as u64,
            "Health poller starting"
        );

        loop {
            tokio::select! {
                biased;
                _ = &mut stop => {
                    info!("Health poller stopped");
                    break;
                }
                _ = ticker.tick() => {
                    let client = self.client.clone();
                    let state = state.clone();
                    tokio::spawn(async move {
                        poll_once(&client, &state).await;
                    });
                }
            }
        }
    }
}

async fn poll_once(client: &HealthClient, state: &watch::Sender<ClientHealthState>) {
    let result = client.fetch().await;

    match &result {
        Ok(report) => {
            debug!(status = %report.status, "Poll succeeded");
            metrics::inc_polls("ok");
        }
        Err(e) => {
            warn!(error = %e, "Poll failed");
            metrics::inc_polls("error");
        }
    }

    state.send_replace(ClientHealthState::from_result(result));
}

/// Handle to a running poller.
///
/// Dropping the handle also stops the schedule.
#[derive(Debug)]
pub struct PollerHandle {
    state: watch::Receiver<ClientHealthState>,
    stop: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// Snapshot of the current state.
    pub fn state(&self) -> ClientHealthState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state replacement.
    pub fn subscribe(&self) -> watch::Receiver<ClientHealthState> {
        self.state.clone()
    }

    /// Stop the schedule and wait for it to exit.
    ///
    /// Once this returns no new fetch is started.
    pub async fn shutdown(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Health poller task ended abnormally");
            }
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
