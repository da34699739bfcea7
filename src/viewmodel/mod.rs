//! Polling view-model.
//!
//! [`PollingViewModel`] keeps a locally fresh view of the monitored services.
//! A background task fetches a snapshot from a [`MonitorSource`] once
//! immediately and then on a fixed interval, replacing the published
//! [`ViewState`] wholesale on success and leaving it untouched on failure.
//!
//! # Overlap policy
//!
//! Skip-if-pending. At most one fetch is in flight; a tick that starts while
//! another fetch is pending returns [`TickOutcome::Skipped`]. The only
//! exception is [`PollingViewModel::refresh`], which waits for the pending
//! fetch and then performs its own, so a refresh requested after an add
//! always observes the add.
//!
//! # Teardown
//!
//! [`PollingViewModel::dispose`] cancels the polling task and is a barrier:
//! once it returns, no further state write can happen. In-flight fetches are
//! dropped when the token fires.

mod state;

#[cfg(test)]
mod tests;

pub use state::{
    FailureKind, FilteredServices, OverallStatus, PollFailure, ServiceCounts, TickOutcome,
    ViewState,
};

use crate::gateway::{AddConfirmation, GatewayError, MonitorSource};
use crate::monitor::MonitoredService;
use chrono::Utc;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Smallest accepted polling period.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Shared between the handle and the polling task.
struct Shared {
    source: Arc<dyn MonitorSource>,
    state: watch::Sender<ViewState>,
    /// Held for the duration of a fetch
    fetch_lock: tokio::sync::Mutex<()>,
    cancel: CancellationToken,
}

/// Owns the polling task and the published [`ViewState`].
pub struct PollingViewModel {
    shared: Arc<Shared>,
    interval: Duration,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl PollingViewModel {
    /// Publish the seed (or an empty loading state) and start polling.
    ///
    /// Returns immediately; the first tick runs on the spawned task. Must be
    /// called inside a Tokio runtime.
    pub fn initialize(
        source: Arc<dyn MonitorSource>,
        interval: Duration,
        seed: Option<Vec<MonitoredService>>,
    ) -> Self {
        let interval = interval.max(MIN_POLL_INTERVAL);
        let (state, _) = watch::channel(ViewState::seeded(seed));
        let shared = Arc::new(Shared {
            source,
            state,
            fetch_lock: tokio::sync::Mutex::new(()),
            cancel: CancellationToken::new(),
        });

        let task = spawn_poller(Arc::clone(&shared), interval);

        Self {
            shared,
            interval,
            task: Mutex::new(Some(task)),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run one tick now, unless a fetch is already in flight.
    pub async fn poll_tick(&self) -> TickOutcome {
        self.shared.poll_tick().await
    }

    /// Wait for any in-flight fetch, then fetch again.
    pub async fn refresh(&self) -> TickOutcome {
        self.shared.refresh().await
    }

    /// Update the filter. Never triggers a fetch.
    pub fn set_search_term(&self, term: impl Into<String>) {
        let term = term.into();
        self.shared.write(|state| state.search_term = term);
    }

    pub fn search_term(&self) -> String {
        self.shared.state.borrow().search_term.clone()
    }

    /// Current state. Cheap: the service list is shared, not copied.
    pub fn snapshot(&self) -> ViewState {
        self.shared.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.shared.state.subscribe()
    }

    /// Filtered services of the current state, collected.
    pub fn filtered_services(&self) -> Vec<MonitoredService> {
        self.shared
            .state
            .borrow()
            .filtered_services()
            .cloned()
            .collect()
    }

    pub fn all_up(&self) -> bool {
        self.shared.state.borrow().all_up()
    }

    /// Add a monitor, then refresh from the backend.
    ///
    /// A blank url fails with [`GatewayError::Validation`] and a disposed
    /// view-model with [`GatewayError::Disposed`], both before any network
    /// call. The new entry is never inserted locally; it appears once the
    /// backend reports it.
    pub async fn add_service(&self, url: &str) -> Result<AddConfirmation, GatewayError> {
        if self.is_disposed() {
            return Err(GatewayError::Disposed);
        }
        let url = url.trim();
        if url.is_empty() {
            return Err(GatewayError::Validation("URL is required".to_string()));
        }

        let confirmation = self.shared.source.add_service(url).await?;
        let outcome = self.shared.refresh().await;
        tracing::debug!(url, outcome = outcome.as_str(), "Refreshed after add");
        Ok(confirmation)
    }

    pub fn is_disposed(&self) -> bool {
        self.shared.cancel.is_cancelled()
    }

    /// Stop polling. No state write happens after this returns.
    pub async fn dispose(&self) {
        self.shared.cancel.cancel();
        // Any writer that took the channel lock before the cancel finishes
        // here; every later writer observes the cancelled token.
        self.shared.state.send_if_modified(|_| false);

        let task = match self.task.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(task) = task {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Polling task ended abnormally");
            }
        }
    }
}

impl Drop for PollingViewModel {
    fn drop(&mut self) {
        self.shared.cancel.cancel();
    }
}

fn spawn_poller(shared: Arc<Shared>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        tracing::info!(
            interval_ms = interval.as_millis() as u64,
            "Polling view-model started"
        );

        loop {
            tokio::select! {
                _ = shared.cancel.cancelled() => {
                    tracing::info!("Polling view-model stopped");
                    break;
                }
                _ = ticker.tick() => {
                    if shared.poll_tick().await == TickOutcome::Disposed {
                        break;
                    }
                }
            }
        }
    })
}

impl Shared {
    /// Apply `update` unless disposed. Returns whether it was applied.
    fn write(&self, update: impl FnOnce(&mut ViewState)) -> bool {
        self.state.send_if_modified(|state| {
            if self.cancel.is_cancelled() {
                return false;
            }
            update(state);
            true
        })
    }

    async fn poll_tick(&self) -> TickOutcome {
        if self.cancel.is_cancelled() {
            return TickOutcome::Disposed;
        }
        let Ok(guard) = self.fetch_lock.try_lock() else {
            tracing::debug!("Poll tick skipped, fetch already in flight");
            record_tick(&TickOutcome::Skipped);
            return TickOutcome::Skipped;
        };
        let outcome = self.fetch().await;
        drop(guard);
        outcome
    }

    async fn refresh(&self) -> TickOutcome {
        let guard = tokio::select! {
            _ = self.cancel.cancelled() => return TickOutcome::Disposed,
            guard = self.fetch_lock.lock() => guard,
        };
        let outcome = self.fetch().await;
        drop(guard);
        outcome
    }

    /// Fetch and reconcile. Caller holds `fetch_lock`.
    async fn fetch(&self) -> TickOutcome {
        if !self.write(|state| state.is_refreshing = true) {
            return TickOutcome::Disposed;
        }

        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return TickOutcome::Disposed,
            result = self.source.list_services() => result,
        };

        let now = Utc::now();
        let outcome = match result {
            Ok(services) => {
                let count = services.len();
                let services = Arc::new(services);
                let applied = self.write(|state| {
                    state.services = services;
                    state.is_loading = false;
                    state.is_refreshing = false;
                    state.last_failure = None;
                    state.last_success_at = Some(now);
                    state.generation += 1;
                });
                if !applied {
                    return TickOutcome::Disposed;
                }
                tracing::debug!(services = count, "Snapshot applied");
                TickOutcome::Applied { services: count }
            }
            Err(e) => {
                let kind = FailureKind::from(&e);
                tracing::warn!(
                    error = %e,
                    kind = kind.as_str(),
                    "Poll failed, keeping previous snapshot"
                );
                let applied = self.write(|state| {
                    let consecutive = state
                        .last_failure
                        .as_ref()
                        .map_or(1, |prev| prev.consecutive + 1);
                    state.is_loading = false;
                    state.is_refreshing = false;
                    state.last_failure = Some(PollFailure::from_error(&e, now, consecutive));
                });
                if !applied {
                    return TickOutcome::Disposed;
                }
                TickOutcome::Failed(kind)
            }
        };

        record_tick(&outcome);
        if let TickOutcome::Applied { .. } = outcome {
            let counts = self.state.borrow().counts();
            metrics::gauge!("statusboard_services", "state" => "up").set(counts.up as f64);
            metrics::gauge!("statusboard_services", "state" => "down").set(counts.down as f64);
        }
        outcome
    }
}

fn record_tick(outcome: &TickOutcome) {
    metrics::counter!("statusboard_poll_ticks_total", "outcome" => outcome.as_str()).increment(1);
}
