//! Update synchronizer state machine and retry scheduler.

use crate::config::RetryConfig;
use crate::oracle::ConfigurationOracle;
use crate::sink::UpdateSink;
use avlink_entity::StateSnapshot;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Counters kept by the synchronizer for diagnostics and assertions.
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    /// Emissions delivered directly from `notify`.
    pub immediate_emissions: u64,
    /// Notifications that had to be parked for retry.
    pub deferrals: u64,
    /// Retry cycles started.
    pub retry_cycles: u64,
    /// Individual retry attempts made.
    pub retry_attempts: u64,
    /// Emissions delivered by the retry scheduler.
    pub deferred_emissions: u64,
    /// Retry cycles that ran out of attempts.
    pub exhausted_cycles: u64,
    /// Last emission error message.
    pub last_error: Option<String>,
}

/// Mutable synchronization state, one per appliance session.
struct SyncState {
    /// Set by the first successful emission while configured; never reset.
    confirmed: bool,
    /// Latest undelivered snapshot. Overwritten, never queued.
    pending: Option<StateSnapshot>,
    /// Attempts made in the current retry cycle.
    retry_attempt: u32,
    /// Handle of the in-flight retry task, if any.
    retry_task: Option<JoinHandle<()>>,
    stats: SyncStats,
}

struct Inner<O, S> {
    retry: RetryConfig,
    oracle: O,
    sink: S,
    state: Mutex<SyncState>,
}

/// The synchronization state machine.
///
/// Owns the configured/unconfirmed distinction for one appliance session,
/// decides whether a fresh snapshot is emitted immediately or deferred,
/// and drives the bounded retry loop for deferred snapshots.
///
/// Handles are cheap to clone and share one state. [`notify`] is
/// synchronous and non-blocking, but must be called from within a Tokio
/// runtime because the retry scheduler is a spawned task.
///
/// [`notify`]: UpdateSynchronizer::notify
pub struct UpdateSynchronizer<O, S> {
    inner: Arc<Inner<O, S>>,
}

impl<O, S> Clone for UpdateSynchronizer<O, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<O, S> UpdateSynchronizer<O, S> {
    /// Creates a synchronizer for one appliance session.
    pub fn new(retry: RetryConfig, oracle: O, sink: S) -> Self {
        Self {
            inner: Arc::new(Inner {
                retry,
                oracle,
                sink,
                state: Mutex::new(SyncState {
                    confirmed: false,
                    pending: None,
                    retry_attempt: 0,
                    retry_task: None,
                    stats: SyncStats::default(),
                }),
            }),
        }
    }

    /// Returns true once a delivery has succeeded while configured.
    pub fn confirmed(&self) -> bool {
        self.inner.state.lock().confirmed
    }

    /// Returns true while an undelivered snapshot is parked.
    pub fn has_pending(&self) -> bool {
        self.inner.state.lock().pending.is_some()
    }

    /// Returns true while a retry cycle is in flight.
    pub fn retry_active(&self) -> bool {
        self.inner
            .state
            .lock()
            .retry_task
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Returns a copy of the synchronizer's counters.
    pub fn stats(&self) -> SyncStats {
        self.inner.state.lock().stats.clone()
    }

    /// Tears the synchronizer down: cancels a live retry cycle and drops
    /// any pending snapshot. Called on session disconnect/shutdown.
    pub fn shutdown(&self) {
        let mut state = self.inner.state.lock();
        state.pending = None;
        if let Some(task) = state.retry_task.take() {
            task.abort();
            debug!("retry task cancelled on shutdown");
        }
    }
}

impl<O, S> UpdateSynchronizer<O, S>
where
    O: ConfigurationOracle + 'static,
    S: UpdateSink + 'static,
{
    /// Accepts fresh entity state from the appliance session.
    ///
    /// Emits immediately when a prior delivery was confirmed or the
    /// entities are configured right now; otherwise parks the snapshot
    /// (latest wins) and makes sure a retry cycle is running. Never
    /// blocks, never fails.
    pub fn notify(&self, snapshot: StateSnapshot) {
        let inner = &self.inner;
        let mut state = inner.state.lock();

        if state.confirmed {
            // Past the first confirmed delivery the hub accepts updates;
            // a transient emission failure is not worth deferring over.
            state.stats.immediate_emissions += 1;
            if let Err(err) = inner.sink.emit(&snapshot) {
                warn!(error = %err, "update emission failed after confirmation");
                state.stats.last_error = Some(err.to_string());
            }
            return;
        }

        if inner.oracle.is_configured() {
            match inner.sink.emit(&snapshot) {
                Ok(()) => {
                    state.confirmed = true;
                    state.pending = None;
                    state.stats.immediate_emissions += 1;
                    if let Some(task) = state.retry_task.take() {
                        task.abort();
                    }
                    info!("first entity update delivered, session confirmed");
                    return;
                }
                Err(err) => {
                    // Treated like "not configured": defer and retry.
                    warn!(error = %err, "update emission failed, deferring");
                    state.stats.last_error = Some(err.to_string());
                }
            }
        }

        state.pending = Some(snapshot);
        state.stats.deferrals += 1;

        let retry_running = state
            .retry_task
            .as_ref()
            .is_some_and(|task| !task.is_finished());
        if !retry_running {
            state.retry_attempt = 0;
            state.stats.retry_cycles += 1;
            let inner = Arc::clone(inner);
            state.retry_task = Some(tokio::spawn(Self::retry_loop(inner)));
            debug!(
                interval_ms = self.inner.retry.interval.as_millis() as u64,
                max_attempts = self.inner.retry.max_attempts,
                "entities not configured yet, update deferred"
            );
        }
    }

    /// The retry scheduler task.
    ///
    /// Every exit path clears the task handle under the state lock, so a
    /// concurrent `notify` either sees a live task or none at all.
    async fn retry_loop(inner: Arc<Inner<O, S>>) {
        let interval = inner.retry.interval;
        let max_attempts = inner.retry.max_attempts;

        loop {
            tokio::time::sleep(interval).await;

            let mut state = inner.state.lock();
            let Some(snapshot) = state.pending.take() else {
                // Resolved by a direct notify while we slept.
                state.retry_task = None;
                return;
            };
            if state.confirmed {
                state.retry_task = None;
                return;
            }

            state.retry_attempt += 1;
            state.stats.retry_attempts += 1;
            let attempt = state.retry_attempt;

            if inner.oracle.is_configured() {
                match inner.sink.emit(&snapshot) {
                    Ok(()) => {
                        state.confirmed = true;
                        state.stats.deferred_emissions += 1;
                        state.retry_task = None;
                        info!(attempt, "deferred entity update delivered, session confirmed");
                        return;
                    }
                    Err(err) => {
                        warn!(attempt, error = %err, "deferred emission failed");
                        state.stats.last_error = Some(err.to_string());
                        state.pending = Some(snapshot);
                    }
                }
            } else {
                debug!(attempt, "entities still not configured");
                state.pending = Some(snapshot);
            }

            if attempt >= max_attempts {
                state.stats.exhausted_cycles += 1;
                state.retry_task = None;
                warn!(
                    attempts = attempt,
                    "retry budget exhausted, keeping update parked until the next state change"
                );
                return;
            }
        }
    }
}
