//! Update sink abstraction.

use crate::error::{SyncError, SyncResult};
use avlink_entity::StateSnapshot;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;

/// Best-effort delivery of a full state update toward the hub.
///
/// `emit` must be prompt: it hands the snapshot off (typically into a
/// channel drained by the hub session) and returns without waiting for
/// hub-side processing. There is no delivery acknowledgement; an `Ok`
/// means the handoff succeeded, nothing more.
pub trait UpdateSink: Send + Sync {
    /// Emits a state update for all owned entities.
    fn emit(&self, snapshot: &StateSnapshot) -> SyncResult<()>;
}

/// Sink that forwards snapshots into an unbounded channel.
///
/// The hub session owns the receiving end and serializes each snapshot
/// onto the wire at its own pace.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<StateSnapshot>,
}

impl ChannelSink {
    /// Creates a sink and the receiver the hub session drains.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<StateSnapshot>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl UpdateSink for ChannelSink {
    fn emit(&self, snapshot: &StateSnapshot) -> SyncResult<()> {
        self.tx
            .send(snapshot.clone())
            .map_err(|_| SyncError::ChannelClosed)
    }
}

/// A recording sink for tests.
///
/// Captures every emitted snapshot and can be switched into a failing
/// mode to exercise the emission-failure paths.
#[derive(Debug, Default)]
pub struct MockSink {
    emitted: std::sync::Mutex<Vec<StateSnapshot>>,
    failing: AtomicBool,
}

impl MockSink {
    /// Creates a recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent emissions fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Returns all snapshots emitted so far.
    pub fn emitted(&self) -> Vec<StateSnapshot> {
        self.emitted.lock().unwrap().clone()
    }

    /// Returns the number of successful emissions.
    pub fn emission_count(&self) -> usize {
        self.emitted.lock().unwrap().len()
    }
}

impl UpdateSink for MockSink {
    fn emit(&self, snapshot: &StateSnapshot) -> SyncResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SyncError::emission("mock sink failure"));
        }
        self.emitted.lock().unwrap().push(snapshot.clone());
        Ok(())
    }
}

impl<S: UpdateSink> UpdateSink for std::sync::Arc<S> {
    fn emit(&self, snapshot: &StateSnapshot) -> SyncResult<()> {
        self.as_ref().emit(snapshot)
    }
}
