//! Error types for the sync core.

use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors surfaced by update sinks.
///
/// None of these escape the synchronizer: `notify` never fails. While
/// unconfirmed, an emission error is handled exactly like "entities not
/// configured yet" and the snapshot is deferred for retry; once confirmed
/// it is logged and the next state change tries again.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The sink could not hand the update to the hub session.
    #[error("emission failed: {0}")]
    Emission(String),

    /// The hub-side channel is gone (session shut down).
    #[error("update channel closed")]
    ChannelClosed,
}

impl SyncError {
    /// Creates an emission error.
    pub fn emission(message: impl Into<String>) -> Self {
        Self::Emission(message.into())
    }
}
