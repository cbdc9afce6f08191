//! # AVLink Sync Core
//!
//! Deferred entity-update synchronization for AVLink.
//!
//! This crate provides:
//! - `UpdateSynchronizer`, the synchronization state machine
//! - A fixed-cadence, bounded retry scheduler for deferred updates
//! - `ConfigurationOracle` and `UpdateSink` collaborator traits
//! - Registry and channel adapters plus mock collaborators for tests
//!
//! ## Architecture
//!
//! The appliance session reports fresh entity state through
//! [`UpdateSynchronizer::notify`]. Two timelines race on a fresh setup:
//! the device connection (which produces the first state snapshot) and the
//! hub's subscription event (which makes entities accept updates). The
//! synchronizer reconciles them:
//!
//! 1. If entities are configured (or a delivery already succeeded once),
//!    the snapshot is emitted immediately.
//! 2. Otherwise the snapshot is parked as the pending update — the latest
//!    notification always overwrites it — and a retry task re-checks the
//!    oracle on a fixed interval until delivery succeeds or the attempt
//!    budget runs out. A later `notify` starts a fresh cycle.
//!
//! ## Key Invariants
//!
//! - `confirmed` is monotonic: set on the first successful emission while
//!   configured, never reset for the session's lifetime
//! - A pending snapshot exists only while unconfirmed
//! - At most one retry task runs per synchronizer at any time
//! - Only the newest pending snapshot is ever delivered; intermediate
//!   snapshots are coalesced away
//! - `notify` never blocks and never fails

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod oracle;
mod sink;
mod synchronizer;

pub use config::RetryConfig;
pub use error::{SyncError, SyncResult};
pub use oracle::{ConfigurationOracle, MockOracle, RegistryOracle};
pub use sink::{ChannelSink, MockSink, UpdateSink};
pub use synchronizer::{SyncStats, UpdateSynchronizer};
