//! # AVLink Device
//!
//! AV receiver session and entity state model for AVLink.
//!
//! This crate provides:
//! - `ReceiverState`, the driver-side mirror of the appliance
//! - `StateEvent`, the state changes an appliance client reports
//! - `ApplianceClient`, the transport abstraction (plus a scripted
//!   implementation for tests and simulations)
//! - `DeviceSession`, the connect/query/event loop that feeds the
//!   sync core through `UpdateSynchronizer::notify`
//!
//! The byte-level receiver protocol is a collaborator concern and lives
//! outside this crate; anything that can produce `StateEvent`s can drive
//! a session.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod config;
mod error;
mod session;
mod state;

pub use client::{ApplianceClient, DrainBehavior, ScriptedClient};
pub use config::DeviceConfig;
pub use error::{DeviceError, DeviceResult};
pub use session::{DeviceSession, SessionHandle};
pub use state::{owned_entity_ids, InputSource, ReceiverState, StateEvent, SurroundMode};
