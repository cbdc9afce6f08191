//! Appliance client abstraction.

use crate::error::{DeviceError, DeviceResult};
use crate::state::StateEvent;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::time::Duration;

/// Transport-level client for one receiver connection.
///
/// The concrete wire protocol lives outside this crate; a client only has
/// to establish the connection, fire the initial state query, and surface
/// receiver-originated changes as [`StateEvent`]s. `next_event` returning
/// `Ok(None)` means the receiver closed the connection.
#[async_trait]
pub trait ApplianceClient: Send {
    /// Establishes the connection.
    async fn connect(&mut self) -> DeviceResult<()>;

    /// Requests the full device state after connecting.
    ///
    /// Responses arrive asynchronously through `next_event`.
    async fn query_state(&mut self) -> DeviceResult<()>;

    /// Waits for the next state event from the receiver.
    async fn next_event(&mut self) -> DeviceResult<Option<StateEvent>>;

    /// Closes the connection.
    async fn close(&mut self);
}

/// What a [`ScriptedClient`] does once its script is drained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrainBehavior {
    /// Keep the connection open and idle.
    #[default]
    HoldOpen,
    /// Report the connection as closed by the receiver.
    Close,
}

/// A scripted appliance for tests and loopback simulations.
///
/// Plays back a fixed sequence of (delay, event) steps and can fail a
/// number of connection attempts first.
#[derive(Debug, Default)]
pub struct ScriptedClient {
    steps: VecDeque<(Duration, StateEvent)>,
    connect_failures: u32,
    drain: DrainBehavior,
    connected: bool,
    connect_attempts: u32,
    query_count: u32,
}

impl ScriptedClient {
    /// Creates an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event delivered immediately.
    pub fn event(self, event: StateEvent) -> Self {
        self.event_after(Duration::ZERO, event)
    }

    /// Appends an event delivered after a delay.
    pub fn event_after(mut self, delay: Duration, event: StateEvent) -> Self {
        self.steps.push_back((delay, event));
        self
    }

    /// Makes the first `count` connection attempts fail.
    pub fn fail_connects(mut self, count: u32) -> Self {
        self.connect_failures = count;
        self
    }

    /// Closes the connection once the script is drained.
    pub fn close_when_drained(mut self) -> Self {
        self.drain = DrainBehavior::Close;
        self
    }

    /// Returns how many connection attempts were made.
    pub fn connect_attempts(&self) -> u32 {
        self.connect_attempts
    }

    /// Returns how many state queries were issued.
    pub fn query_count(&self) -> u32 {
        self.query_count
    }
}

#[async_trait]
impl ApplianceClient for ScriptedClient {
    async fn connect(&mut self) -> DeviceResult<()> {
        self.connect_attempts += 1;
        if self.connect_failures > 0 {
            self.connect_failures -= 1;
            return Err(DeviceError::connection_failed("scripted connect failure"));
        }
        self.connected = true;
        Ok(())
    }

    async fn query_state(&mut self) -> DeviceResult<()> {
        if !self.connected {
            return Err(DeviceError::NotConnected);
        }
        self.query_count += 1;
        Ok(())
    }

    async fn next_event(&mut self) -> DeviceResult<Option<StateEvent>> {
        if !self.connected {
            return Err(DeviceError::NotConnected);
        }
        match self.steps.front().map(|(delay, _)| *delay) {
            Some(delay) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                // Pop only after the delay so a cancelled wait replays
                // the step on the next call.
                Ok(self.steps.pop_front().map(|(_, event)| event))
            }
            None => match self.drain {
                DrainBehavior::Close => Ok(None),
                DrainBehavior::HoldOpen => std::future::pending().await,
            },
        }
    }

    async fn close(&mut self) {
        self.connected = false;
    }
}
