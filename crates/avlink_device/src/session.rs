//! Device session: the connect/query/event loop feeding the sync core.

use crate::client::ApplianceClient;
use crate::config::DeviceConfig;
use crate::state::ReceiverState;
use avlink_sync::{ConfigurationOracle, UpdateSink, UpdateSynchronizer};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Handle for stopping a running [`DeviceSession`].
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: watch::Sender<bool>,
}

impl SessionHandle {
    /// Signals the session to stop after its current step.
    pub fn shutdown(&self) {
        let _ = self.tx.send(true);
    }
}

/// One appliance session.
///
/// Owns the receiver state mirror and a handle to the update synchronizer.
/// `run` maintains the connection for the session's lifetime: connect
/// (bounded by the configured timeout), query the initial state, fold
/// receiver events into the mirror and notify the synchronizer on every
/// change, and reconnect with capped exponential backoff when the
/// connection drops. Teardown always cancels the synchronizer's retry
/// task, whichever way the session ends.
pub struct DeviceSession<C, O, S> {
    config: DeviceConfig,
    state: ReceiverState,
    client: C,
    sync: UpdateSynchronizer<O, S>,
    shutdown_rx: watch::Receiver<bool>,
}

impl<C, O, S> DeviceSession<C, O, S> {
    /// Creates a session and the handle that stops it.
    pub fn new(
        config: DeviceConfig,
        client: C,
        sync: UpdateSynchronizer<O, S>,
    ) -> (Self, SessionHandle) {
        let (tx, shutdown_rx) = watch::channel(false);
        let state = ReceiverState::new(config.identifier.clone());
        (
            Self {
                config,
                state,
                client,
                sync,
                shutdown_rx,
            },
            SessionHandle { tx },
        )
    }

    /// Returns the session's synchronizer handle.
    pub fn synchronizer(&self) -> UpdateSynchronizer<O, S> {
        self.sync.clone()
    }
}

impl<C, O, S> Drop for DeviceSession<C, O, S> {
    fn drop(&mut self) {
        self.sync.shutdown();
    }
}

impl<C, O, S> DeviceSession<C, O, S>
where
    C: ApplianceClient,
    O: ConfigurationOracle + 'static,
    S: UpdateSink + 'static,
{
    /// Runs the session until shutdown is signalled.
    pub async fn run(mut self) {
        info!(
            device = %self.config.identifier,
            address = %self.config.address(),
            "device session starting"
        );

        let mut shutdown = self.shutdown_rx.clone();
        let mut backoff = self.config.reconnect_initial_delay;

        while !*shutdown.borrow() {
            match tokio::time::timeout(self.config.connect_timeout, self.client.connect()).await {
                Ok(Ok(())) => {
                    info!(device = %self.config.identifier, "connected");
                    backoff = self.config.reconnect_initial_delay;

                    if self.state.set_connected(true) {
                        self.sync.notify(self.state.snapshot());
                    }
                    if let Err(err) = self.client.query_state().await {
                        warn!(error = %err, "initial state query failed");
                    }

                    pump_events(&mut self.client, &mut self.state, &self.sync, &mut shutdown)
                        .await;

                    if self.state.set_connected(false) {
                        self.sync.notify(self.state.snapshot());
                    }
                    self.client.close().await;
                }
                Ok(Err(err)) => {
                    warn!(error = %err, "connection failed");
                }
                Err(_) => {
                    warn!(
                        timeout_s = self.config.connect_timeout.as_secs(),
                        "connection attempt timed out"
                    );
                }
            }

            if *shutdown.borrow() {
                break;
            }
            debug!(delay_ms = backoff.as_millis() as u64, "waiting before reconnect");
            tokio::select! {
                _ = shutdown.changed() => break,
                () = tokio::time::sleep(backoff) => {}
            }
            backoff = (backoff * 2).min(self.config.reconnect_max_delay);
        }

        self.sync.shutdown();
        info!(device = %self.config.identifier, "device session stopped");
    }
}

/// Drains receiver events into the state mirror until the connection ends
/// or shutdown is signalled.
async fn pump_events<C, O, S>(
    client: &mut C,
    state: &mut ReceiverState,
    sync: &UpdateSynchronizer<O, S>,
    shutdown: &mut watch::Receiver<bool>,
) where
    C: ApplianceClient,
    O: ConfigurationOracle + 'static,
    S: UpdateSink + 'static,
{
    loop {
        if *shutdown.borrow() {
            return;
        }
        tokio::select! {
            _ = shutdown.changed() => return,
            event = client.next_event() => match event {
                Ok(Some(event)) => {
                    debug!(?event, "state event");
                    if state.apply(event) {
                        sync.notify(state.snapshot());
                    }
                }
                Ok(None) => {
                    warn!("connection closed by receiver");
                    return;
                }
                Err(err) => {
                    warn!(error = %err, "event stream error");
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ScriptedClient;
    use crate::state::{owned_entity_ids, StateEvent};
    use avlink_sync::{MockOracle, MockSink, RetryConfig};
    use std::sync::Arc;
    use std::time::Duration;

    fn test_config() -> DeviceConfig {
        DeviceConfig::new("den", "Den Receiver", "127.0.0.1")
            .with_connect_timeout(Duration::from_secs(1))
            .with_reconnect_delays(Duration::from_secs(1), Duration::from_secs(8))
    }

    #[tokio::test(start_paused = true)]
    async fn session_notifies_on_every_change() {
        let oracle = Arc::new(MockOracle::configured());
        let sink = Arc::new(MockSink::new());
        let sync = UpdateSynchronizer::new(
            RetryConfig::default(),
            Arc::clone(&oracle),
            Arc::clone(&sink),
        );

        let client = ScriptedClient::new()
            .event(StateEvent::Power(true))
            .event(StateEvent::Volume(30))
            .event(StateEvent::Volume(30)); // no change, no notification

        let (session, handle) = DeviceSession::new(test_config(), client, sync.clone());
        let task = tokio::spawn(session.run());

        tokio::time::sleep(Duration::from_millis(100)).await;

        // connect + power + volume; the duplicate volume event is silent.
        assert_eq!(sink.emission_count(), 3);
        let last = &sink.emitted()[2];
        assert_eq!(last.entity_ids(), owned_entity_ids("den"));
        assert!(sync.confirmed());

        handle.shutdown();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn session_reconnects_with_backoff() {
        let oracle = Arc::new(MockOracle::configured());
        let sink = Arc::new(MockSink::new());
        let sync = UpdateSynchronizer::new(
            RetryConfig::default(),
            Arc::clone(&oracle),
            Arc::clone(&sink),
        );

        // Two failed connects, then a working connection.
        let client = ScriptedClient::new()
            .fail_connects(2)
            .event(StateEvent::Power(true));

        let (session, handle) = DeviceSession::new(test_config(), client, sync.clone());
        let task = tokio::spawn(session.run());

        // Failures at t=0 and t=1 (1 s backoff), success at t=3 (2 s backoff).
        tokio::time::sleep(Duration::from_secs(4)).await;
        assert!(sync.confirmed());
        assert!(sink.emission_count() >= 1);

        handle.shutdown();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_marks_connection_sensor() {
        let oracle = Arc::new(MockOracle::configured());
        let sink = Arc::new(MockSink::new());
        let sync = UpdateSynchronizer::new(
            RetryConfig::default(),
            Arc::clone(&oracle),
            Arc::clone(&sink),
        );

        let client = ScriptedClient::new()
            .event(StateEvent::Power(true))
            .close_when_drained();

        let (session, handle) = DeviceSession::new(test_config(), client, sync.clone());
        let task = tokio::spawn(session.run());

        tokio::time::sleep(Duration::from_millis(100)).await;

        // connect, power change, then the disconnect notification.
        let emitted = sink.emitted();
        assert!(emitted.len() >= 3);
        let last = emitted.last().unwrap();
        let connection = last
            .update_for(&avlink_entity::EntityId::with_facet(
                avlink_entity::EntityKind::Sensor,
                "den",
                "connection",
            ))
            .unwrap();
        assert_eq!(
            connection.get("value"),
            Some(&avlink_entity::AttributeValue::Text("disconnected".into()))
        );

        handle.shutdown();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_idle_session() {
        let oracle = Arc::new(MockOracle::new());
        let sink = Arc::new(MockSink::new());
        let sync = UpdateSynchronizer::new(
            RetryConfig::default(),
            Arc::clone(&oracle),
            Arc::clone(&sink),
        );

        // Healthy connection that stays idle after one event.
        let client = ScriptedClient::new().event(StateEvent::Power(true));

        let (session, handle) = DeviceSession::new(test_config(), client, sync.clone());
        let task = tokio::spawn(session.run());

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(sync.retry_active(), "unconfigured notify defers");

        handle.shutdown();
        task.await.unwrap();

        assert!(!sync.retry_active(), "teardown cancels the retry task");
        assert!(!sync.has_pending());
    }
}
