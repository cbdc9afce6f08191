//! End-to-end session tests: scripted appliance, hub-side registry,
//! channel sink — the full fresh-setup race driven through `DeviceSession`.

use avlink_device::{
    owned_entity_ids, DeviceConfig, DeviceSession, ScriptedClient, StateEvent,
};
use avlink_entity::{AttributeValue, EntityId, EntityKind, EntityRegistry};
use avlink_sync::{ChannelSink, RegistryOracle, RetryConfig, UpdateSynchronizer};
use std::sync::Arc;
use std::time::Duration;

fn test_config() -> DeviceConfig {
    DeviceConfig::new("den", "Den Receiver", "127.0.0.1")
        .with_connect_timeout(Duration::from_secs(1))
        .with_reconnect_delays(Duration::from_secs(1), Duration::from_secs(8))
}

fn announced_registry() -> Arc<EntityRegistry> {
    let registry = Arc::new(EntityRegistry::new());
    for id in owned_entity_ids("den") {
        registry.add_available(id);
    }
    registry
}

#[tokio::test(start_paused = true)]
async fn fresh_setup_race_end_to_end() {
    // The device connects and produces state immediately; the hub's
    // subscription only lands at t=3.5. No update may be lost.
    let registry = announced_registry();
    let oracle = RegistryOracle::new(Arc::clone(&registry), owned_entity_ids("den"));
    let (sink, mut rx) = ChannelSink::new();
    let sync = UpdateSynchronizer::new(RetryConfig::default(), oracle, sink);

    let client = ScriptedClient::new()
        .event(StateEvent::Power(true))
        .event(StateEvent::Volume(25));

    let (session, handle) = DeviceSession::new(test_config(), client, sync.clone());
    let task = tokio::spawn(session.run());

    // Everything the session produced before subscription is deferred.
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(rx.try_recv().is_err());
    assert!(!sync.confirmed());
    assert!(sync.retry_active());

    tokio::time::sleep(Duration::from_secs(3)).await; // t = 3.5
    registry.subscribe_all();

    let delivered = rx.recv().await.expect("deferred update must arrive");
    assert!(sync.confirmed());

    // Coalescing: the delivered bundle carries the latest state, with the
    // volume change already folded in.
    let player = delivered
        .update_for(&EntityId::new(EntityKind::MediaPlayer, "den"))
        .unwrap();
    assert_eq!(player.get("state"), Some(&AttributeValue::Text("ON".into())));
    assert_eq!(player.get("volume"), Some(&AttributeValue::Integer(25)));

    // Once confirmed, further changes flow straight through.
    handle.shutdown();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn post_reboot_path_emits_immediately() {
    // Entities were configured in an earlier run; every notification is
    // synchronous and no retry cycle ever starts.
    let registry = announced_registry();
    registry.subscribe_all();
    let oracle = RegistryOracle::new(Arc::clone(&registry), owned_entity_ids("den"));
    let (sink, mut rx) = ChannelSink::new();
    let sync = UpdateSynchronizer::new(RetryConfig::default(), oracle, sink);

    let client = ScriptedClient::new()
        .event(StateEvent::Power(true))
        .event(StateEvent::Volume(40));

    let (session, handle) = DeviceSession::new(test_config(), client, sync.clone());
    let task = tokio::spawn(session.run());

    // connect + two state changes, all emitted in order.
    let first = rx.recv().await.unwrap();
    let connection = first
        .update_for(&EntityId::with_facet(EntityKind::Sensor, "den", "connection"))
        .unwrap();
    assert_eq!(
        connection.get("value"),
        Some(&AttributeValue::Text("connected".into()))
    );

    let second = rx.recv().await.unwrap();
    let third = rx.recv().await.unwrap();
    let player = third
        .update_for(&EntityId::new(EntityKind::MediaPlayer, "den"))
        .unwrap();
    assert_eq!(player.get("volume"), Some(&AttributeValue::Integer(40)));
    assert_ne!(second, third);

    assert!(sync.confirmed());
    assert!(!sync.retry_active());
    assert_eq!(sync.stats().retry_cycles, 0);

    handle.shutdown();
    task.await.unwrap();
}
