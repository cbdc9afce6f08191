//! Integration tests for the deferred-update synchronization core.
//!
//! These wire the real collaborators together: a hub-side entity registry
//! behind the oracle adapter, and channel or recording sinks on the
//! emission side. Time is paused, so retry cadence is exact.

use avlink_entity::{EntityId, EntityKind, EntityRegistry, EntityUpdate, StateSnapshot};
use avlink_sync::{ChannelSink, MockSink, RegistryOracle, RetryConfig, UpdateSynchronizer};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

fn owned_entities() -> Vec<EntityId> {
    vec![
        EntityId::new(EntityKind::MediaPlayer, "den"),
        EntityId::with_facet(EntityKind::Sensor, "den", "volume"),
        EntityId::new(EntityKind::Remote, "den"),
    ]
}

fn registry_with_available() -> Arc<EntityRegistry> {
    let registry = Arc::new(EntityRegistry::new());
    for id in owned_entities() {
        registry.add_available(id);
    }
    registry
}

fn power_snapshot(power: &str) -> StateSnapshot {
    StateSnapshot::new(vec![EntityUpdate::new(EntityId::new(
        EntityKind::MediaPlayer,
        "den",
    ))
    .with("state", power)])
}

#[tokio::test(start_paused = true)]
async fn fresh_setup_race_delivers_after_subscription() {
    // Scenario: device connects and notifies before the hub subscribes.
    // Subscription lands at t=3.5; with a 3 s cadence the update must go
    // out on the retry attempt at t=6.
    let registry = registry_with_available();
    let oracle = RegistryOracle::new(Arc::clone(&registry), owned_entities());
    let (sink, mut rx) = ChannelSink::new();
    let sync = UpdateSynchronizer::new(RetryConfig::default(), oracle, sink);

    let start = Instant::now();
    sync.notify(power_snapshot("ON"));
    assert!(!sync.confirmed());
    assert!(rx.try_recv().is_err(), "no emission before configuration");

    tokio::time::sleep(Duration::from_millis(3500)).await;
    registry.subscribe_all();

    let delivered = rx.recv().await.expect("deferred update must arrive");
    let elapsed = start.elapsed();

    assert_eq!(delivered, power_snapshot("ON"));
    assert!(
        elapsed >= Duration::from_secs(6) && elapsed < Duration::from_millis(6500),
        "expected delivery on the t=6 attempt, got {elapsed:?}"
    );
    assert!(sync.confirmed());
    assert!(!sync.retry_active());
}

#[tokio::test(start_paused = true)]
async fn late_subscription_still_wins_within_budget() {
    // Subscription arrives late in the budget window; delivery must still
    // happen before the cycle runs out of attempts.
    let registry = registry_with_available();
    let oracle = RegistryOracle::new(Arc::clone(&registry), owned_entities());
    let sink = Arc::new(MockSink::new());
    let sync = UpdateSynchronizer::new(RetryConfig::default(), oracle, Arc::clone(&sink));

    sync.notify(power_snapshot("ON"));
    tokio::time::sleep(Duration::from_secs(25)).await;
    assert_eq!(sink.emission_count(), 0);

    registry.subscribe_all();
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert_eq!(sink.emitted(), vec![power_snapshot("ON")]);
    assert!(sync.confirmed());
}

#[tokio::test(start_paused = true)]
async fn budget_exhaustion_then_recovery_on_next_notify() {
    let registry = registry_with_available();
    let oracle = RegistryOracle::new(Arc::clone(&registry), owned_entities());
    let sink = Arc::new(MockSink::new());
    let sync = UpdateSynchronizer::new(RetryConfig::default(), oracle, Arc::clone(&sink));

    sync.notify(power_snapshot("ON"));

    // Past the whole 30 s budget with nothing subscribed: the cycle gives
    // up silently and the snapshot stays parked.
    tokio::time::sleep(Duration::from_secs(35)).await;
    assert_eq!(sink.emission_count(), 0);
    assert!(!sync.confirmed());
    assert!(!sync.retry_active());
    assert!(sync.has_pending());
    assert_eq!(sync.stats().exhausted_cycles, 1);

    // The next natural state change after subscription succeeds at once.
    registry.subscribe_all();
    sync.notify(power_snapshot("OFF"));

    assert_eq!(sink.emitted(), vec![power_snapshot("OFF")]);
    assert!(sync.confirmed());
    assert!(!sync.has_pending());
}

#[tokio::test(start_paused = true)]
async fn already_configured_path_never_starts_retry() {
    // Post-reboot normal path: entities were configured in an earlier run.
    let registry = registry_with_available();
    registry.subscribe_all();
    let oracle = RegistryOracle::new(Arc::clone(&registry), owned_entities());
    let (sink, mut rx) = ChannelSink::new();
    let sync = UpdateSynchronizer::new(RetryConfig::default(), oracle, sink);

    sync.notify(power_snapshot("ON"));

    assert_eq!(rx.recv().await.unwrap(), power_snapshot("ON"));
    assert!(sync.confirmed());
    assert!(!sync.retry_active());
    assert_eq!(sync.stats().retry_cycles, 0);
}

#[tokio::test(start_paused = true)]
async fn partial_subscription_keeps_deferring() {
    // A partially subscribed entity set is still "not configured": the
    // hub would drop updates for the unsubscribed rest.
    let registry = registry_with_available();
    let oracle = RegistryOracle::new(Arc::clone(&registry), owned_entities());
    let sink = Arc::new(MockSink::new());
    let sync = UpdateSynchronizer::new(RetryConfig::default(), oracle, Arc::clone(&sink));

    sync.notify(power_snapshot("ON"));
    registry.subscribe(EntityId::new(EntityKind::MediaPlayer, "den"));

    tokio::time::sleep(Duration::from_secs(7)).await;
    assert_eq!(sink.emission_count(), 0);
    assert!(sync.retry_active());

    registry.subscribe_all();
    tokio::time::sleep(Duration::from_secs(4)).await;
    assert_eq!(sink.emission_count(), 1);
    assert!(sync.confirmed());
}
