//! Simulate command implementation.
//!
//! Runs the whole driver in-process against a scripted appliance and an
//! in-memory hub registry. The registry is subscribed only after a delay,
//! so the deferred-update path is observable end to end: updates emitted
//! before subscription are parked and delivered by the retry scheduler.

use crate::config::DriverConfig;
use avlink_device::{owned_entity_ids, DeviceSession, InputSource, ScriptedClient, StateEvent};
use avlink_entity::EntityRegistry;
use avlink_sync::{ChannelSink, RegistryOracle, UpdateSynchronizer};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Runs the simulate command.
pub async fn run(path: &Path, subscribe_after: Duration) -> Result<(), Box<dyn std::error::Error>> {
    let config = DriverConfig::load(path)?;
    let retry = config.retry_config();
    let identifier = config.device.identifier.clone();

    // Hub side: announce the entities, subscribe them later.
    let registry = Arc::new(EntityRegistry::new());
    for id in owned_entity_ids(&identifier) {
        registry.add_available(id);
    }
    let oracle = RegistryOracle::new(Arc::clone(&registry), owned_entity_ids(&identifier));
    let (sink, mut updates) = ChannelSink::new();
    let sync = UpdateSynchronizer::new(retry.clone(), oracle, sink);

    // Appliance side: a scripted receiver that powers up and settles.
    let client = ScriptedClient::new()
        .event(StateEvent::ModelIdentified("MA9100HP".into()))
        .event(StateEvent::Power(true))
        .event_after(Duration::from_millis(200), StateEvent::Volume(35))
        .event_after(Duration::from_millis(200), StateEvent::Source(InputSource::Hdmi1));

    let (session, handle) = DeviceSession::new(config.device_config(), client, sync.clone());
    let session_task = tokio::spawn(session.run());

    info!(delay_s = subscribe_after.as_secs(), "hub will subscribe entities after delay");
    let subscribe_registry = Arc::clone(&registry);
    tokio::spawn(async move {
        tokio::time::sleep(subscribe_after).await;
        subscribe_registry.subscribe_all();
        info!("hub subscribed all entities");
    });

    // Print emitted updates until the flow has settled: confirmed and
    // quiet for two retry intervals, or the overall deadline passed.
    let deadline = tokio::time::Instant::now() + subscribe_after + retry.budget_window() + Duration::from_secs(2);
    loop {
        let quiet = retry.interval * 2;
        match tokio::time::timeout(quiet, updates.recv()).await {
            Ok(Some(snapshot)) => {
                println!("{}", serde_json::to_string(&snapshot)?);
            }
            Ok(None) => break,
            Err(_) => {
                if sync.confirmed() || tokio::time::Instant::now() >= deadline {
                    break;
                }
            }
        }
    }

    let stats = sync.stats();
    info!(
        immediate = stats.immediate_emissions,
        deferred = stats.deferred_emissions,
        retry_attempts = stats.retry_attempts,
        "simulation finished"
    );

    handle.shutdown();
    session_task.await?;
    Ok(())
}
