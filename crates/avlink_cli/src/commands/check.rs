//! Check command implementation.

use crate::config::DriverConfig;
use avlink_device::owned_entity_ids;
use std::path::Path;

/// Runs the check command.
pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = DriverConfig::load(path)?;
    let device = config.device_config();
    let retry = config.retry_config();

    println!("Configuration OK: {:?}", path);
    println!();
    println!("Device:    {} ({})", config.device.name, device.address());
    println!(
        "Retry:     every {} s, {} attempts ({} s window)",
        retry.interval.as_secs(),
        retry.max_attempts,
        retry.budget_window().as_secs()
    );
    println!("Entities:");
    for id in owned_entity_ids(&config.device.identifier) {
        println!("  {id}");
    }

    Ok(())
}
