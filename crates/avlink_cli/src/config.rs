//! Driver configuration file handling.

use avlink_device::DeviceConfig;
use avlink_sync::RetryConfig;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors while loading a driver configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid JSON for the expected schema.
    #[error("cannot parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    /// The file parsed but contains invalid values.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// The `device` section of the config file.
#[derive(Debug, Deserialize)]
pub struct DeviceSection {
    /// Stable device identifier used in entity ids.
    pub identifier: String,
    /// Human-readable device name.
    pub name: String,
    /// Receiver host name or address.
    pub host: String,
    /// Receiver control port.
    #[serde(default = "defaults::port")]
    pub port: u16,
    /// Bound on one connection attempt, in seconds.
    #[serde(default = "defaults::connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

/// The `sync` section of the config file.
#[derive(Debug, Deserialize)]
pub struct SyncSection {
    /// Seconds between deferred-update retry attempts.
    #[serde(default = "defaults::retry_interval_secs")]
    pub retry_interval_secs: u64,
    /// Attempts per retry cycle.
    #[serde(default = "defaults::max_attempts")]
    pub max_attempts: u32,
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            retry_interval_secs: defaults::retry_interval_secs(),
            max_attempts: defaults::max_attempts(),
        }
    }
}

mod defaults {
    pub(super) fn port() -> u16 {
        50000
    }
    pub(super) fn connect_timeout_secs() -> u64 {
        10
    }
    pub(super) fn retry_interval_secs() -> u64 {
        3
    }
    pub(super) fn max_attempts() -> u32 {
        10
    }
}

/// A parsed and validated driver configuration file.
#[derive(Debug, Deserialize)]
pub struct DriverConfig {
    /// Device connection settings.
    pub device: DeviceSection,
    /// Deferred-update retry settings.
    #[serde(default)]
    pub sync: SyncSection,
}

impl DriverConfig {
    /// Loads and validates a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: DriverConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.device.identifier.trim().is_empty() {
            return Err(ConfigError::Invalid("device.identifier is empty".into()));
        }
        if self.device.identifier.contains('.') {
            return Err(ConfigError::Invalid(
                "device.identifier must not contain '.'".into(),
            ));
        }
        if self.device.host.trim().is_empty() {
            return Err(ConfigError::Invalid("device.host is empty".into()));
        }
        if self.sync.max_attempts == 0 {
            return Err(ConfigError::Invalid("sync.max_attempts must be > 0".into()));
        }
        if self.sync.retry_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "sync.retry_interval_secs must be > 0".into(),
            ));
        }
        Ok(())
    }

    /// Builds the device session configuration.
    pub fn device_config(&self) -> DeviceConfig {
        DeviceConfig::new(
            self.device.identifier.clone(),
            self.device.name.clone(),
            self.device.host.clone(),
        )
        .with_port(self.device.port)
        .with_connect_timeout(Duration::from_secs(self.device.connect_timeout_secs))
    }

    /// Builds the retry configuration for the sync core.
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::new(self.sync.max_attempts)
            .with_interval(Duration::from_secs(self.sync.retry_interval_secs))
    }
}
