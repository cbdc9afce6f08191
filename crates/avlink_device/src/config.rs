//! Device session configuration.

use std::time::Duration;

/// Configuration for one receiver session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Stable device identifier, used in every entity id.
    pub identifier: String,
    /// Human-readable device name.
    pub name: String,
    /// Receiver host name or address.
    pub host: String,
    /// Receiver control port.
    pub port: u16,
    /// Bound on one connection attempt.
    pub connect_timeout: Duration,
    /// Delay before the first reconnect attempt.
    pub reconnect_initial_delay: Duration,
    /// Cap on the reconnect backoff.
    pub reconnect_max_delay: Duration,
}

impl DeviceConfig {
    /// Creates a configuration with the receiver's default control port.
    pub fn new(
        identifier: impl Into<String>,
        name: impl Into<String>,
        host: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            name: name.into(),
            host: host.into(),
            port: 50000,
            connect_timeout: Duration::from_secs(10),
            reconnect_initial_delay: Duration::from_secs(5),
            reconnect_max_delay: Duration::from_secs(300),
        }
    }

    /// Sets the control port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the connection attempt timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the reconnect backoff bounds.
    pub fn with_reconnect_delays(mut self, initial: Duration, max: Duration) -> Self {
        self.reconnect_initial_delay = initial;
        self.reconnect_max_delay = max;
        self
    }

    /// Returns a `host:port` label for logging.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
