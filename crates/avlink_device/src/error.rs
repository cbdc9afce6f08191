//! Error types for device sessions.

use thiserror::Error;

/// Result type for device operations.
pub type DeviceResult<T> = Result<T, DeviceError>;

/// Errors that can occur while talking to the appliance.
#[derive(Error, Debug)]
pub enum DeviceError {
    /// Could not establish the connection.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The connection attempt did not complete in time.
    #[error("connection timed out after {seconds} s")]
    ConnectTimeout {
        /// Configured timeout in seconds.
        seconds: u64,
    },

    /// The connection dropped mid-session.
    #[error("connection lost: {0}")]
    ConnectionLost(String),

    /// The client is not connected.
    #[error("not connected to the appliance")]
    NotConnected,
}

impl DeviceError {
    /// Creates a connection-failed error.
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::ConnectionFailed(message.into())
    }

    /// Creates a connection-lost error.
    pub fn connection_lost(message: impl Into<String>) -> Self {
        Self::ConnectionLost(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DeviceError::connection_failed("refused");
        assert_eq!(err.to_string(), "connection failed: refused");

        let err = DeviceError::ConnectTimeout { seconds: 10 };
        assert_eq!(err.to_string(), "connection timed out after 10 s");
    }
}
