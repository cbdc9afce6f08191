//! Configuration for the retry scheduler.

use std::time::Duration;

/// Configuration for deferred-update retry behavior.
///
/// The cadence is deliberately fixed rather than backing off: the event
/// that unblocks delivery is a person finishing the subscription flow on
/// the hub, which normally happens within seconds. The attempt budget
/// bounds the total retry window to `interval * max_attempts`; after that
/// the pending update stays parked until the next state change restarts a
/// cycle with a fresh budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Time between retry attempts.
    pub interval: Duration,
    /// Maximum number of attempts per retry cycle.
    pub max_attempts: u32,
}

impl RetryConfig {
    /// Creates a retry configuration with the given attempt budget.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            interval: Duration::from_secs(3),
            max_attempts,
        }
    }

    /// Sets the retry interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Returns the total window covered by one retry cycle.
    pub fn budget_window(&self) -> Duration {
        self.interval * self.max_attempts
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new(10)
    }
}
