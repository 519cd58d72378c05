//! Timing parameters for the executor.
//!
//! Production callers never need to touch these; `ExecutorConfig::default()`
//! carries the fixed values. Tests shorten them to keep the suite fast.

use std::time::Duration;

/// Maximum time to establish a connection.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum time to wait for the response head and for the body.
pub const READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Pause applied after a throttled request before the next one starts.
pub const THROTTLE_INTERVAL: Duration = Duration::from_secs(1);

/// Largest response or error body read into memory, in bytes.
pub const MAX_RESPONSE_BODY: u64 = 64 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub connect: Duration,
    pub read: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: CONNECT_TIMEOUT,
            read: READ_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Used to build the default transport; ignored when a transport is supplied.
    pub timeouts: Timeouts,
    /// Body size cap for the default transport.
    pub max_response_body: u64,
    pub throttle_interval: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            timeouts: Timeouts::default(),
            max_response_body: MAX_RESPONSE_BODY,
            throttle_interval: THROTTLE_INTERVAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_the_fixed_intervals() {
        let config = ExecutorConfig::default();
        assert_eq!(config.timeouts.connect, Duration::from_secs(10));
        assert_eq!(config.timeouts.read, Duration::from_secs(10));
        assert_eq!(config.throttle_interval, Duration::from_secs(1));
        assert_eq!(config.max_response_body, 64 * 1024 * 1024);
    }
}
