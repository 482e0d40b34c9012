//! # Beacon Client Configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default beacon node REST endpoint.
pub const DEFAULT_BEACON_NODE: &str = "http://localhost:5052";

/// Beacon client configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BeaconClientConfig {
    /// Beacon node base URL (e.g., "http://localhost:5052").
    pub base_url: String,

    /// Timeout for a single REST request in seconds. Does not apply to the
    /// long-lived event stream.
    pub request_timeout_secs: u64,

    /// TCP connect timeout in seconds.
    pub connect_timeout_secs: u64,

    /// First delay before re-opening a dropped event stream, in milliseconds.
    pub reconnect_base_delay_ms: u64,

    /// Upper bound for the reconnect delay, in milliseconds.
    pub reconnect_max_delay_ms: u64,

    /// Capacity of the decoded event channel.
    pub event_buffer: usize,
}

impl Default for BeaconClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BEACON_NODE.to_string(),
            request_timeout_secs: 12,
            connect_timeout_secs: 5,
            reconnect_base_delay_ms: 5_000,
            reconnect_max_delay_ms: 60_000,
            event_buffer: 64,
        }
    }
}

impl BeaconClientConfig {
    /// Default configuration pointing at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Create a config for testing (short delays).
    pub fn for_testing(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout_secs: 2,
            connect_timeout_secs: 1,
            reconnect_base_delay_ms: 10,
            reconnect_max_delay_ms: 50,
            event_buffer: 8,
        }
    }

    /// Per-request timeout for REST calls.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// TCP connect timeout.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Reconnect delay after `attempts` consecutive failures.
    pub fn reconnect_delay(&self, attempts: u32) -> Duration {
        let delay = self
            .reconnect_base_delay_ms
            .saturating_mul(1 << attempts.min(6));
        Duration::from_millis(delay.min(self.reconnect_max_delay_ms))
    }
}
