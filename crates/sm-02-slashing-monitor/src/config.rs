//! # Monitor Configuration
//!
//! Configuration for the Slashing Monitor service.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::MonitoredIndices;

/// Interval between sync status polls while waiting for the node, in seconds.
pub const SYNC_POLL_INTERVAL_SECS: u64 = 30;

/// Slashing monitor configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Validator indices to protect.
    pub monitored: MonitoredIndices,

    /// Sync status poll interval in milliseconds.
    pub sync_poll_interval_ms: u64,
}

impl MonitorConfig {
    /// Production defaults for the given index set.
    pub fn new(monitored: MonitoredIndices) -> Self {
        Self {
            monitored,
            sync_poll_interval_ms: SYNC_POLL_INTERVAL_SECS * 1_000,
        }
    }

    /// Create a config for testing (short poll interval).
    pub fn for_testing(monitored: MonitoredIndices) -> Self {
        Self {
            monitored,
            sync_poll_interval_ms: 10,
        }
    }

    pub fn sync_poll_interval(&self) -> Duration {
        Duration::from_millis(self.sync_poll_interval_ms)
    }
}
