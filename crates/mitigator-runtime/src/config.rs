//! # Runtime Configuration
//!
//! Unified configuration for the beacon client, the monitor and logging.
//!
//! Values come from the command line first; environment variables then
//! override individual settings:
//!
//! - `SM_SYNC_POLL_SECS`: sync status poll interval while waiting (default: 30)
//! - `SM_REQUEST_TIMEOUT_SECS`: beacon REST request timeout (default: 12)
//! - `SM_JSON_LOGS`: emit JSON logs (`1`/`true`)
//! - `SM_LOG_LEVEL` or `RUST_LOG`: log filter (default: info)

use thiserror::Error;
use tracing::warn;

use sm_01_beacon_client::{parse_base_url, BeaconClientConfig};
use sm_02_slashing_monitor::{MonitorConfig, MonitorError, MonitoredIndices};

use crate::cli::Args;
use crate::logging::LoggingConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The beacon node address is not an http(s) URL.
    #[error("{0}")]
    InvalidBeaconNode(String),

    /// The validator index list could not be used.
    #[error(transparent)]
    Indices(#[from] MonitorError),
}

/// Complete runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Beacon client configuration.
    pub beacon: BeaconClientConfig,
    /// Monitor configuration.
    pub monitor: MonitorConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
    /// Shutdown command line, if any.
    pub shutdown_cmd: Option<String>,
    /// Poll until the node is synced instead of failing.
    pub wait_for_sync: bool,
    /// Run the shutdown command once and exit.
    pub dry_run: bool,
}

impl RuntimeConfig {
    /// Build from parsed arguments. Performs no network activity.
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        validate_beacon_node(&args.beacon_node)?;
        let monitored = MonitoredIndices::parse(&args.validator_indices)?;

        Ok(Self {
            beacon: BeaconClientConfig::new(args.beacon_node.trim()),
            monitor: MonitorConfig::new(monitored),
            logging: LoggingConfig {
                level: if args.debug { "debug" } else { "info" }.to_string(),
                json: args.json_logs,
                forced_debug: args.debug,
            },
            shutdown_cmd: args.shutdown_cmd.clone(),
            wait_for_sync: args.wait_for_sync,
            dry_run: args.dry_run,
        })
    }

    /// Apply environment overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(value) = lookup("SM_SYNC_POLL_SECS") {
            match value.parse::<u64>() {
                Ok(secs) if secs > 0 => self.monitor.sync_poll_interval_ms = secs * 1_000,
                _ => warn!(value = %value, "Ignoring invalid SM_SYNC_POLL_SECS"),
            }
        }

        if let Some(value) = lookup("SM_REQUEST_TIMEOUT_SECS") {
            match value.parse::<u64>() {
                Ok(secs) if secs > 0 => self.beacon.request_timeout_secs = secs,
                _ => warn!(value = %value, "Ignoring invalid SM_REQUEST_TIMEOUT_SECS"),
            }
        }

        if let Some(value) = lookup("SM_JSON_LOGS") {
            self.logging.json = value.eq_ignore_ascii_case("true") || value == "1";
        }

        if !self.logging.forced_debug {
            if let Some(level) = lookup("SM_LOG_LEVEL").or_else(|| lookup("RUST_LOG")) {
                self.logging.level = level;
            }
        }

        self
    }
}

fn validate_beacon_node(address: &str) -> Result<(), ConfigError> {
    parse_base_url(address.trim())
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidBeaconNode(e.to_string()))
}
