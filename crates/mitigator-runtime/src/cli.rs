//! Command line arguments.

use clap::Parser;

use sm_01_beacon_client::config::DEFAULT_BEACON_NODE;

/// Slashing Mitigator: stops validators that are being slashed
#[derive(Parser, Debug, Clone)]
#[command(name = "slashing-mitigator")]
#[command(version, about = "Watches a beacon node for slashings of monitored validators and runs a shutdown command")]
pub struct Args {
    /// Beacon node REST API URL
    #[arg(long, default_value = DEFAULT_BEACON_NODE)]
    pub beacon_node: String,

    /// Wait for the beacon node to finish syncing instead of failing
    #[arg(long)]
    pub wait_for_sync: bool,

    /// Command to run when a monitored validator is slashed
    #[arg(long)]
    pub shutdown_cmd: Option<String>,

    /// Comma-separated validator indices to monitor
    #[arg(long, required = true)]
    pub validator_indices: String,

    /// Run the shutdown command once and exit
    #[arg(long)]
    pub dry_run: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,
}
