//! # Slashing Mitigator
//!
//! The main entry point for the slashing mitigator.
//!
//! ## Startup Sequence
//!
//! 1. Parse the command line and apply environment overrides
//! 2. Install the log subscriber
//! 3. Build the shutdown action and the beacon chain data adapter
//! 4. Either run the shutdown action once (`--dry-run`) or start monitoring
//! 5. Wait until the monitor stops or trips the shutdown action
//!
//! ## Exit Codes
//!
//! - `0`: stopped by signal, or a slashing was detected and the shutdown
//!   action succeeded
//! - non-zero: startup failed, or a slashing was detected and the validator
//!   could not be stopped

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use mitigator_runtime::{init_logging, Args, BeaconChainData, RuntimeConfig};
use sm_02_slashing_monitor::{
    CommandShutdown, MonitorError, MonitorSnapshot, SlashingMonitorApi, SlashingMonitorService,
    StopHandle,
};

type Monitor = SlashingMonitorService<BeaconChainData, CommandShutdown>;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let config = RuntimeConfig::from_args(&args)
        .context("Invalid configuration")?
        .with_env_overrides();

    init_logging(&config.logging).context("Failed to initialize logging")?;

    info!("===========================================");
    info!("  Slashing Mitigator v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");
    info!(
        beacon_node = %config.beacon.base_url,
        validators = %config.monitor.monitored,
        wait_for_sync = config.wait_for_sync,
        "Loaded configuration"
    );

    let shutdown = config
        .shutdown_cmd
        .as_deref()
        .map(CommandShutdown::new)
        .transpose()
        .context("Invalid shutdown command")?
        .map(Arc::new);

    let chain = BeaconChainData::from_config(config.beacon.clone())
        .context("Failed to create beacon client")?;
    let mut monitor: Monitor =
        SlashingMonitorService::new(config.monitor.clone(), Arc::new(chain), shutdown);

    if config.dry_run {
        let output = monitor
            .execute_shutdown()
            .await
            .context("Dry run shutdown failed")?;
        info!(output = %String::from_utf8_lossy(&output).trim(), "Dry run shutdown executed");
        return Ok(ExitCode::SUCCESS);
    }

    let signals = tokio::spawn(stop_on_signal(monitor.stop_handle()));

    match monitor.start(config.wait_for_sync).await {
        Ok(()) => info!("Slashing mitigator running. Press Ctrl+C to stop."),
        Err(MonitorError::Cancelled) => {
            info!("Stopped before monitoring started");
            signals.abort();
            return Ok(ExitCode::SUCCESS);
        }
        Err(e) => {
            signals.abort();
            return Err(e).context("Failed to start slashing monitor");
        }
    }

    let outcome = wait_until_finished(&monitor).await;
    monitor.stop().await;
    signals.abort();

    Ok(exit_code(&outcome))
}

/// Block until the monitor reaches a terminal phase.
async fn wait_until_finished(monitor: &Monitor) -> MonitorSnapshot {
    let mut updates = monitor.subscribe_snapshot();
    let finished = updates
        .wait_for(|snapshot| snapshot.phase.is_terminal())
        .await
        .map(|snapshot| *snapshot);
    finished.unwrap_or_else(|_| monitor.snapshot())
}

fn exit_code(outcome: &MonitorSnapshot) -> ExitCode {
    match outcome.detection {
        Some(detection) if !outcome.shutdown_executed => {
            error!(
                slot = detection.slot,
                validator_index = detection.validator_index,
                "Slashing detected but the validator was not stopped"
            );
            ExitCode::FAILURE
        }
        Some(_) => {
            info!("Validator stopped after slashing detection");
            ExitCode::SUCCESS
        }
        None => {
            info!("Exiting...");
            ExitCode::SUCCESS
        }
    }
}

/// Raise the stop flag on SIGINT or SIGTERM.
async fn stop_on_signal(stop: StopHandle) {
    match wait_for_signal().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!(error = %e, "Failed to listen for shutdown signals");
            return;
        }
    }
    stop.stop();
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        _ = terminate.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
