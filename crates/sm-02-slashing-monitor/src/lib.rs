//! # SM-02 Slashing Monitor
//!
//! Guards a set of validators by watching the chain for slashing evidence
//! against them and tripping an external shutdown action.
//!
//! **Subsystem ID:** 02  
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! A validator that has been slashed keeps accruing penalties while it stays
//! online. This subsystem:
//! - Waits for the chain data source to be synced
//! - Subscribes to new-head notifications
//! - Walks every slot between the last checked slot and each new head
//! - Fires the shutdown action at most once on the first match
//!
//! ## Coverage Guarantees
//!
//! | Guarantee | Mechanism |
//! |-----------|-----------|
//! | No slot missed | Gap walker fetches every slot up to the announced head |
//! | Skipped slots tolerated | A missing block advances the watermark |
//! | Transient failures recover | Failing slot is retried on the next head |
//! | At most one shutdown | [`ShutdownTrigger`] gate shared by every caller |
//!
//! ## Module Structure
//!
//! ```text
//! sm-02-slashing-monitor/
//! ├── domain/          # MonitorState, MonitoredIndices, Detection, errors
//! ├── algorithms/      # Index intersection, slashing evaluator, gap walker
//! ├── ports/           # API trait (inbound) + chain data / shutdown (outbound)
//! ├── adapters/        # CommandShutdown
//! ├── application/     # SlashingMonitorService, head consumer, trigger
//! ├── metrics.rs       # Optional Prometheus metrics
//! └── config.rs        # MonitorConfig
//! ```

#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod metrics;
pub mod ports;

// Re-exports
pub use adapters::CommandShutdown;
pub use algorithms::{sorted_intersection, GapWalker, SlashingEvaluator};
pub use application::{ShutdownTrigger, SlashingMonitorService, StopHandle};
pub use config::{MonitorConfig, SYNC_POLL_INTERVAL_SECS};
pub use domain::{
    Detection, MonitorError, MonitorPhase, MonitorSnapshot, MonitorState, MonitoredIndices,
    SlashingKind, SlashingMatch, WalkError, WalkOutcome,
};
pub use ports::{
    ChainDataPort, MockChainData, MockShutdown, ShutdownPort, SlashingMonitorApi,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
