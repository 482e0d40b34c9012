//! # Mitigator Runtime Library
//!
//! This library exposes the internal modules of the mitigator runtime for
//! testing. The main entry point is the `slashing-mitigator` binary.
//!
//! ## Architectural Patterns
//!
//! - **Hexagonal Architecture**: the monitor core defines ports, this crate
//!   supplies the adapters that bind them to the beacon client
//! - **Configuration Layers**: command line first, then environment overrides

#![warn(clippy::all)]

pub mod adapters;
pub mod cli;
pub mod config;
pub mod logging;

pub use adapters::BeaconChainData;
pub use cli::Args;
pub use config::{ConfigError, RuntimeConfig};
pub use logging::{init_logging, LoggingConfig};
