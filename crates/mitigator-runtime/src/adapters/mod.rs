//! # Adapters
//!
//! Port implementations binding the monitor core to concrete clients.

pub mod beacon;

pub use beacon::{map_client_error, BeaconChainData};
