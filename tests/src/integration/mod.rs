//! # Integration Tests
//!
//! - `e2e_slashing`: reference scenario against recorded mainnet blocks
//! - `beacon_e2e`: full stack over HTTP against an in-process beacon node

pub mod beacon_e2e;
pub mod e2e_slashing;
