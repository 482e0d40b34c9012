//! # Slashing-Mitigator Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── fixtures/blocks/   # Beacon API block responses around a real slashing
//! └── src/
//!     ├── fixtures/      # Fixture loading + in-process beacon node
//!     └── integration/   # Cross-crate scenarios
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p sm-tests
//!
//! # By category
//! cargo test -p sm-tests integration::
//! ```

pub mod fixtures;
pub mod integration;
