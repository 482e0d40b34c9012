//! # Shared Types Crate
//!
//! Beacon-chain wire model used by every subsystem of the slashing mitigator.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: block, slashing and event types are defined here
//!   once and consumed by both the beacon client (sm-01) and the monitor (sm-02).
//! - **Lenient Indices**: validator indices inside slashing records are kept as
//!   the decimal strings delivered by the beacon API. A malformed index must not
//!   make a whole block undecodable; consumers parse them one at a time.
//! - **Closed Event Set**: the head-event stream is a closed enum. Only the
//!   `head` topic is ever decoded, everything else is surfaced as a variant the
//!   consumer can drop.

pub mod encoding;
pub mod entities;
pub mod errors;
pub mod events;

pub use encoding::HexBytes;
pub use entities::*;
pub use errors::*;
pub use events::*;
