//! # Error Types
//!
//! Errors raised while interpreting wire values.

use thiserror::Error;

/// Errors that can occur when parsing textual wire values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    /// Slot number is not a decimal u64.
    #[error("Invalid slot: {0:?}")]
    InvalidSlot(String),

    /// Validator index is not a decimal u64.
    #[error("Invalid validator index: {0:?}")]
    InvalidValidatorIndex(String),

    /// Hex string could not be decoded.
    #[error("Invalid hex data: {0}")]
    InvalidHex(String),
}
