//! # Domain Errors
//!
//! Error types for the Slashing Monitor.

use thiserror::Error;

use shared_types::Slot;

/// Slashing monitor error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MonitorError {
    /// The chain data source is unreachable or answered garbage.
    #[error("Error connecting to beacon node: {0}")]
    Connectivity(String),

    /// The chain data source is still syncing.
    #[error("Beacon node is not synced, sync distance: {sync_distance}")]
    NotSynced {
        /// Slots behind the wall clock
        sync_distance: u64,
    },

    /// A subscription topic other than `head` was requested.
    #[error("Unsupported event topic: {0:?}")]
    UnsupportedTopic(String),

    /// The monitored validator index list is unusable.
    #[error("Invalid validator index list: {0}")]
    InvalidIndexList(String),

    /// The shutdown command is empty.
    #[error("Shutdown command is empty, cannot execute shutdown")]
    EmptyShutdownCommand,

    /// No shutdown action has been configured.
    #[error("No shutdown action configured")]
    NoShutdownAction,

    /// The shutdown action ran and failed.
    #[error("Error executing shutdown command: {0}")]
    ShutdownFailed(String),

    /// The shutdown action has already been fired once.
    #[error("Shutdown already triggered")]
    AlreadyTriggered,

    /// `start` was called on a running monitor.
    #[error("Monitor already started")]
    AlreadyStarted,

    /// The operation was aborted by a stop request.
    #[error("Monitor stopped")]
    Cancelled,
}

impl MonitorError {
    /// Whether the error is a configuration problem, raised before any network activity.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedTopic(_)
                | Self::InvalidIndexList(_)
                | Self::EmptyShutdownCommand
                | Self::NoShutdownAction
        )
    }
}

/// A gap walk that stopped before reaching its target slot.
///
/// `watermark` is the last slot that was fully processed; the failing slot
/// is retried by the next walk starting from it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Walk aborted at slot {failed_slot} (watermark {watermark}): {source}")]
pub struct WalkError {
    /// Last fully processed slot.
    pub watermark: Slot,
    /// Slot whose fetch failed.
    pub failed_slot: Slot,
    /// Underlying failure.
    #[source]
    pub source: MonitorError,
}

impl WalkError {
    /// Whether the walk was aborted by a stop request.
    pub fn is_cancelled(&self) -> bool {
        self.source == MonitorError::Cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_synced_error() {
        let err = MonitorError::NotSynced { sync_distance: 42 };
        assert!(err.to_string().contains("42"));
    }

    #[test]
    fn test_config_errors() {
        assert!(MonitorError::EmptyShutdownCommand.is_config());
        assert!(MonitorError::UnsupportedTopic("block".into()).is_config());
        assert!(!MonitorError::Connectivity("refused".into()).is_config());
        assert!(!MonitorError::Cancelled.is_config());
    }

    #[test]
    fn test_walk_error_message() {
        let err = WalkError {
            watermark: 99,
            failed_slot: 100,
            source: MonitorError::Connectivity("timeout".into()),
        };
        let msg = err.to_string();
        assert!(msg.contains("100"));
        assert!(msg.contains("99"));
        assert!(!err.is_cancelled());
    }
}
