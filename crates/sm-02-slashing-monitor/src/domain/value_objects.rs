//! # Value Objects
//!
//! Immutable values the monitor passes between components.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use shared_types::{Slot, ValidatorIndex};

use super::errors::MonitorError;

/// The fixed set of validator indices to protect.
///
/// Never empty. Immutable after construction, so it can be shared across
/// tasks without locking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoredIndices(BTreeSet<ValidatorIndex>);

impl MonitoredIndices {
    /// Build from explicit indices. Duplicates collapse; an empty list is rejected.
    pub fn new(indices: impl IntoIterator<Item = ValidatorIndex>) -> Result<Self, MonitorError> {
        let set: BTreeSet<_> = indices.into_iter().collect();
        if set.is_empty() {
            return Err(MonitorError::InvalidIndexList(
                "at least one validator index is required".to_string(),
            ));
        }
        Ok(Self(set))
    }

    /// Parse a comma-separated list such as `"791764, 16,32"`.
    pub fn parse(list: &str) -> Result<Self, MonitorError> {
        let indices = list
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                entry.parse::<ValidatorIndex>().map_err(|_| {
                    MonitorError::InvalidIndexList(format!("{:?} is not a validator index", entry))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(indices)
    }

    pub fn contains(&self, index: ValidatorIndex) -> bool {
        self.0.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = ValidatorIndex> + '_ {
        self.0.iter().copied()
    }
}

impl fmt::Display for MonitoredIndices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let list: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&list.join(","))
    }
}

/// Which slashing category implicated a monitored validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlashingKind {
    /// Two conflicting signed block headers.
    Proposer,
    /// Two conflicting attestations sharing the validator.
    Attester,
}

impl SlashingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Proposer => "proposer",
            Self::Attester => "attester",
        }
    }
}

impl fmt::Display for SlashingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A monitored validator found in a block's slashing evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlashingMatch {
    pub validator_index: ValidatorIndex,
    pub kind: SlashingKind,
}

/// A monitored validator found at a specific slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    pub slot: Slot,
    pub validator_index: ValidatorIndex,
    pub kind: SlashingKind,
}

impl Detection {
    pub fn new(slot: Slot, found: SlashingMatch) -> Self {
        Self {
            slot,
            validator_index: found.validator_index,
            kind: found.kind,
        }
    }
}

/// Result of a completed gap walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkOutcome {
    /// Last slot fully checked.
    pub watermark: Slot,
    /// Set when the walk stopped on a matching block.
    pub detection: Option<Detection>,
}

impl WalkOutcome {
    pub fn matched(&self) -> bool {
        self.detection.is_some()
    }
}
