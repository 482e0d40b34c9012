//! # Beacon Chain Entities
//!
//! Wire types for the parts of the beacon node REST API the mitigator reads.
//!
//! ## Clusters
//!
//! - **Node**: `SyncStatus` from `/eth/v1/node/syncing`
//! - **Blocks**: `SignedBeaconBlock`, `BeaconBlock`, `BeaconBlockBody` from
//!   `/eth/v2/beacon/blocks/{block_id}`
//! - **Slashings**: `ProposerSlashing`, `AttesterSlashing` and the headers and
//!   attestations they carry
//!
//! Fields the mitigator never looks at are not modelled; serde skips them.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

use crate::encoding::HexBytes;
use crate::errors::WireError;

// =============================================================================
// PRIMITIVES
// =============================================================================

/// A slot number. Slots without a block are legal.
pub type Slot = u64;

/// An epoch number.
pub type Epoch = u64;

/// A validator's index in the beacon state registry.
pub type ValidatorIndex = u64;

/// Parse a validator index delivered as decimal text.
pub fn parse_validator_index(raw: &str) -> Result<ValidatorIndex, WireError> {
    raw.trim()
        .parse::<ValidatorIndex>()
        .map_err(|_| WireError::InvalidValidatorIndex(raw.to_string()))
}

/// Identifier accepted by the block endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BlockId {
    /// Canonical head.
    Head,
    /// Genesis block.
    Genesis,
    /// Latest finalized block.
    Finalized,
    /// Block at a slot. A skipped slot has no block.
    Slot(Slot),
    /// Block by `0x`-prefixed root.
    Root(String),
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockId::Head => f.write_str("head"),
            BlockId::Genesis => f.write_str("genesis"),
            BlockId::Finalized => f.write_str("finalized"),
            BlockId::Slot(slot) => write!(f, "{}", slot),
            BlockId::Root(root) => f.write_str(root),
        }
    }
}

// =============================================================================
// NODE
// =============================================================================

/// Envelope of the sync status endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncStatusResponse {
    pub data: SyncStatus,
}

/// Node sync status.
#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SyncStatus {
    /// Whether the node is still catching up.
    pub is_syncing: bool,
    /// Slot of the node's current head.
    #[serde_as(as = "DisplayFromStr")]
    pub head_slot: Slot,
    /// How many slots the node is behind the wall clock.
    #[serde_as(as = "DisplayFromStr")]
    pub sync_distance: u64,
}

// =============================================================================
// BLOCKS
// =============================================================================

/// Envelope of the v2 block endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeaconBlockResponse {
    /// Fork name (`deneb`, `electra`, ...).
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub execution_optimistic: bool,
    #[serde(default)]
    pub finalized: bool,
    pub data: SignedBeaconBlock,
}

/// A signed beacon block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedBeaconBlock {
    pub message: BeaconBlock,
    pub signature: HexBytes,
}

/// A beacon block. Only the fields needed for slashing detection are decoded.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeaconBlock {
    #[serde_as(as = "DisplayFromStr")]
    pub slot: Slot,
    pub proposer_index: String,
    pub parent_root: HexBytes,
    pub state_root: HexBytes,
    pub body: BeaconBlockBody,
}

impl BeaconBlock {
    /// Proposer slashings included in this block.
    pub fn proposer_slashings(&self) -> &[ProposerSlashing] {
        &self.body.proposer_slashings
    }

    /// Attester slashings included in this block.
    pub fn attester_slashings(&self) -> &[AttesterSlashing] {
        &self.body.attester_slashings
    }

    /// Whether the block carries any slashing evidence at all.
    pub fn has_slashings(&self) -> bool {
        !self.body.proposer_slashings.is_empty() || !self.body.attester_slashings.is_empty()
    }
}

/// Block body. Missing lists decode as empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BeaconBlockBody {
    #[serde(default)]
    pub proposer_slashings: Vec<ProposerSlashing>,
    #[serde(default)]
    pub attester_slashings: Vec<AttesterSlashing>,
}

// =============================================================================
// SLASHINGS
// =============================================================================

/// Block header as signed by a proposer.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeaconBlockHeader {
    #[serde_as(as = "DisplayFromStr")]
    pub slot: Slot,
    /// Decimal text; parsed by the consumer.
    pub proposer_index: String,
    pub parent_root: HexBytes,
    pub state_root: HexBytes,
    pub body_root: HexBytes,
}

/// A block header with its BLS signature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedBeaconBlockHeader {
    pub message: BeaconBlockHeader,
    pub signature: HexBytes,
}

/// Evidence that one proposer signed two different headers for the same slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposerSlashing {
    pub signed_header_1: SignedBeaconBlockHeader,
    pub signed_header_2: SignedBeaconBlockHeader,
}

impl ProposerSlashing {
    /// The accused proposer. Both headers name the same proposer.
    pub fn proposer_index(&self) -> &str {
        &self.signed_header_1.message.proposer_index
    }
}

/// FFG checkpoint.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    #[serde_as(as = "DisplayFromStr")]
    pub epoch: Epoch,
    pub root: HexBytes,
}

/// Attestation vote data.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttestationData {
    #[serde_as(as = "DisplayFromStr")]
    pub slot: Slot,
    #[serde_as(as = "DisplayFromStr")]
    pub index: u64,
    pub beacon_block_root: HexBytes,
    pub source: Checkpoint,
    pub target: Checkpoint,
}

/// Attestation with the explicit list of attesting validator indices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedAttestation {
    /// Decimal text; parsed by the consumer.
    pub attesting_indices: Vec<String>,
    pub data: AttestationData,
    pub signature: HexBytes,
}

/// Evidence of a double vote or surround vote. Validators present in both
/// attestations are slashable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttesterSlashing {
    pub attestation_1: IndexedAttestation,
    pub attestation_2: IndexedAttestation,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT: &str = "0x0000000000000000000000000000000000000000000000000000000000000001";

    fn header_json(proposer: &str) -> String {
        format!(
            r#"{{"message":{{"slot":"10","proposer_index":"{proposer}","parent_root":"{ROOT}","state_root":"{ROOT}","body_root":"{ROOT}"}},"signature":"0x00"}}"#
        )
    }

    #[test]
    fn test_parse_validator_index() {
        assert_eq!(parse_validator_index("791764"), Ok(791764));
        assert_eq!(parse_validator_index(" 16 "), Ok(16));
        assert!(parse_validator_index("0x10").is_err());
        assert!(parse_validator_index("").is_err());
    }

    #[test]
    fn test_block_id_display() {
        assert_eq!(BlockId::Slot(3822593).to_string(), "3822593");
        assert_eq!(BlockId::Head.to_string(), "head");
        assert_eq!(BlockId::Root("0xab".into()).to_string(), "0xab");
    }

    #[test]
    fn test_sync_status_decodes_quoted_numbers() {
        let json = r#"{"data":{"head_slot":"3822600","sync_distance":"0","is_syncing":false,"is_optimistic":false,"el_offline":false}}"#;
        let response: SyncStatusResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.data.head_slot, 3822600);
        assert!(!response.data.is_syncing);
    }

    #[test]
    fn test_proposer_slashing_exposes_first_header_index() {
        let json = format!(
            r#"{{"signed_header_1":{},"signed_header_2":{}}}"#,
            header_json("42"),
            header_json("42")
        );
        let slashing: ProposerSlashing = serde_json::from_str(&json).unwrap();
        assert_eq!(slashing.proposer_index(), "42");
    }

    #[test]
    fn test_block_body_defaults_missing_slashings() {
        let json = format!(
            r#"{{"slot":"5","proposer_index":"1","parent_root":"{ROOT}","state_root":"{ROOT}","body":{{"graffiti":"0x00"}}}}"#
        );
        let block: BeaconBlock = serde_json::from_str(&json).unwrap();
        assert!(!block.has_slashings());
        assert!(block.proposer_slashings().is_empty());
    }
}
