//! # Test Fixtures
//!
//! Beacon API responses for slots 3822592..=3822594. Slot 3822593 carries an
//! attester slashing in which validator 791764 signed both conflicting
//! attestations; validator 16 appears in only one of them.

pub mod beacon_node;

pub use beacon_node::BeaconNodeStub;

use shared_types::{BeaconBlock, BeaconBlockResponse, Slot};
use sm_02_slashing_monitor::MockChainData;

/// Validator slashed at [`SLASHING_SLOT`].
pub const SLASHED_VALIDATOR: u64 = 791764;
/// Validator present in only one of the conflicting attestations.
pub const OTHER_VALIDATOR_A: u64 = 16;
/// Validator absent from the slashing.
pub const OTHER_VALIDATOR_B: u64 = 32;
/// Slot whose block includes the attester slashing.
pub const SLASHING_SLOT: Slot = 3822593;

/// Raw `/eth/v2/beacon/blocks/{slot}` response body, if a fixture exists.
pub fn block_response_json(slot: Slot) -> Option<&'static str> {
    match slot {
        3822592 => Some(include_str!("../../fixtures/blocks/3822592.json")),
        3822593 => Some(include_str!("../../fixtures/blocks/3822593.json")),
        3822594 => Some(include_str!("../../fixtures/blocks/3822594.json")),
        _ => None,
    }
}

/// Decoded block for a fixture slot.
///
/// # Panics
///
/// If there is no fixture for `slot` or it does not decode.
pub fn block(slot: Slot) -> BeaconBlock {
    let json = block_response_json(slot).unwrap_or_else(|| panic!("no fixture for slot {}", slot));
    let response: BeaconBlockResponse = serde_json::from_str(json).expect("fixture decodes");
    response.data.message
}

/// Every fixture slot, ascending.
pub fn fixture_slots() -> Vec<Slot> {
    vec![SLASHING_SLOT - 1, SLASHING_SLOT, SLASHING_SLOT + 1]
}

/// Mock chain synced at `head_slot` holding every fixture block.
pub fn mock_chain(head_slot: Slot) -> MockChainData {
    let chain = MockChainData::synced_at(head_slot);
    for slot in fixture_slots() {
        chain.insert_block(block(slot));
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_decode() {
        for slot in fixture_slots() {
            assert_eq!(block(slot).slot, slot);
        }
    }

    #[test]
    fn test_slashing_fixture_content() {
        let slashing_block = block(SLASHING_SLOT);
        assert!(slashing_block.proposer_slashings().is_empty());
        let slashing = &slashing_block.attester_slashings()[0];
        let first = &slashing.attestation_1.attesting_indices;
        let second = &slashing.attestation_2.attesting_indices;
        assert!(first.contains(&SLASHED_VALIDATOR.to_string()));
        assert!(second.contains(&SLASHED_VALIDATOR.to_string()));
        assert!(first.contains(&OTHER_VALIDATOR_A.to_string()));
        assert!(!second.contains(&OTHER_VALIDATOR_A.to_string()));
        assert_eq!(slashing.attestation_1.signature.len(), 96);
    }

    #[test]
    fn test_neighbours_have_no_slashings() {
        assert!(!block(SLASHING_SLOT - 1).has_slashings());
        assert!(!block(SLASHING_SLOT + 1).has_slashings());
    }
}
