//! # Slashing Evaluator
//!
//! Decides whether a block's slashing evidence implicates a monitored validator.
//!
//! Indices arrive as decimal text. An entry that does not parse is logged and
//! treated as non-matching; it never stops evaluation of the remaining records.

use std::sync::Arc;

use tracing::{warn, Span};

use shared_types::{parse_validator_index, AttesterSlashing, BeaconBlock, ProposerSlashing, ValidatorIndex};

use super::intersection::sorted_intersection;
use crate::domain::{MonitoredIndices, SlashingKind, SlashingMatch};

/// Matches slashing records against the monitored index set.
#[derive(Debug, Clone)]
pub struct SlashingEvaluator {
    monitored: Arc<MonitoredIndices>,
    span: Span,
}

impl SlashingEvaluator {
    /// Create an evaluator logging under a `slashing_evaluator` span.
    pub fn new(monitored: Arc<MonitoredIndices>) -> Self {
        Self {
            monitored,
            span: tracing::info_span!("slashing_evaluator"),
        }
    }

    /// Create an evaluator whose span is a child of `parent`.
    pub fn with_parent(monitored: Arc<MonitoredIndices>, parent: &Span) -> Self {
        Self {
            monitored,
            span: tracing::info_span!(parent: parent, "slashing_evaluator"),
        }
    }

    /// The monitored index set.
    pub fn monitored(&self) -> &MonitoredIndices {
        &self.monitored
    }

    /// First monitored proposer, taken from each record's first header.
    pub fn evaluate_proposer_slashings(&self, records: &[ProposerSlashing]) -> Option<ValidatorIndex> {
        self.span.in_scope(|| {
            records.iter().find_map(|record| {
                let raw = record.proposer_index();
                match parse_validator_index(raw) {
                    Ok(index) if self.monitored.contains(index) => Some(index),
                    Ok(_) => None,
                    Err(e) => {
                        warn!(error = %e, "Skipping proposer slashing with malformed index");
                        None
                    }
                }
            })
        })
    }

    /// First monitored validator present in both attestations of any record.
    pub fn evaluate_attester_slashings(&self, records: &[AttesterSlashing]) -> Option<ValidatorIndex> {
        self.span.in_scope(|| {
            records.iter().find_map(|record| {
                let mut first = self.parse_indices(&record.attestation_1.attesting_indices);
                let mut second = self.parse_indices(&record.attestation_2.attesting_indices);
                sorted_intersection(&mut first, &mut second)
                    .into_iter()
                    .find(|index| self.monitored.contains(*index))
            })
        })
    }

    /// Evaluate all slashing evidence in a block. Proposer slashings are checked first.
    pub fn evaluate_block(&self, block: &BeaconBlock) -> Option<SlashingMatch> {
        if let Some(validator_index) = self.evaluate_proposer_slashings(block.proposer_slashings()) {
            return Some(SlashingMatch {
                validator_index,
                kind: SlashingKind::Proposer,
            });
        }
        self.evaluate_attester_slashings(block.attester_slashings())
            .map(|validator_index| SlashingMatch {
                validator_index,
                kind: SlashingKind::Attester,
            })
    }

    fn parse_indices(&self, raw: &[String]) -> Vec<ValidatorIndex> {
        raw.iter()
            .filter_map(|entry| match parse_validator_index(entry) {
                Ok(index) => Some(index),
                Err(e) => {
                    warn!(error = %e, "Skipping malformed attesting index");
                    None
                }
            })
            .collect()
    }
}
