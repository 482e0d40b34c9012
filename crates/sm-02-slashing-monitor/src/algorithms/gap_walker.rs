//! # Gap Walker
//!
//! Fetches and evaluates every slot between the watermark and a newly
//! announced head, so that missed notifications and skipped slots never leave
//! a hole in coverage.
//!
//! ## Watermark Rules
//!
//! - Advances one slot at a time, only after that slot was fetched and evaluated
//!   (or found empty).
//! - A failed or cancelled fetch leaves the watermark on the previous slot, so
//!   the next walk retries the failing slot.
//! - A walk whose target is not ahead of the watermark performs no fetches.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn, Instrument, Span};

use shared_types::{BlockId, Slot};

use super::evaluator::SlashingEvaluator;
use crate::domain::{Detection, MonitorError, WalkError, WalkOutcome};
use crate::metrics;
use crate::ports::ChainDataPort;

/// Walks slot ranges against a chain data source.
pub struct GapWalker<C: ChainDataPort> {
    chain: Arc<C>,
    evaluator: SlashingEvaluator,
    span: Span,
}

impl<C: ChainDataPort> GapWalker<C> {
    /// Create a walker logging under a `gap_walker` span.
    pub fn new(chain: Arc<C>, evaluator: SlashingEvaluator) -> Self {
        Self {
            chain,
            evaluator,
            span: tracing::info_span!("gap_walker"),
        }
    }

    /// Create a walker whose span is a child of `parent`.
    pub fn with_parent(chain: Arc<C>, evaluator: SlashingEvaluator, parent: &Span) -> Self {
        Self {
            chain,
            evaluator,
            span: tracing::info_span!(parent: parent, "gap_walker"),
        }
    }

    /// Check every slot in `(from_exclusive, to_inclusive]`, ascending.
    ///
    /// Stops at the first matching block. Each fetch races `cancel`; a stop
    /// request aborts the walk with [`MonitorError::Cancelled`].
    pub async fn walk(
        &self,
        from_exclusive: Slot,
        to_inclusive: Slot,
        cancel: &mut watch::Receiver<bool>,
    ) -> Result<WalkOutcome, WalkError> {
        self.walk_inner(from_exclusive, to_inclusive, cancel)
            .instrument(self.span.clone())
            .await
    }

    async fn walk_inner(
        &self,
        from_exclusive: Slot,
        to_inclusive: Slot,
        cancel: &mut watch::Receiver<bool>,
    ) -> Result<WalkOutcome, WalkError> {
        let mut watermark = from_exclusive;
        if to_inclusive <= from_exclusive {
            debug!(
                watermark,
                announced = to_inclusive,
                "Announced slot is not ahead of watermark"
            );
            return Ok(WalkOutcome {
                watermark,
                detection: None,
            });
        }

        for slot in (from_exclusive + 1)..=to_inclusive {
            let block_id = BlockId::Slot(slot);
            let fetched = tokio::select! {
                biased;
                _ = crate::application::cancelled(cancel) => Err(MonitorError::Cancelled),
                result = self.chain.block(&block_id) => result,
            };

            let block = match fetched {
                Ok(block) => block,
                Err(source) => {
                    if source != MonitorError::Cancelled {
                        metrics::record_fetch_error();
                    }
                    return Err(WalkError {
                        watermark,
                        failed_slot: slot,
                        source,
                    });
                }
            };

            match block {
                None => {
                    debug!(slot, "No block at slot, skipping");
                    metrics::record_slot_checked(true);
                }
                Some(block) => {
                    info!(
                        slot,
                        proposer_index = %block.proposer_index,
                        proposer_slashings = block.proposer_slashings().len(),
                        attester_slashings = block.attester_slashings().len(),
                        "Checking block"
                    );
                    metrics::record_slot_checked(false);
                    if let Some(found) = self.evaluator.evaluate_block(&block) {
                        metrics::set_watermark(slot);
                        return Ok(WalkOutcome {
                            watermark: slot,
                            detection: Some(Detection::new(slot, found)),
                        });
                    }
                }
            }

            watermark = slot;
            metrics::set_watermark(watermark);
        }

        if to_inclusive - from_exclusive > 1 {
            warn!(
                from = from_exclusive + 1,
                to = to_inclusive,
                "Filled gap of {} slots",
                to_inclusive - from_exclusive
            );
        }

        Ok(WalkOutcome {
            watermark,
            detection: None,
        })
    }
}
