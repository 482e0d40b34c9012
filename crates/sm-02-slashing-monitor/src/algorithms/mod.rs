//! # Algorithms Module
//!
//! Slashing evaluation and gap-free slot walking.

pub mod evaluator;
pub mod gap_walker;
pub mod intersection;

pub use evaluator::SlashingEvaluator;
pub use gap_walker::GapWalker;
pub use intersection::sorted_intersection;
