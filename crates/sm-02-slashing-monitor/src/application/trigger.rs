//! At-most-once gate in front of the shutdown action.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag that lets exactly one caller fire the shutdown action.
#[derive(Debug, Clone, Default)]
pub struct ShutdownTrigger {
    fired: Arc<AtomicBool>,
}

impl ShutdownTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the trigger. Only the first caller gets `true`.
    pub fn try_fire(&self) -> bool {
        self.fired
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Hand the trigger back after a run that did not stop the validator,
    /// so a later detection can still fire it.
    pub fn release(&self) {
        self.fired.store(false, Ordering::Release);
    }

    pub fn is_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }
}
