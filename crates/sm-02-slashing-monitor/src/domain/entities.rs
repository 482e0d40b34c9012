//! # Domain Entities
//!
//! Mutable monitor state and its read-only snapshot.

use serde::{Deserialize, Serialize};

use shared_types::Slot;

use super::value_objects::Detection;

/// Lifecycle phase of the monitor.
///
/// ```text
/// [Idle] ──start──→ [AwaitingSync] ──synced──→ [Subscribed] ⇄ [Evaluating]
///                                                                  │
///                                                     match ───────┴──→ [ShutdownTriggered]
///
/// any phase ──stop──→ [Stopped]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonitorPhase {
    Idle,
    AwaitingSync,
    Subscribed,
    Evaluating,
    ShutdownTriggered,
    Stopped,
}

impl MonitorPhase {
    /// Terminal phases never transition again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::ShutdownTriggered | Self::Stopped)
    }
}

/// State owned by the head consumer. Nothing else writes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorState {
    /// Last slot fully checked for slashings.
    watermark: Slot,
    /// Set once, when the shutdown trigger fires.
    shutdown_triggered: bool,
}

impl MonitorState {
    /// Start from the head slot reported by the initial sync check.
    pub fn new(head_slot: Slot) -> Self {
        Self {
            watermark: head_slot,
            shutdown_triggered: false,
        }
    }

    pub fn watermark(&self) -> Slot {
        self.watermark
    }

    pub fn shutdown_triggered(&self) -> bool {
        self.shutdown_triggered
    }

    /// Adopt a walker's watermark. Never moves backwards.
    pub fn advance_to(&mut self, slot: Slot) {
        if slot > self.watermark {
            self.watermark = slot;
        }
    }

    /// Latch the shutdown flag. Returns `false` if it was already set.
    pub fn mark_shutdown_triggered(&mut self) -> bool {
        !std::mem::replace(&mut self.shutdown_triggered, true)
    }
}

/// Read-only view published by the monitor for observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorSnapshot {
    pub phase: MonitorPhase,
    /// `None` until the initial sync check has succeeded.
    pub watermark: Option<Slot>,
    pub shutdown_triggered: bool,
    /// Whether the shutdown action ran and reported success.
    pub shutdown_executed: bool,
    pub detection: Option<Detection>,
}

impl Default for MonitorSnapshot {
    fn default() -> Self {
        Self {
            phase: MonitorPhase::Idle,
            watermark: None,
            shutdown_triggered: false,
            shutdown_executed: false,
            detection: None,
        }
    }
}
