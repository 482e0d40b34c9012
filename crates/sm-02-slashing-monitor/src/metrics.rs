//! # Monitor Metrics
//!
//! Prometheus metrics for the slashing monitor.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! sm-02-slashing-monitor = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `slashing_monitor_slots_checked_total` - Counter of slots fully checked
//! - `slashing_monitor_skipped_slots_total` - Counter of slots with no block
//! - `slashing_monitor_fetch_errors_total` - Counter of failed block fetches
//! - `slashing_monitor_slashings_detected_total` - Counter of detections (by kind)
//! - `slashing_monitor_notifications_dropped_total` - Counter of dropped stream items (by reason)
//! - `slashing_monitor_watermark_slot` - Gauge of the last fully checked slot

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_int_counter, register_int_counter_vec, register_int_gauge, IntCounter,
    IntCounterVec, IntGauge,
};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Total slots fully checked
    pub static ref SLOTS_CHECKED: IntCounter = register_int_counter!(
        "slashing_monitor_slots_checked_total",
        "Total number of slots fully checked for slashings"
    )
    .expect("Failed to create SLOTS_CHECKED metric");

    /// Total skipped slots
    pub static ref SKIPPED_SLOTS: IntCounter = register_int_counter!(
        "slashing_monitor_skipped_slots_total",
        "Total number of slots without a block"
    )
    .expect("Failed to create SKIPPED_SLOTS metric");

    /// Total failed block fetches
    pub static ref FETCH_ERRORS: IntCounter = register_int_counter!(
        "slashing_monitor_fetch_errors_total",
        "Total number of block fetches that failed"
    )
    .expect("Failed to create FETCH_ERRORS metric");

    /// Slashings detected, labeled by kind
    pub static ref SLASHINGS_DETECTED: IntCounterVec = register_int_counter_vec!(
        "slashing_monitor_slashings_detected_total",
        "Total number of slashings detected for monitored validators",
        &["kind"]
    )
    .expect("Failed to create SLASHINGS_DETECTED metric");

    /// Stream items dropped, labeled by reason
    pub static ref NOTIFICATIONS_DROPPED: IntCounterVec = register_int_counter_vec!(
        "slashing_monitor_notifications_dropped_total",
        "Total number of head notifications dropped",
        &["reason"]
    )
    .expect("Failed to create NOTIFICATIONS_DROPPED metric");

    /// Last fully checked slot
    pub static ref WATERMARK_SLOT: IntGauge = register_int_gauge!(
        "slashing_monitor_watermark_slot",
        "Last slot fully checked for slashings"
    )
    .expect("Failed to create WATERMARK_SLOT metric");
}

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

/// Record a slot checked, either evaluated or skipped
#[cfg(feature = "metrics")]
pub fn record_slot_checked(skipped: bool) {
    SLOTS_CHECKED.inc();
    if skipped {
        SKIPPED_SLOTS.inc();
    }
}

/// Record a failed block fetch
#[cfg(feature = "metrics")]
pub fn record_fetch_error() {
    FETCH_ERRORS.inc();
}

/// Record a slashing detection
#[cfg(feature = "metrics")]
pub fn record_slashing_detected(kind: &str) {
    SLASHINGS_DETECTED.with_label_values(&[kind]).inc();
}

/// Record a dropped notification with reason
#[cfg(feature = "metrics")]
pub fn record_notification_dropped(reason: &str) {
    NOTIFICATIONS_DROPPED.with_label_values(&[reason]).inc();
}

/// Update the watermark gauge
#[cfg(feature = "metrics")]
pub fn set_watermark(slot: u64) {
    WATERMARK_SLOT.set(slot as i64);
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

#[cfg(not(feature = "metrics"))]
pub fn record_slot_checked(_skipped: bool) {}

#[cfg(not(feature = "metrics"))]
pub fn record_fetch_error() {}

#[cfg(not(feature = "metrics"))]
pub fn record_slashing_detected(_kind: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_notification_dropped(_reason: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn set_watermark(_slot: u64) {}
