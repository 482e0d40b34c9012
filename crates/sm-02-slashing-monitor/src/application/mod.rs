//! # Application Module
//!
//! Application services orchestrating the domain and outbound ports.

mod consumer;
pub mod service;
pub mod trigger;

pub use service::{SlashingMonitorService, StopHandle};
pub use trigger::ShutdownTrigger;

use tokio::sync::watch;

/// Resolve once the stop flag is raised or its sender is gone.
pub(crate) async fn cancelled(rx: &mut watch::Receiver<bool>) {
    let _ = rx.wait_for(|stopped| *stopped).await;
}
