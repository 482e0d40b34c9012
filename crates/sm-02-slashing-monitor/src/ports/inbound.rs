//! # Inbound Ports
//!
//! API trait defining what the Slashing Monitor can do.

use async_trait::async_trait;

use crate::domain::{MonitorError, MonitorSnapshot};

/// Slashing Monitor API - inbound port.
#[async_trait]
pub trait SlashingMonitorApi: Send {
    /// Wait for the chain data source (optionally), subscribe to heads and
    /// start evaluating. Returns once the subscription is open.
    async fn start(&mut self, wait_for_sync: bool) -> Result<(), MonitorError>;

    /// Stop monitoring and join the consumer. Idempotent; a no-op before `start`.
    async fn stop(&mut self);

    /// Run the shutdown action directly, then stop. On failure the monitor
    /// keeps running and a later detection may still run the action.
    async fn execute_shutdown(&mut self) -> Result<Vec<u8>, MonitorError>;

    /// Current read-only view of the monitor.
    fn snapshot(&self) -> MonitorSnapshot;
}
