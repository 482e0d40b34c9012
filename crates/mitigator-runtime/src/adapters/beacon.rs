//! # Beacon Chain Data Adapter
//!
//! Implements the monitor's `ChainDataPort` on top of sm-01's
//! `BeaconHttpClient`.
//!
//! ## Error Mapping
//!
//! | Client error | Monitor error |
//! |--------------|---------------|
//! | `UnsupportedTopic` | `UnsupportedTopic` |
//! | anything else | `Connectivity` |

use async_trait::async_trait;

use shared_types::{BeaconBlock, BlockId, EventSubscription, SyncStatus};
use sm_01_beacon_client::{BeaconClientConfig, BeaconClientError, BeaconHttpClient};
use sm_02_slashing_monitor::{ChainDataPort, MonitorError};

/// Convert a beacon client error at the adapter boundary.
pub fn map_client_error(error: BeaconClientError) -> MonitorError {
    match error {
        BeaconClientError::UnsupportedTopic(topic) => MonitorError::UnsupportedTopic(topic),
        other => MonitorError::Connectivity(other.to_string()),
    }
}

/// Beacon node as a chain data source.
pub struct BeaconChainData {
    client: BeaconHttpClient,
}

impl BeaconChainData {
    /// Wrap an existing client.
    pub fn new(client: BeaconHttpClient) -> Self {
        Self { client }
    }

    /// Build the client from configuration.
    pub fn from_config(config: BeaconClientConfig) -> Result<Self, BeaconClientError> {
        Ok(Self::new(BeaconHttpClient::new(config)?))
    }

    pub fn client(&self) -> &BeaconHttpClient {
        &self.client
    }
}

#[async_trait]
impl ChainDataPort for BeaconChainData {
    async fn sync_status(&self) -> Result<SyncStatus, MonitorError> {
        self.client.node_syncing().await.map_err(map_client_error)
    }

    async fn block(&self, id: &BlockId) -> Result<Option<BeaconBlock>, MonitorError> {
        let response = self.client.beacon_block(id).await.map_err(map_client_error)?;
        Ok(response.map(|response| response.data.message))
    }

    async fn subscribe_heads(&self, topics: &[&str]) -> Result<EventSubscription, MonitorError> {
        self.client
            .subscribe_events(topics)
            .await
            .map_err(map_client_error)
    }
}
