//! # Full Stack Over HTTP
//!
//! Beacon HTTP client, chain data adapter and monitor service running
//! against [`BeaconNodeStub`](crate::fixtures::BeaconNodeStub), which serves
//! the recorded blocks and streams head events on demand.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::time::timeout;

    use mitigator_runtime::BeaconChainData;
    use shared_types::BlockId;
    use sm_01_beacon_client::BeaconClientConfig;
    use sm_02_slashing_monitor::{
        ChainDataPort, MockShutdown, MonitorConfig, MonitorPhase, MonitoredIndices,
        SlashingMonitorApi, SlashingMonitorService,
    };

    use crate::fixtures::{BeaconNodeStub, OTHER_VALIDATOR_A, SLASHED_VALIDATOR, SLASHING_SLOT};

    fn chain_data(node: &BeaconNodeStub) -> Arc<BeaconChainData> {
        let config = BeaconClientConfig::for_testing(node.url());
        Arc::new(BeaconChainData::from_config(config).unwrap())
    }

    #[tokio::test]
    async fn test_adapter_reads_sync_status_and_blocks() {
        let node = BeaconNodeStub::start(SLASHING_SLOT - 2).await;
        let chain = chain_data(&node);

        let status = chain.sync_status().await.unwrap();
        assert!(!status.is_syncing);
        assert_eq!(status.head_slot, SLASHING_SLOT - 2);

        let block = chain
            .block(&BlockId::Slot(SLASHING_SLOT))
            .await
            .unwrap()
            .expect("fixture block");
        assert_eq!(block.slot, SLASHING_SLOT);
        assert_eq!(block.attester_slashings().len(), 1);

        // No fixture: served as 404, i.e. a skipped slot.
        assert!(chain
            .block(&BlockId::Slot(SLASHING_SLOT + 100))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_detection_over_http_event_stream() {
        let node = BeaconNodeStub::start(SLASHING_SLOT - 2).await;
        let shutdown = Arc::new(MockShutdown::new());
        let indices = MonitoredIndices::new([SLASHED_VALIDATOR, OTHER_VALIDATOR_A]).unwrap();
        let mut monitor = SlashingMonitorService::new(
            MonitorConfig::for_testing(indices),
            chain_data(&node),
            Some(shutdown.clone()),
        );

        monitor.start(true).await.unwrap();
        assert_eq!(node.stream_listeners(), 1);
        node.publish_head(SLASHING_SLOT + 1);

        let mut rx = monitor.subscribe_snapshot();
        let snapshot = *timeout(
            Duration::from_secs(10),
            rx.wait_for(|snapshot| snapshot.phase.is_terminal()),
        )
        .await
        .expect("monitor did not finish")
        .unwrap();

        assert_eq!(snapshot.phase, MonitorPhase::ShutdownTriggered);
        assert!(snapshot.shutdown_executed);
        assert_eq!(snapshot.detection.map(|d| d.slot), Some(SLASHING_SLOT));
        assert_eq!(shutdown.calls(), 1);
        assert_eq!(node.fetched_slots(), vec![SLASHING_SLOT - 1, SLASHING_SLOT]);

        let requests = node.requests();
        assert_eq!(requests[0], "/eth/v1/node/syncing");
        assert!(requests
            .iter()
            .any(|path| path == "/eth/v1/events?topics=head"));

        monitor.stop().await;
    }
}
