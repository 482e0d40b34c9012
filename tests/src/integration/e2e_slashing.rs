//! # Reference Slashing Scenario
//!
//! Validator 791764 was slashed by an attester slashing included at slot
//! 3822593. The monitor starts with its watermark at 3822591 and receives a
//! head event for 3822594.
//!
//! Expected:
//! 1. 3822592 is fetched and has no match
//! 2. 3822593 is fetched and matches validator 791764
//! 3. The shutdown action runs exactly once
//! 4. 3822594 is never fetched

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::time::timeout;

    use sm_02_slashing_monitor::{
        MockChainData, MockShutdown, MonitorConfig, MonitorError, MonitorPhase, MonitorSnapshot,
        MonitoredIndices, SlashingEvaluator, SlashingKind, SlashingMonitorApi,
        SlashingMonitorService,
    };

    use crate::fixtures::{
        self, OTHER_VALIDATOR_A, OTHER_VALIDATOR_B, SLASHED_VALIDATOR, SLASHING_SLOT,
    };

    type Monitor = SlashingMonitorService<MockChainData, MockShutdown>;

    fn indices(list: &[u64]) -> MonitoredIndices {
        MonitoredIndices::new(list.iter().copied()).unwrap()
    }

    fn monitor(chain: &Arc<MockChainData>, shutdown: &Arc<MockShutdown>, list: &[u64]) -> Monitor {
        let config = MonitorConfig::for_testing(indices(list));
        SlashingMonitorService::new(config, chain.clone(), Some(shutdown.clone()))
    }

    async fn wait_terminal(monitor: &Monitor) -> MonitorSnapshot {
        let mut rx = monitor.subscribe_snapshot();
        let snapshot = timeout(
            Duration::from_secs(5),
            rx.wait_for(|snapshot| snapshot.phase.is_terminal()),
        )
        .await
        .expect("monitor did not finish")
        .expect("snapshot channel closed");
        *snapshot
    }

    // =========================================================================
    // EVALUATOR AGAINST RECORDED BLOCKS
    // =========================================================================

    #[test]
    fn test_slashed_validator_matches_among_others() {
        let evaluator = SlashingEvaluator::new(Arc::new(indices(&[
            SLASHED_VALIDATOR,
            OTHER_VALIDATOR_A,
            OTHER_VALIDATOR_B,
        ])));

        let found = evaluator
            .evaluate_block(&fixtures::block(SLASHING_SLOT))
            .expect("slashing block should match");
        assert_eq!(found.validator_index, SLASHED_VALIDATOR);
        assert_eq!(found.kind, SlashingKind::Attester);
    }

    #[test]
    fn test_validator_in_one_attestation_only_does_not_match() {
        let evaluator = SlashingEvaluator::new(Arc::new(indices(&[OTHER_VALIDATOR_A])));
        assert!(evaluator
            .evaluate_block(&fixtures::block(SLASHING_SLOT))
            .is_none());
    }

    #[test]
    fn test_previous_slot_has_no_match() {
        let evaluator = SlashingEvaluator::new(Arc::new(indices(&[SLASHED_VALIDATOR])));
        assert!(evaluator
            .evaluate_block(&fixtures::block(SLASHING_SLOT - 1))
            .is_none());
    }

    // =========================================================================
    // FULL MONITOR
    // =========================================================================

    #[tokio::test]
    async fn test_reference_scenario_stops_at_slashing_slot() {
        let chain = Arc::new(fixtures::mock_chain(SLASHING_SLOT - 2));
        let shutdown = Arc::new(MockShutdown::new());
        let mut monitor = monitor(
            &chain,
            &shutdown,
            &[SLASHED_VALIDATOR, OTHER_VALIDATOR_A, OTHER_VALIDATOR_B],
        );

        monitor.start(false).await.unwrap();
        assert!(chain.publish_head(SLASHING_SLOT + 1).await);

        let snapshot = wait_terminal(&monitor).await;
        assert_eq!(snapshot.phase, MonitorPhase::ShutdownTriggered);
        assert!(snapshot.shutdown_executed);
        assert_eq!(snapshot.watermark, Some(SLASHING_SLOT));

        let detection = snapshot.detection.expect("detection recorded");
        assert_eq!(detection.slot, SLASHING_SLOT);
        assert_eq!(detection.validator_index, SLASHED_VALIDATOR);

        assert_eq!(chain.fetched_slots(), vec![SLASHING_SLOT - 1, SLASHING_SLOT]);
        assert_eq!(shutdown.calls(), 1);
        assert!(chain.subscription_closed());

        monitor.stop().await;
        assert_eq!(shutdown.calls(), 1);
    }

    #[tokio::test]
    async fn test_unrelated_validators_keep_monitoring() {
        let chain = Arc::new(fixtures::mock_chain(SLASHING_SLOT - 2));
        let shutdown = Arc::new(MockShutdown::new());
        let mut monitor = monitor(&chain, &shutdown, &[OTHER_VALIDATOR_A, OTHER_VALIDATOR_B]);

        monitor.start(false).await.unwrap();
        assert!(chain.publish_head(SLASHING_SLOT + 1).await);

        let mut rx = monitor.subscribe_snapshot();
        timeout(
            Duration::from_secs(5),
            rx.wait_for(|snapshot| snapshot.watermark == Some(SLASHING_SLOT + 1)),
        )
        .await
        .expect("walk did not finish")
        .unwrap();

        assert_eq!(chain.fetched_slots(), fixtures::fixture_slots());
        assert_eq!(shutdown.calls(), 0);
        assert!(!monitor.snapshot().phase.is_terminal());

        monitor.stop().await;
        assert_eq!(monitor.snapshot().phase, MonitorPhase::Stopped);
        assert_eq!(shutdown.calls(), 0);
    }

    #[tokio::test]
    async fn test_stop_twice_never_runs_shutdown() {
        let chain = Arc::new(fixtures::mock_chain(SLASHING_SLOT - 2));
        let shutdown = Arc::new(MockShutdown::new());
        let mut monitor = monitor(&chain, &shutdown, &[SLASHED_VALIDATOR]);

        monitor.start(false).await.unwrap();
        monitor.stop().await;
        monitor.stop().await;

        assert_eq!(monitor.snapshot().phase, MonitorPhase::Stopped);
        assert_eq!(shutdown.calls(), 0);
        assert!(chain.fetched_slots().is_empty());
    }

    #[tokio::test]
    async fn test_stop_before_start() {
        let chain = Arc::new(fixtures::mock_chain(SLASHING_SLOT - 2));
        let shutdown = Arc::new(MockShutdown::new());
        let mut monitor = monitor(&chain, &shutdown, &[SLASHED_VALIDATOR]);

        monitor.stop().await;
        assert_eq!(monitor.snapshot().phase, MonitorPhase::Idle);
        assert_eq!(chain.subscriptions(), 0);

        monitor.start(false).await.unwrap();
        assert_eq!(chain.subscriptions(), 1);
        monitor.stop().await;
        assert_eq!(monitor.snapshot().phase, MonitorPhase::Stopped);
        assert_eq!(shutdown.calls(), 0);

        assert!(matches!(
            monitor.start(false).await,
            Err(MonitorError::Cancelled)
        ));
    }
}
