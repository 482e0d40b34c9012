//! # Slashing Monitor Service
//!
//! Application service owning the monitor lifecycle: sync wait, head
//! subscription, the consumer task and the shutdown trigger.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn, Instrument, Span};

use shared_types::{Slot, HEAD_TOPIC};

use super::cancelled;
use super::consumer::HeadConsumer;
use super::trigger::ShutdownTrigger;
use crate::algorithms::{GapWalker, SlashingEvaluator};
use crate::config::MonitorConfig;
use crate::domain::{MonitorError, MonitorPhase, MonitorSnapshot, MonitorState};
use crate::ports::{ChainDataPort, ShutdownPort, SlashingMonitorApi};

/// Cloneable handle that raises the stop flag from another task.
///
/// Useful while the owner is blocked inside [`SlashingMonitorService::start`].
#[derive(Debug, Clone)]
pub struct StopHandle {
    cancel: Arc<watch::Sender<bool>>,
}

impl StopHandle {
    /// Request a stop. Idempotent.
    pub fn stop(&self) {
        self.cancel.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.cancel.borrow()
    }
}

/// Slashing Monitor Service - watches heads and trips the shutdown action.
pub struct SlashingMonitorService<C: ChainDataPort, S: ShutdownPort> {
    /// Configuration.
    config: MonitorConfig,
    /// Chain data source.
    chain: Arc<C>,
    /// Shutdown action, if configured.
    shutdown: Option<Arc<S>>,
    /// At-most-once gate shared with the consumer.
    trigger: ShutdownTrigger,
    /// Stop flag.
    cancel: Arc<watch::Sender<bool>>,
    /// Published view for observers.
    snapshot: Arc<watch::Sender<MonitorSnapshot>>,
    /// Consumer task, once started.
    consumer: Option<JoinHandle<()>>,
    span: Span,
}

impl<C: ChainDataPort, S: ShutdownPort> SlashingMonitorService<C, S> {
    /// Create a new slashing monitor service.
    pub fn new(config: MonitorConfig, chain: Arc<C>, shutdown: Option<Arc<S>>) -> Self {
        let span = tracing::info_span!("slashing_monitor", monitored = %config.monitored);
        if shutdown.is_none() {
            span.in_scope(|| warn!("No shutdown action configured, running in detection-only mode"));
        }
        let (cancel, _) = watch::channel(false);
        let (snapshot, _) = watch::channel(MonitorSnapshot::default());
        Self {
            config,
            chain,
            shutdown,
            trigger: ShutdownTrigger::new(),
            cancel: Arc::new(cancel),
            snapshot: Arc::new(snapshot),
            consumer: None,
            span,
        }
    }

    /// Handle for stopping the monitor from another task.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            cancel: self.cancel.clone(),
        }
    }

    /// Receiver for snapshot updates.
    pub fn subscribe_snapshot(&self) -> watch::Receiver<MonitorSnapshot> {
        self.snapshot.subscribe()
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    fn set_phase(&self, phase: MonitorPhase) {
        self.snapshot.send_modify(|snapshot| {
            if !snapshot.phase.is_terminal() {
                snapshot.phase = phase;
            }
        });
    }

    /// Internal: resolve the starting watermark from sync status.
    ///
    /// Without waiting, one query decides. With waiting, polls until synced,
    /// logging progress and retrying connectivity errors.
    async fn await_sync(
        &self,
        wait_for_sync: bool,
        cancel: &mut watch::Receiver<bool>,
    ) -> Result<Slot, MonitorError> {
        loop {
            let status = tokio::select! {
                biased;
                _ = cancelled(cancel) => return Err(MonitorError::Cancelled),
                status = self.chain.sync_status() => status,
            };

            match status {
                Ok(status) if !status.is_syncing => {
                    info!(head_slot = status.head_slot, "Beacon node is synced");
                    return Ok(status.head_slot);
                }
                Ok(status) => {
                    if !wait_for_sync {
                        return Err(MonitorError::NotSynced {
                            sync_distance: status.sync_distance,
                        });
                    }
                    info!(sync_distance = status.sync_distance, "Waiting for beacon node to sync");
                }
                Err(e) => {
                    if !wait_for_sync {
                        return Err(e);
                    }
                    warn!(error = %e, "Error checking beacon node sync status, retrying");
                }
            }

            tokio::select! {
                biased;
                _ = cancelled(cancel) => return Err(MonitorError::Cancelled),
                _ = tokio::time::sleep(self.config.sync_poll_interval()) => {}
            }
        }
    }

    async fn start_inner(&mut self, wait_for_sync: bool) -> Result<(), MonitorError> {
        let mut cancel = self.cancel.subscribe();
        self.set_phase(MonitorPhase::AwaitingSync);

        let head_slot = self.await_sync(wait_for_sync, &mut cancel).await?;
        self.snapshot
            .send_modify(|snapshot| snapshot.watermark = Some(head_slot));

        let subscription = tokio::select! {
            biased;
            _ = cancelled(&mut cancel) => return Err(MonitorError::Cancelled),
            subscription = self.chain.subscribe_heads(&[HEAD_TOPIC]) => subscription?,
        };
        info!(watermark = head_slot, "Subscribed to head events");
        self.set_phase(MonitorPhase::Subscribed);

        let evaluator = SlashingEvaluator::with_parent(Arc::new(self.config.monitored.clone()), &self.span);
        let consumer = HeadConsumer {
            walker: GapWalker::with_parent(self.chain.clone(), evaluator, &self.span),
            shutdown: self.shutdown.clone(),
            trigger: self.trigger.clone(),
            state: MonitorState::new(head_slot),
            subscription,
            cancel,
            snapshot: self.snapshot.clone(),
        };
        let consumer_span = tracing::info_span!(parent: &self.span, "head_consumer");
        self.consumer = Some(tokio::spawn(consumer.run().instrument(consumer_span)));
        Ok(())
    }
}

#[async_trait]
impl<C: ChainDataPort, S: ShutdownPort> SlashingMonitorApi for SlashingMonitorService<C, S> {
    async fn start(&mut self, wait_for_sync: bool) -> Result<(), MonitorError> {
        if self.consumer.is_some() {
            return Err(MonitorError::AlreadyStarted);
        }
        let stopped = *self.cancel.borrow();
        if stopped {
            return Err(MonitorError::Cancelled);
        }

        let span = self.span.clone();
        let result = self.start_inner(wait_for_sync).instrument(span).await;
        match &result {
            Err(MonitorError::Cancelled) => self.set_phase(MonitorPhase::Stopped),
            Err(_) => self.set_phase(MonitorPhase::Idle),
            Ok(()) => {}
        }
        result
    }

    async fn stop(&mut self) {
        let idle = self.snapshot.borrow().phase == MonitorPhase::Idle;
        if idle && self.consumer.is_none() {
            return;
        }
        self.cancel.send_replace(true);
        if let Some(handle) = self.consumer.take() {
            if let Err(e) = handle.await {
                self.span
                    .in_scope(|| warn!(error = %e, "Head consumer terminated abnormally"));
            }
        }
        self.set_phase(MonitorPhase::Stopped);
    }

    async fn execute_shutdown(&mut self) -> Result<Vec<u8>, MonitorError> {
        let action = self.shutdown.clone().ok_or(MonitorError::NoShutdownAction)?;
        if !self.trigger.try_fire() {
            return Err(MonitorError::AlreadyTriggered);
        }

        let span = self.span.clone();
        let result = async {
            info!(command = %action.describe(), "Executing shutdown action");
            action.execute().await
        }
        .instrument(span)
        .await;
        let output = match result {
            Ok(output) => output,
            Err(e) => {
                self.trigger.release();
                self.span.in_scope(|| {
                    error!(error = %e, "Shutdown action failed, trigger released")
                });
                return Err(e);
            }
        };

        self.snapshot.send_modify(|snapshot| {
            snapshot.phase = MonitorPhase::ShutdownTriggered;
            snapshot.shutdown_triggered = true;
            snapshot.shutdown_executed = true;
        });
        self.stop().await;
        Ok(output)
    }

    fn snapshot(&self) -> MonitorSnapshot {
        *self.snapshot.borrow()
    }
}

impl<C: ChainDataPort, S: ShutdownPort> Drop for SlashingMonitorService<C, S> {
    fn drop(&mut self) {
        self.cancel.send_replace(true);
    }
}
