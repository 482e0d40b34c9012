//! Head consumer task.
//!
//! Drains the head subscription one notification at a time. It is the only
//! writer of [`MonitorState`]; each notification runs a full gap walk before
//! the next one is read.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use shared_types::{EventSubscription, Slot, StreamEvent};

use super::cancelled;
use super::trigger::ShutdownTrigger;
use crate::algorithms::GapWalker;
use crate::domain::{Detection, MonitorPhase, MonitorSnapshot, MonitorState};
use crate::metrics;
use crate::ports::{ChainDataPort, ShutdownPort};

/// What the consumer does after handling one notification.
enum Flow {
    Continue,
    Exit,
}

pub(crate) struct HeadConsumer<C: ChainDataPort, S: ShutdownPort> {
    pub(crate) walker: GapWalker<C>,
    pub(crate) shutdown: Option<Arc<S>>,
    pub(crate) trigger: ShutdownTrigger,
    pub(crate) state: MonitorState,
    pub(crate) subscription: EventSubscription,
    pub(crate) cancel: watch::Receiver<bool>,
    pub(crate) snapshot: Arc<watch::Sender<MonitorSnapshot>>,
}

impl<C: ChainDataPort, S: ShutdownPort> HeadConsumer<C, S> {
    pub(crate) async fn run(mut self) {
        info!(watermark = self.state.watermark(), "Monitoring head events");

        loop {
            let event = tokio::select! {
                biased;
                _ = cancelled(&mut self.cancel) => break,
                event = self.subscription.next() => event,
            };

            let flow = match event {
                Some(StreamEvent::Head(head)) => match head.parse_slot() {
                    Ok(slot) => self.handle_head(slot).await,
                    Err(e) => {
                        warn!(error = %e, "Dropping head event with malformed slot");
                        metrics::record_notification_dropped("malformed_slot");
                        Flow::Continue
                    }
                },
                Some(StreamEvent::Unsupported { topic }) => {
                    debug!(topic = %topic, "Dropping event for unsubscribed topic");
                    metrics::record_notification_dropped("unsupported_topic");
                    Flow::Continue
                }
                Some(StreamEvent::Malformed(reason)) => {
                    warn!(reason = %reason, "Dropping malformed event");
                    metrics::record_notification_dropped("malformed_frame");
                    Flow::Continue
                }
                None => {
                    warn!(
                        watermark = self.state.watermark(),
                        "Head event stream ended, waiting for stop"
                    );
                    cancelled(&mut self.cancel).await;
                    break;
                }
            };

            if let Flow::Exit = flow {
                break;
            }
        }

        self.subscription.close();
        let watermark = self.state.watermark();
        self.snapshot.send_modify(|snapshot| {
            if !snapshot.phase.is_terminal() {
                snapshot.phase = MonitorPhase::Stopped;
            }
            snapshot.watermark = Some(watermark);
        });
        info!(watermark = self.state.watermark(), "Head consumer stopped");
    }

    async fn handle_head(&mut self, slot: Slot) -> Flow {
        let from = self.state.watermark();
        debug!(slot, watermark = from, "Received head event");
        self.publish(MonitorPhase::Evaluating);

        match self.walker.walk(from, slot, &mut self.cancel).await {
            Ok(outcome) => {
                self.state.advance_to(outcome.watermark);
                if let Some(detection) = outcome.detection {
                    self.on_detection(detection).await;
                    return Flow::Exit;
                }
            }
            Err(e) if e.is_cancelled() => {
                self.state.advance_to(e.watermark);
                return Flow::Exit;
            }
            Err(e) => {
                self.state.advance_to(e.watermark);
                error!(
                    slot = e.failed_slot,
                    watermark = e.watermark,
                    error = %e.source,
                    "Error checking beacon block, will retry on next head"
                );
            }
        }

        self.publish(MonitorPhase::Subscribed);
        Flow::Continue
    }

    async fn on_detection(&mut self, detection: Detection) {
        error!(
            slot = detection.slot,
            validator_index = detection.validator_index,
            kind = %detection.kind,
            "Slashing detected for monitored validator"
        );
        metrics::record_slashing_detected(detection.kind.as_str());
        self.state.mark_shutdown_triggered();

        let executed = match &self.shutdown {
            None => {
                error!("No shutdown action configured, validator has NOT been stopped");
                false
            }
            Some(_) if !self.trigger.try_fire() => {
                error!("Shutdown action already claimed by a manual run, not executing again");
                false
            }
            Some(action) => match action.execute().await {
                Ok(output) => {
                    info!(
                        command = %action.describe(),
                        output = %String::from_utf8_lossy(&output).trim(),
                        "Shutdown command executed"
                    );
                    true
                }
                Err(e) => {
                    error!(command = %action.describe(), error = %e, "Shutdown command failed");
                    false
                }
            },
        };

        self.subscription.close();
        let watermark = self.state.watermark();
        self.snapshot.send_modify(|snapshot| {
            snapshot.phase = MonitorPhase::ShutdownTriggered;
            snapshot.watermark = Some(watermark);
            snapshot.shutdown_triggered = true;
            snapshot.shutdown_executed = executed;
            snapshot.detection = Some(detection);
        });
    }

    fn publish(&self, phase: MonitorPhase) {
        let watermark = self.state.watermark();
        self.snapshot.send_modify(|snapshot| {
            if !snapshot.phase.is_terminal() {
                snapshot.phase = phase;
            }
            snapshot.watermark = Some(watermark);
        });
    }
}
