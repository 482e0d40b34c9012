//! # Beacon Event Stream Types
//!
//! Types for the `/eth/v1/events` server-sent-event stream and the channel
//! pair that carries decoded events from the transport task to the consumer.
//!
//! ## Closure
//!
//! An [`EventSubscription`] is closed explicitly with [`EventSubscription::close`]
//! or implicitly when it is dropped. The matching [`EventPublisher`] observes
//! either and stops its transport loop.

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};

use crate::entities::Slot;
use crate::errors::WireError;

/// The only topic the mitigator subscribes to.
pub const HEAD_TOPIC: &str = "head";

/// Payload of a `head` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadEvent {
    /// New head slot, decimal text.
    pub slot: String,
    /// Root of the new head block.
    pub block: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub epoch_transition: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_duty_dependent_root: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_duty_dependent_root: Option<String>,
}

impl HeadEvent {
    /// Build a head event for a slot and block root.
    pub fn new(slot: Slot, block: impl Into<String>) -> Self {
        Self {
            slot: slot.to_string(),
            block: block.into(),
            state: String::new(),
            epoch_transition: false,
            current_duty_dependent_root: None,
            previous_duty_dependent_root: None,
        }
    }

    /// Parse the announced slot.
    pub fn parse_slot(&self) -> Result<Slot, WireError> {
        self.slot
            .trim()
            .parse::<Slot>()
            .map_err(|_| WireError::InvalidSlot(self.slot.clone()))
    }
}

/// One item delivered by an event subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A decoded head event.
    Head(HeadEvent),
    /// A well-formed frame for a topic nobody asked for.
    Unsupported { topic: String },
    /// A frame that could not be decoded.
    Malformed(String),
}

/// Receiving half of an event subscription.
#[derive(Debug)]
pub struct EventSubscription {
    events: mpsc::Receiver<StreamEvent>,
    closer: watch::Sender<bool>,
}

/// Sending half of an event subscription, owned by the transport task.
#[derive(Debug, Clone)]
pub struct EventPublisher {
    events: mpsc::Sender<StreamEvent>,
    closed: watch::Receiver<bool>,
}

impl EventSubscription {
    /// Create a connected publisher/subscription pair.
    pub fn channel(buffer: usize) -> (EventPublisher, EventSubscription) {
        let (events_tx, events_rx) = mpsc::channel(buffer.max(1));
        let (closer_tx, closer_rx) = watch::channel(false);
        (
            EventPublisher {
                events: events_tx,
                closed: closer_rx,
            },
            EventSubscription {
                events: events_rx,
                closer: closer_tx,
            },
        )
    }

    /// Wait for the next event. `None` once the stream has ended.
    pub async fn next(&mut self) -> Option<StreamEvent> {
        self.events.recv().await
    }

    /// Close the subscription. Idempotent.
    pub fn close(&mut self) {
        self.closer.send_replace(true);
        self.events.close();
    }

    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        *self.closer.borrow()
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.closer.send_replace(true);
    }
}

impl EventPublisher {
    /// Deliver an event. Returns `false` if the subscription is gone.
    pub async fn publish(&self, event: StreamEvent) -> bool {
        if self.is_closed() {
            return false;
        }
        self.events.send(event).await.is_ok()
    }

    /// Whether the subscriber has closed or dropped the subscription.
    pub fn is_closed(&self) -> bool {
        *self.closed.borrow() || self.events.is_closed()
    }

    /// Resolve once the subscriber closes or drops the subscription.
    pub async fn closed(&mut self) {
        let flag = &mut self.closed;
        let events = &self.events;
        tokio::select! {
            _ = async { flag.wait_for(|closed| *closed).await.is_ok() } => {}
            _ = events.closed() => {}
        }
    }
}
