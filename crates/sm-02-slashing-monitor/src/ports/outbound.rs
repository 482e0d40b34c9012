//! # Outbound Ports
//!
//! Traits for external dependencies (chain data source, shutdown action).

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use shared_types::{
    BeaconBlock, BlockId, EventPublisher, EventSubscription, HeadEvent, Slot, StreamEvent,
    SyncStatus, HEAD_TOPIC,
};

use crate::domain::MonitorError;

/// Chain data source - outbound port.
#[async_trait]
pub trait ChainDataPort: Send + Sync + 'static {
    /// Current sync status of the data source.
    async fn sync_status(&self) -> Result<SyncStatus, MonitorError>;

    /// Block at `id`. `Ok(None)` means no block exists there (skipped slot).
    async fn block(&self, id: &BlockId) -> Result<Option<BeaconBlock>, MonitorError>;

    /// Subscribe to live notifications. Only `head` is supported.
    async fn subscribe_heads(&self, topics: &[&str]) -> Result<EventSubscription, MonitorError>;
}

/// Shutdown action - outbound port.
#[async_trait]
pub trait ShutdownPort: Send + Sync + 'static {
    /// Run the action once, returning its captured output.
    async fn execute(&self) -> Result<Vec<u8>, MonitorError>;

    /// Human-readable description for logs.
    fn describe(&self) -> String;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mock chain data source for testing.
///
/// Slots without an inserted block are reported as skipped. Sync responses are
/// served in order; the last one repeats.
#[derive(Default)]
pub struct MockChainData {
    blocks: Mutex<HashMap<Slot, BeaconBlock>>,
    failing: Mutex<HashSet<Slot>>,
    stalled: Mutex<HashSet<Slot>>,
    fetched: Mutex<Vec<Slot>>,
    sync_responses: Mutex<VecDeque<Result<SyncStatus, MonitorError>>>,
    sync_queries: AtomicUsize,
    publisher: Mutex<Option<EventPublisher>>,
    subscriptions: AtomicUsize,
}

impl MockChainData {
    /// Empty chain with no sync response configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Chain that reports itself synced at `head_slot`.
    pub fn synced_at(head_slot: Slot) -> Self {
        let mock = Self::new();
        mock.push_sync_status(Ok(SyncStatus {
            is_syncing: false,
            head_slot,
            sync_distance: 0,
        }));
        mock
    }

    /// Queue a sync status response.
    pub fn push_sync_status(&self, response: Result<SyncStatus, MonitorError>) {
        lock(&self.sync_responses).push_back(response);
    }

    /// Make a block available at its slot.
    pub fn insert_block(&self, block: BeaconBlock) {
        lock(&self.blocks).insert(block.slot, block);
    }

    /// Make fetches of `slot` fail with a connectivity error.
    pub fn fail_slot(&self, slot: Slot) {
        lock(&self.failing).insert(slot);
    }

    /// Stop failing every slot.
    pub fn clear_failures(&self) {
        lock(&self.failing).clear();
    }

    /// Make fetches of `slot` hang until cancelled.
    pub fn stall_slot(&self, slot: Slot) {
        lock(&self.stalled).insert(slot);
    }

    /// Slots requested so far, in request order.
    pub fn fetched_slots(&self) -> Vec<Slot> {
        lock(&self.fetched).clone()
    }

    /// Number of sync status queries served.
    pub fn sync_queries(&self) -> usize {
        self.sync_queries.load(Ordering::SeqCst)
    }

    /// Number of subscriptions opened.
    pub fn subscriptions(&self) -> usize {
        self.subscriptions.load(Ordering::SeqCst)
    }

    /// Push an item to the current subscriber. Returns `false` if none is listening.
    pub async fn publish(&self, event: StreamEvent) -> bool {
        let publisher = lock(&self.publisher).clone();
        match publisher {
            Some(publisher) => publisher.publish(event).await,
            None => false,
        }
    }

    /// Announce a new head at `slot`.
    pub async fn publish_head(&self, slot: Slot) -> bool {
        self.publish(StreamEvent::Head(HeadEvent::new(slot, format!("0x{:064x}", slot))))
            .await
    }

    /// End the stream as a transport shutdown would.
    pub fn end_stream(&self) {
        lock(&self.publisher).take();
    }

    /// Whether the current subscriber has closed its subscription.
    pub fn subscription_closed(&self) -> bool {
        lock(&self.publisher)
            .as_ref()
            .map_or(true, EventPublisher::is_closed)
    }
}

#[async_trait]
impl ChainDataPort for MockChainData {
    async fn sync_status(&self) -> Result<SyncStatus, MonitorError> {
        self.sync_queries.fetch_add(1, Ordering::SeqCst);
        let mut responses = lock(&self.sync_responses);
        let response = if responses.len() > 1 {
            responses.pop_front()
        } else {
            responses.front().cloned()
        };
        response.unwrap_or_else(|| Err(MonitorError::Connectivity("no sync status".to_string())))
    }

    async fn block(&self, id: &BlockId) -> Result<Option<BeaconBlock>, MonitorError> {
        let slot = match id {
            BlockId::Slot(slot) => *slot,
            other => {
                return Err(MonitorError::Connectivity(format!(
                    "mock only serves slots, got {}",
                    other
                )))
            }
        };
        lock(&self.fetched).push(slot);

        let stalled = lock(&self.stalled).contains(&slot);
        if stalled {
            std::future::pending::<()>().await;
        }
        let failing = lock(&self.failing).contains(&slot);
        if failing {
            return Err(MonitorError::Connectivity(format!("mock failure at slot {}", slot)));
        }
        Ok(lock(&self.blocks).get(&slot).cloned())
    }

    async fn subscribe_heads(&self, topics: &[&str]) -> Result<EventSubscription, MonitorError> {
        if let Some(topic) = topics.iter().find(|t| **t != HEAD_TOPIC) {
            return Err(MonitorError::UnsupportedTopic(topic.to_string()));
        }
        let (publisher, subscription) = EventSubscription::channel(16);
        *lock(&self.publisher) = Some(publisher);
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
        Ok(subscription)
    }
}

/// Mock shutdown action for testing.
#[derive(Default)]
pub struct MockShutdown {
    /// Should return errors?
    should_fail: AtomicBool,
    calls: AtomicUsize,
}

impl MockShutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// A shutdown action that always fails.
    pub fn failing() -> Self {
        Self {
            should_fail: AtomicBool::new(true),
            ..Default::default()
        }
    }

    /// Switch between failing and succeeding runs.
    pub fn set_failing(&self, failing: bool) {
        self.should_fail.store(failing, Ordering::SeqCst);
    }

    /// Number of times the action ran.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ShutdownPort for MockShutdown {
    async fn execute(&self) -> Result<Vec<u8>, MonitorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(MonitorError::ShutdownFailed("mock failure".to_string()));
        }
        Ok(b"validator stopped\n".to_vec())
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}
