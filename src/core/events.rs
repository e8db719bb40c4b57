//! Invalidation event bus
//!
//! Every successful write publishes an [`InvalidationEvent`] carrying the
//! tag set its descriptor invalidates. The cache store applies the
//! invalidation pass synchronously as part of the write; the bus exists so
//! application code (loggers, devtools, secondary caches) can observe the
//! same stream without being in the write path.
//!
//! ```text
//! mutate() ──▶ transport ──▶ 2xx ──▶ CacheStore::invalidate(tags)
//!                                └──▶ InvalidationBus::publish() ──▶ subscribers
//! ```
//!
//! Built on `tokio::sync::broadcast`: multiple receivers, non-blocking
//! publish, lagging receivers lose old events rather than stalling writes.

use crate::core::tag::TagSet;
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Notification that a write completed and which tags it touched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidationEvent {
    /// Operation identity of the write, e.g. "event.delete"
    pub operation: String,
    /// Tags invalidated by the write
    pub tags: TagSet,
    /// Identifier of the mutated resource, when the operation had one
    pub entity_id: Option<String>,
}

/// Envelope wrapping an invalidation event with metadata
#[derive(Debug, Clone)]
pub struct EventEnvelope {
    /// Unique event ID
    pub id: Uuid,
    /// When the write completed
    pub timestamp: DateTime<Utc>,
    /// The actual event
    pub event: InvalidationEvent,
}

impl EventEnvelope {
    pub fn new(event: InvalidationEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event,
        }
    }
}

/// Broadcast-based bus for invalidation events
///
/// Cheap to clone (the sender is `Arc` internally) and shared between the
/// client facade and anything that wants to watch mutations.
#[derive(Debug, Clone)]
pub struct InvalidationBus {
    sender: broadcast::Sender<EventEnvelope>,
}

impl InvalidationBus {
    /// Create a bus with the given channel capacity
    ///
    /// Capacity bounds how many events a slow receiver may fall behind
    /// before it starts seeing `Lagged` on recv().
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers
    ///
    /// Non-blocking and infallible: with no subscribers the event is
    /// dropped. Returns the number of receivers that will see it.
    pub fn publish(&self, event: InvalidationEvent) -> usize {
        let envelope = EventEnvelope::new(event);
        tracing::debug!(
            operation = %envelope.event.operation,
            tags = %envelope.event.tags,
            "invalidation published"
        );
        // send() errs only when there are no receivers, which is fine
        self.sender.send(envelope).unwrap_or(0)
    }

    /// Subscribe to future events; events published earlier are not seen
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    /// Current number of active subscribers
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for InvalidationBus {
    fn default() -> Self {
        Self::new(1024)
    }
}
