//! The cache table and its invalidation state machine
//!
//! One [`CacheStore`] owns the mapping from cache key (operation identity
//! + canonical parameters) to a live cache entry. Entries are reference
//! counted by observer; identical subscriptions share one entry and one
//! in-flight request.
//!
//! Per-entry state machine:
//!
//! ```text
//! pending ──settle──▶ fulfilled | rejected
//!    ▲                     │
//!    └────invalidation─────┘        (refetch with original params)
//! ```
//!
//! An invalidation that lands while a fetch is in flight does not cancel
//! it; the entry is marked and exactly one follow-up refetch starts when
//! the current one settles. Overlapping invalidations coalesce into that
//! single mark.
//!
//! The table is only ever locked for short, non-awaiting critical
//! sections; all network waiting happens in spawned fetch tasks.

use crate::core::endpoint::{CacheKey, EndpointDescriptor, RequestParams};
use crate::core::error::{ClientError, ClientResult, FetchError};
use crate::core::tag::TagSet;
use crate::transport::Transport;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;

use super::subscription::{QuerySnapshot, Subscription};

/// One live cache entry, shared by all observers of the same key
struct CacheEntry {
    descriptor: Arc<EndpointDescriptor>,
    params: Arc<RequestParams>,
    provided: TagSet,
    observers: usize,
    /// Incremented whenever a new fetch supersedes the previous one, so
    /// a settling task can tell whether its result is still wanted
    epoch: u64,
    in_flight: bool,
    refetch_queued: bool,
    tx: watch::Sender<QuerySnapshot>,
}

pub(crate) struct StoreShared {
    transport: Arc<dyn Transport>,
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
}

impl StoreShared {
    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<CacheKey, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for StoreShared {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreShared").finish_non_exhaustive()
    }
}

/// The shared table of live queries
///
/// Cheap to clone; clones share the same table and transport.
#[derive(Clone)]
pub struct CacheStore {
    shared: Arc<StoreShared>,
}

impl CacheStore {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            shared: Arc::new(StoreShared {
                transport,
                entries: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Register an observer for a read operation
    ///
    /// If an entry with the same key is already live, the observer joins
    /// it and shares its in-flight request and cached result; otherwise a
    /// new entry is created in `pending` state and the request is issued.
    pub fn subscribe(
        &self,
        descriptor: &EndpointDescriptor,
        params: RequestParams,
    ) -> ClientResult<Subscription> {
        if !descriptor.is_read() {
            return Err(ClientError::InvalidOperation {
                operation: descriptor.operation.clone(),
                message: "cannot subscribe to a write operation".to_string(),
            });
        }
        // Validates id presence up front, before any entry is created.
        descriptor.resolve_path(&params)?;

        let key = descriptor.cache_key(&params);
        let mut entries = self.shared.lock();

        let rx = match entries.get_mut(&key) {
            Some(entry) => {
                entry.observers += 1;
                tracing::debug!(key = %key, observers = entry.observers, "observer joined entry");
                entry.tx.subscribe()
            }
            None => {
                let (tx, rx) = watch::channel(QuerySnapshot::pending());
                let descriptor = Arc::new(descriptor.clone());
                let params = Arc::new(params);
                entries.insert(
                    key.clone(),
                    CacheEntry {
                        descriptor: Arc::clone(&descriptor),
                        params: Arc::clone(&params),
                        provided: descriptor.provides(),
                        observers: 1,
                        epoch: 0,
                        in_flight: true,
                        refetch_queued: false,
                        tx,
                    },
                );
                tracing::debug!(key = %key, "cache entry created");
                spawn_fetch(&self.shared, key.clone(), 0, descriptor, params);
                rx
            }
        };
        drop(entries);

        let guard = ObserverGuard {
            shared: Arc::clone(&self.shared),
            key,
        };
        Ok(Subscription::new(rx, guard))
    }

    /// Apply an invalidation event: schedule a refetch for every entry
    /// whose provided tags intersect `tags`
    ///
    /// The whole pass runs under one table lock, so every subscription
    /// active at the moment the write completed is either flipped to
    /// `pending` or marked for a follow-up refetch before anything else
    /// touches the table. Returns the number of entries affected.
    pub fn invalidate(&self, tags: TagSet) -> usize {
        let mut affected = 0;
        let mut entries = self.shared.lock();
        for (key, entry) in entries.iter_mut() {
            if !entry.provided.intersects(tags) {
                continue;
            }
            affected += 1;
            if entry.in_flight {
                // Coalesced: however many invalidations land while the
                // fetch runs, exactly one refetch follows it.
                entry.refetch_queued = true;
                tracing::debug!(key = %key, "refetch queued behind in-flight request");
                continue;
            }
            entry.epoch += 1;
            entry.in_flight = true;
            let previous = entry.tx.borrow().data.clone();
            entry.tx.send_replace(QuerySnapshot::pending_with(previous));
            tracing::debug!(key = %key, epoch = entry.epoch, "entry invalidated, refetching");
            spawn_fetch(
                &self.shared,
                key.clone(),
                entry.epoch,
                Arc::clone(&entry.descriptor),
                Arc::clone(&entry.params),
            );
        }
        affected
    }

    /// Number of live cache entries
    pub fn entry_count(&self) -> usize {
        self.shared.lock().len()
    }

    /// Number of observers on the entry for `key`, if it is live
    pub fn observer_count(&self, key: &CacheKey) -> Option<usize> {
        self.shared.lock().get(key).map(|e| e.observers)
    }
}

/// Issue the entry's request in a background task and settle the result
fn spawn_fetch(
    shared: &Arc<StoreShared>,
    key: CacheKey,
    epoch: u64,
    descriptor: Arc<EndpointDescriptor>,
    params: Arc<RequestParams>,
) {
    let shared = Arc::clone(shared);
    tokio::spawn(async move {
        let result = shared.transport.execute(&descriptor, &params).await;
        settle(&shared, &key, epoch, result);
    });
}

fn settle(shared: &Arc<StoreShared>, key: &CacheKey, epoch: u64, result: Result<Value, FetchError>) {
    let mut entries = shared.lock();
    let Some(entry) = entries.get_mut(key) else {
        // Last observer detached while the request was in flight.
        return;
    };
    if entry.epoch != epoch {
        // A newer fetch superseded this one; drop the result.
        return;
    }

    entry.in_flight = false;
    let snapshot = match result {
        Ok(data) => QuerySnapshot::fulfilled(data),
        Err(error) => {
            tracing::debug!(key = %key, error = %error, "request rejected");
            let previous = entry.tx.borrow().data.clone();
            QuerySnapshot::rejected(error, previous)
        }
    };
    entry.tx.send_replace(snapshot);

    if entry.refetch_queued {
        entry.refetch_queued = false;
        entry.epoch += 1;
        entry.in_flight = true;
        let previous = entry.tx.borrow().data.clone();
        entry.tx.send_replace(QuerySnapshot::pending_with(previous));
        tracing::debug!(key = %key, epoch = entry.epoch, "running queued refetch");
        spawn_fetch(
            shared,
            key.clone(),
            entry.epoch,
            Arc::clone(&entry.descriptor),
            Arc::clone(&entry.params),
        );
    }
}

/// Reference-counting handle for one observer of a cache entry
///
/// Dropping it detaches the observer; the entry is disposed with the
/// last one. Any in-flight request for a disposed entry is left to
/// finish on its own and its result is discarded.
#[derive(Debug)]
pub struct ObserverGuard {
    shared: Arc<StoreShared>,
    key: CacheKey,
}

impl Drop for ObserverGuard {
    fn drop(&mut self) {
        let mut entries = self.shared.lock();
        if let Some(entry) = entries.get_mut(&self.key) {
            entry.observers -= 1;
            if entry.observers == 0 {
                entries.remove(&self.key);
                tracing::debug!(key = %self.key, "last observer detached, entry disposed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::EntityRoutes;
    use crate::core::tag::EntityTag;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Transport that always answers with the same value
    struct StaticTransport {
        response: Value,
        calls: AtomicUsize,
    }

    impl StaticTransport {
        fn new(response: Value) -> Arc<Self> {
            Arc::new(Self {
                response,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Transport for StaticTransport {
        async fn execute(
            &self,
            _descriptor: &EndpointDescriptor,
            _params: &RequestParams,
        ) -> Result<Value, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.response.clone())
        }
    }

    #[tokio::test]
    async fn test_subscribe_settles_to_fulfilled() {
        let transport = StaticTransport::new(json!([{"id": "1"}]));
        let store = CacheStore::new(transport.clone());
        let routes = EntityRoutes::new(EntityTag::Event);

        let mut sub = store.subscribe(&routes.list(), RequestParams::new()).unwrap();
        assert!(sub.snapshot().is_pending());

        let snapshot = sub.settled().await;
        assert!(snapshot.is_fulfilled());
        assert_eq!(snapshot.data, Some(json!([{"id": "1"}])));
    }

    #[tokio::test]
    async fn test_settled_is_stable_once_fulfilled() {
        let transport = StaticTransport::new(json!([{"id": "1"}]));
        let store = CacheStore::new(transport);
        let routes = EntityRoutes::new(EntityTag::Event);

        let mut sub = store.subscribe(&routes.list(), RequestParams::new()).unwrap();
        let first = sub.settled().await;
        // A second wait on an already-settled query returns immediately
        // with the same state.
        let second = sub.settled().await;
        assert!(second.is_fulfilled());
        assert_eq!(first.data, second.data);
    }

    #[tokio::test]
    async fn test_same_key_shares_entry_and_request() {
        let transport = StaticTransport::new(json!([]));
        let store = CacheStore::new(transport.clone());
        let routes = EntityRoutes::new(EntityTag::Event);

        let mut a = store.subscribe(&routes.list(), RequestParams::new()).unwrap();
        let mut b = store.subscribe(&routes.list(), RequestParams::new()).unwrap();
        a.settled().await;
        b.settled().await;

        assert_eq!(store.entry_count(), 1);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidate_disjoint_tags_schedules_nothing() {
        let transport = StaticTransport::new(json!([]));
        let store = CacheStore::new(transport.clone());
        let routes = EntityRoutes::new(EntityTag::Event);

        let mut sub = store.subscribe(&routes.list(), RequestParams::new()).unwrap();
        sub.settled().await;

        assert_eq!(store.invalidate(TagSet::single(EntityTag::Video)), 0);
        assert_eq!(store.invalidate(TagSet::single(EntityTag::Event)), 1);
    }

    #[tokio::test]
    async fn test_subscribe_rejects_write_descriptor() {
        let transport = StaticTransport::new(Value::Null);
        let store = CacheStore::new(transport);
        let routes = EntityRoutes::new(EntityTag::Event);

        let result = store.subscribe(&routes.create(), RequestParams::new());
        assert!(matches!(result, Err(ClientError::InvalidOperation { .. })));
    }
}
