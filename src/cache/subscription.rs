//! Subscription state snapshots and observer handles

use crate::core::error::FetchError;
use futures::Stream;
use serde_json::Value;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use super::store::ObserverGuard;

/// Fetch state of a live query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// The request (or a refetch) is in flight
    Pending,
    /// The last attempt succeeded
    Fulfilled,
    /// The last attempt failed
    Rejected,
}

/// One observable state of a subscription
///
/// While a refetch is pending, `data` retains the last fulfilled result
/// so consumers can keep rendering it behind a loading indicator.
#[derive(Debug, Clone)]
pub struct QuerySnapshot {
    pub status: QueryStatus,
    pub data: Option<Value>,
    pub error: Option<FetchError>,
}

impl QuerySnapshot {
    pub(crate) fn pending() -> Self {
        Self {
            status: QueryStatus::Pending,
            data: None,
            error: None,
        }
    }

    pub(crate) fn pending_with(data: Option<Value>) -> Self {
        Self {
            status: QueryStatus::Pending,
            data,
            error: None,
        }
    }

    pub(crate) fn fulfilled(data: Value) -> Self {
        Self {
            status: QueryStatus::Fulfilled,
            data: Some(data),
            error: None,
        }
    }

    pub(crate) fn rejected(error: FetchError, data: Option<Value>) -> Self {
        Self {
            status: QueryStatus::Rejected,
            data,
            error: Some(error),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == QueryStatus::Pending
    }

    pub fn is_fulfilled(&self) -> bool {
        self.status == QueryStatus::Fulfilled
    }

    pub fn is_rejected(&self) -> bool {
        self.status == QueryStatus::Rejected
    }
}

/// A live, observable read query
///
/// Created by subscribing to a read operation. Each subscription counts
/// as one observer on the shared cache entry; dropping the last one
/// disposes the entry, and any request still in flight for it settles
/// into nothing.
pub struct Subscription {
    rx: watch::Receiver<QuerySnapshot>,
    guard: ObserverGuard,
}

impl Subscription {
    pub(crate) fn new(rx: watch::Receiver<QuerySnapshot>, guard: ObserverGuard) -> Self {
        Self { rx, guard }
    }

    /// The current state snapshot
    pub fn snapshot(&self) -> QuerySnapshot {
        self.rx.borrow().clone()
    }

    /// Wait for the next state change and return the new snapshot
    pub async fn changed(&mut self) -> QuerySnapshot {
        // Err means the entry's sender is gone, which cannot happen while
        // this observer holds its guard; return the last value either way.
        let _ = self.rx.changed().await;
        self.snapshot()
    }

    /// Wait until the query is no longer pending
    pub async fn settled(&mut self) -> QuerySnapshot {
        // The watch Ref borrows self.rx; clone out of it before matching
        // so the Err arm can read the receiver again.
        let result = self
            .rx
            .wait_for(|snapshot| snapshot.status != QueryStatus::Pending)
            .await
            .map(|snapshot| snapshot.clone());
        match result {
            Ok(snapshot) => snapshot,
            Err(_) => self.snapshot(),
        }
    }

    /// Consume the subscription into a stream of snapshots
    ///
    /// The stream yields the current snapshot first, then every change.
    /// The observer reference is held until the stream is dropped.
    pub fn into_stream(self) -> SnapshotStream {
        SnapshotStream {
            inner: WatchStream::new(self.rx),
            _guard: self.guard,
        }
    }
}

/// Stream adapter over a subscription's snapshots
pub struct SnapshotStream {
    inner: WatchStream<QuerySnapshot>,
    _guard: ObserverGuard,
}

impl Stream for SnapshotStream {
    type Item = QuerySnapshot;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.get_mut().inner).poll_next(cx)
    }
}
