//! Tag-based query cache: live subscriptions, deduplication, invalidation

mod store;
mod subscription;

pub use store::CacheStore;
pub use subscription::{QuerySnapshot, QueryStatus, SnapshotStream, Subscription};
