//! # Folio
//!
//! A tag-invalidated REST query cache for content-driven sites.
//!
//! Folio is the data-access layer of a frontend that consumes a remote
//! REST backend (blogs, events, partners, publications, research,
//! sliders, tags, videos, ...). Read queries become live, shared
//! subscriptions; write operations invalidate them by tag so no view
//! ever keeps stale data.
//!
//! ## Features
//!
//! - **Closed Tag Registry**: entity categories are an enum, so an
//!   undefined tag is a compile error
//! - **Declarative Endpoints**: every resource kind gets the same five
//!   canonical operations (list, get, create, update, delete)
//! - **Tag Invalidation**: a successful write refetches every live query
//!   sharing a tag with it, in one synchronous pass
//! - **Deduplication**: identical operation + parameters share one
//!   in-flight request and one cached result, reference counted
//! - **Snapshot Streams**: observers receive pending/fulfilled/rejected
//!   state snapshots over watch channels
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use folio::prelude::*;
//!
//! let client = ApiClient::builder()
//!     .with_config(ClientConfig::from_yaml_file("folio.yaml")?)
//!     .build()?;
//!
//! let events = client.entity(EntityTag::Event)?.clone();
//!
//! // Live read: pending -> fulfilled, refetched on every event mutation
//! let mut list = client.subscribe(&events.list(), ListParams::new().page(1).into())?;
//! let snapshot = list.settled().await;
//!
//! // Write: invalidates {event}, the list above refetches
//! client
//!     .mutate(&events.delete(), RequestParams::new().with_id("1"))
//!     .await?;
//! ```

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod core;
pub mod transport;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Client ===
    pub use crate::client::{ApiClient, ApiClientBuilder};

    // === Endpoints ===
    pub use crate::api::{ApiRegistry, EntityRoutes};
    pub use crate::core::endpoint::{
        CacheBehavior, CacheKey, EndpointDescriptor, PathTemplate, QueryValue, RequestParams,
    };

    // === Tags and events ===
    pub use crate::core::events::{EventEnvelope, InvalidationBus, InvalidationEvent};
    pub use crate::core::tag::{EntityTag, TagSet};

    // === Cache ===
    pub use crate::cache::{QuerySnapshot, QueryStatus, SnapshotStream, Subscription};

    // === Queries ===
    pub use crate::core::query::{ListParams, PaginatedResponse, PaginationMeta};

    // === Errors ===
    pub use crate::core::error::{ClientError, ClientResult, FetchError};

    // === Transport ===
    pub use crate::transport::{RestClient, Transport};

    // === Config ===
    pub use crate::config::ClientConfig;

    // === Utilities ===
    pub use crate::core::video::normalize_video_url;

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use reqwest::Method;
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::{Value, json};
}
