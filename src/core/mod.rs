//! Core building blocks: tags, endpoint descriptors, events, errors

pub mod endpoint;
pub mod error;
pub mod events;
pub mod query;
pub mod tag;
pub mod video;

pub use endpoint::{CacheBehavior, CacheKey, EndpointDescriptor, PathTemplate, QueryValue, RequestParams};
pub use error::{ClientError, ClientResult, FetchError};
pub use events::{EventEnvelope, InvalidationBus, InvalidationEvent};
pub use query::{ListParams, PaginatedResponse, PaginationMeta};
pub use tag::{EntityTag, TagSet};
pub use video::normalize_video_url;
