//! Transport seam between the cache layer and the remote backend
//!
//! The cache layer never talks HTTP directly; it goes through the
//! [`Transport`] trait so tests can substitute an in-memory backend and
//! applications can wrap the real client with their own policy (auth
//! headers, retries, circuit breaking). [`RestClient`] is the production
//! implementation over reqwest.

mod rest;

pub use rest::RestClient;

use crate::core::endpoint::{EndpointDescriptor, RequestParams};
use crate::core::error::FetchError;
use async_trait::async_trait;
use serde_json::Value;

/// Executes one operation against the backend
///
/// Implementations decide timeout and retry policy; the cache layer
/// treats every returned error as terminal for that attempt.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue the request described by `descriptor` with `params` and
    /// return the decoded JSON body
    ///
    /// Operations with empty response bodies (typically delete) resolve
    /// to `Value::Null`.
    async fn execute(
        &self,
        descriptor: &EndpointDescriptor,
        params: &RequestParams,
    ) -> Result<Value, FetchError>;
}
