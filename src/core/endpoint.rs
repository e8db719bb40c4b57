//! Endpoint descriptors: the declarative unit the cache layer works with
//!
//! A descriptor names one backend operation: HTTP method, path template,
//! and its cache behavior. The behavior is a two-variant enum, so an
//! operation is a read (provides tags) or a write (invalidates tags) by
//! construction; a descriptor that does both is unrepresentable.

use crate::core::error::{ClientError, ClientResult};
use crate::core::tag::TagSet;
use indexmap::IndexMap;
use reqwest::Method;
use serde_json::Value;
use std::fmt;

/// How an operation interacts with the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBehavior {
    /// A read: results are cached and tagged with this set
    Provides(TagSet),
    /// A write: on success, every cached read sharing a tag refetches
    Invalidates(TagSet),
}

/// URL shape of an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathTemplate {
    /// `{base}` — the collection itself (list, create)
    Collection(String),
    /// `{base}/{id}` — one resource instance (get, update, delete)
    Item(String),
}

/// Declarative description of a single backend operation
#[derive(Debug, Clone)]
pub struct EndpointDescriptor {
    /// Stable operation identity, e.g. "event.list"
    pub operation: String,
    pub method: Method,
    pub path: PathTemplate,
    pub cache: CacheBehavior,
}

impl EndpointDescriptor {
    pub fn new(
        operation: impl Into<String>,
        method: Method,
        path: PathTemplate,
        cache: CacheBehavior,
    ) -> Self {
        Self {
            operation: operation.into(),
            method,
            path,
            cache,
        }
    }

    pub fn is_read(&self) -> bool {
        matches!(self.cache, CacheBehavior::Provides(_))
    }

    pub fn is_write(&self) -> bool {
        matches!(self.cache, CacheBehavior::Invalidates(_))
    }

    /// Tags this read provides; empty for writes
    pub fn provides(&self) -> TagSet {
        match self.cache {
            CacheBehavior::Provides(tags) => tags,
            CacheBehavior::Invalidates(_) => TagSet::EMPTY,
        }
    }

    /// Tags this write invalidates; empty for reads
    pub fn invalidates(&self) -> TagSet {
        match self.cache {
            CacheBehavior::Invalidates(tags) => tags,
            CacheBehavior::Provides(_) => TagSet::EMPTY,
        }
    }

    /// Substitute the identifier into the path template
    ///
    /// Item templates require a non-empty id. An id passed to a
    /// collection template is unused.
    pub fn resolve_path(&self, params: &RequestParams) -> ClientResult<String> {
        match &self.path {
            PathTemplate::Collection(base) => Ok(base.clone()),
            PathTemplate::Item(base) => {
                let id = params
                    .id
                    .as_deref()
                    .filter(|id| !id.is_empty())
                    .ok_or_else(|| ClientError::MissingId {
                        operation: self.operation.clone(),
                    })?;
                Ok(format!("{}/{}", base, id))
            }
        }
    }

    /// The deduplication key for this operation with the given parameters
    ///
    /// Identical operation + identical parameters yield identical keys and
    /// therefore share one cache entry; any difference in parameters
    /// produces a distinct key.
    pub fn cache_key(&self, params: &RequestParams) -> CacheKey {
        CacheKey(format!("{}?{}", self.operation, params.canonical()))
    }
}

/// A scalar or array value in a query-parameter mapping
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    String(String),
    Int(i64),
    Bool(bool),
    List(Vec<String>),
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::String(s) => f.write_str(s),
            QueryValue::Int(n) => write!(f, "{}", n),
            QueryValue::Bool(b) => write!(f, "{}", b),
            QueryValue::List(items) => f.write_str(&items.join(",")),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(v: &str) -> Self {
        QueryValue::String(v.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(v: String) -> Self {
        QueryValue::String(v)
    }
}

impl From<i64> for QueryValue {
    fn from(v: i64) -> Self {
        QueryValue::Int(v)
    }
}

impl From<usize> for QueryValue {
    fn from(v: usize) -> Self {
        QueryValue::Int(v as i64)
    }
}

impl From<bool> for QueryValue {
    fn from(v: bool) -> Self {
        QueryValue::Bool(v)
    }
}

/// Parameters of one operation invocation
///
/// Reads carry an optional id and query parameters; writes additionally
/// carry a JSON body. Payload shape is validated by the backend, not here.
#[derive(Debug, Clone, Default)]
pub struct RequestParams {
    /// Resource identifier for `{base}/{id}` templates
    pub id: Option<String>,
    /// Query parameters, in insertion order
    pub query: IndexMap<String, QueryValue>,
    /// JSON request body, for create/update
    pub body: Option<Value>,
}

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Query parameters flattened to string pairs; list values become one
    /// pair per element
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for (key, value) in &self.query {
            match value {
                QueryValue::List(items) => {
                    for item in items {
                        pairs.push((key.clone(), item.clone()));
                    }
                }
                other => pairs.push((key.clone(), other.to_string())),
            }
        }
        pairs
    }

    /// Canonical serialization used in cache keys
    ///
    /// Query keys are sorted so that insertion order does not split cache
    /// entries. The body, when present, is serialized as-is.
    fn canonical(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(id) = &self.id {
            parts.push(format!("id={}", id));
        }
        let mut keys: Vec<&String> = self.query.keys().collect();
        keys.sort();
        for key in keys {
            parts.push(format!("{}={}", key, self.query[key]));
        }
        if let Some(body) = &self.body {
            parts.push(format!("body={}", body));
        }
        parts.join("&")
    }
}

/// Key of one cache entry: operation identity + canonical parameters
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
