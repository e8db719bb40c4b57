//! List-query parameters and pagination envelope
//!
//! Conveniences for the `list` operation of every entity kind: a small
//! builder for page/limit/filter/sort parameters, and the deserialized
//! shape of the backend's paginated responses.

use crate::core::endpoint::{QueryValue, RequestParams};
use serde::Deserialize;

/// Parameters accepted by list operations
///
/// # Example
/// ```rust,ignore
/// let params = ListParams::new().page(2).limit(10).sort("created_at:desc");
/// let sub = client.subscribe(&routes.list(), params.into_request_params())?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    page: Option<usize>,
    limit: Option<usize>,
    filter: Option<String>,
    sort: Option<String>,
}

impl ListParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Page number, clamped to a minimum of 1
    pub fn page(mut self, page: usize) -> Self {
        self.page = Some(page.max(1));
        self
    }

    /// Items per page, clamped to 1..=100
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit.clamp(1, 100));
        self
    }

    /// Filter expression, passed through to the backend verbatim
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Sort field and direction, e.g. "created_at:desc"
    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// Convert into the query mapping of a [`RequestParams`]
    pub fn into_request_params(self) -> RequestParams {
        let mut params = RequestParams::new();
        if let Some(page) = self.page {
            params = params.with_query("page", page);
        }
        if let Some(limit) = self.limit {
            params = params.with_query("limit", limit);
        }
        if let Some(filter) = self.filter {
            params = params.with_query("filter", QueryValue::String(filter));
        }
        if let Some(sort) = self.sort {
            params = params.with_query("sort", QueryValue::String(sort));
        }
        params
    }
}

impl From<ListParams> for RequestParams {
    fn from(params: ListParams) -> Self {
        params.into_request_params()
    }
}

/// Paginated response envelope returned by list operations
#[derive(Debug, Clone, Deserialize)]
pub struct PaginatedResponse<T> {
    /// The page of data
    pub data: Vec<T>,
    /// Pagination metadata
    pub pagination: PaginationMeta,
}

/// Pagination metadata attached to list responses
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationMeta {
    /// Current page number (starts at 1)
    pub page: usize,
    /// Number of items per page
    pub limit: usize,
    /// Total number of items (after filters)
    pub total: usize,
    /// Total number of pages
    pub total_pages: usize,
    /// Whether there is a next page
    pub has_next: bool,
    /// Whether there is a previous page
    pub has_prev: bool,
}
