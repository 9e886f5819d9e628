//! Pagination types for list queries.

use serde::{Deserialize, Serialize};

/// Largest page a caller may request.
pub const MAX_LIMIT: u64 = 500;

/// Request parameters for paginated queries (limit/offset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Number of items per page.
    #[serde(default = "default_limit")]
    pub limit: u64,
    /// Number of items to skip.
    #[serde(default)]
    pub offset: u64,
}

fn default_limit() -> u64 {
    100
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
        }
    }
}

impl PageRequest {
    /// Creates a page request, clamping the limit into `1..=MAX_LIMIT`.
    #[must_use]
    pub fn new(limit: u64, offset: u64) -> Self {
        Self {
            limit: limit.clamp(1, MAX_LIMIT),
            offset,
        }
    }

    /// Returns the clamped limit for database queries.
    #[must_use]
    pub fn limit(&self) -> u64 {
        self.limit.clamp(1, MAX_LIMIT)
    }

    /// Returns the offset for database queries.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }
}

/// Response wrapper for paginated data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// The items in the current page.
    pub data: Vec<T>,
    /// Total number of items across all pages.
    pub total: u64,
    /// Whether items exist past this page.
    pub has_more: bool,
}

impl<T> PageResponse<T> {
    /// Creates a new paginated response.
    #[must_use]
    pub fn new(data: Vec<T>, request: PageRequest, total: u64) -> Self {
        let seen = request.offset().saturating_add(data.len() as u64);
        Self {
            data,
            total,
            has_more: seen < total,
        }
    }
}
