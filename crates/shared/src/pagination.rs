//! Pagination query types for list endpoints.

use serde::Deserialize;

/// Default page size for message listings.
pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// Maximum page size a client may request.
pub const MAX_PAGE_SIZE: i64 = 200;

/// Limit/offset pagination parameters.
#[derive(Debug, Clone, Copy, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub struct Pagination {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl Pagination {
    /// Effective limit, clamped to `[1, MAX_PAGE_SIZE]`.
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    /// Effective offset, never negative.
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}
