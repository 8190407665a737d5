//! Offset pagination for node listings.
//!
//! Offsets and limits are `i64` because that is what PostgreSQL binds
//! `LIMIT` and `OFFSET` as.

use serde::{Deserialize, Serialize};

/// Page size used when the caller gives none.
const DEFAULT_PAGE_SIZE: i64 = 50;
/// Largest page a caller may ask for.
const MAX_PAGE_SIZE: i64 = 500;

/// A 1-based page of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageRequest {
    /// Page number, starting at 1.
    pub page: u64,
    /// Rows per page.
    pub page_size: u64,
}

impl PageRequest {
    /// A page request with out-of-range values pulled back into bounds.
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE as u64),
        }
    }

    /// Rows to skip.
    pub fn offset(&self) -> i64 {
        let skipped = self.page.max(1).saturating_sub(1).saturating_mul(self.page_size);
        i64::try_from(skipped).unwrap_or(i64::MAX)
    }

    /// Rows to return.
    pub fn limit(&self) -> i64 {
        i64::try_from(self.page_size).map_or(MAX_PAGE_SIZE, |size| size.clamp(1, MAX_PAGE_SIZE))
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE as u64,
        }
    }
}

/// One page of results plus enough totals to render a pager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub page_size: u64,
    /// Matching rows across all pages.
    pub total_items: u64,
    /// Never less than 1, even for an empty listing.
    pub total_pages: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> PageResponse<T> {
    /// Wrap the rows fetched for `request` out of `total_items` matches.
    pub fn new(items: Vec<T>, request: &PageRequest, total_items: u64) -> Self {
        let page_size = request.page_size.max(1);
        let total_pages = total_items.div_ceil(page_size).max(1);
        Self {
            items,
            page: request.page,
            page_size,
            total_items,
            total_pages,
            has_next: request.page < total_pages,
            has_previous: request.page > 1,
        }
    }

    /// Convert every item, keeping the page totals.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResponse<U> {
        PageResponse {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total_items: self.total_items,
            total_pages: self.total_pages,
            has_next: self.has_next,
            has_previous: self.has_previous,
        }
    }
}
