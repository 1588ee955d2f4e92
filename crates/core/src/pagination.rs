//! Page-number pagination arithmetic and default page sizes.

use serde::Serialize;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const MAX_PAGE_SIZE: i64 = 100;

pub const DEFAULT_MUSICIANS_PAGE_SIZE: i64 = 6;
pub const DEFAULT_MUSICIAN_CATALOG_PAGE_SIZE: i64 = 10;
pub const DEFAULT_POPULAR_BY_MUSICIAN_LIMIT: i64 = 3;
pub const DEFAULT_POPULAR_LIMIT: i64 = 8;
pub const DEFAULT_SEARCH_LIMIT: i64 = 8;
pub const DEFAULT_PLAYLISTS_PAGE_SIZE: i64 = 8;

// ---------------------------------------------------------------------------
// Page requests
// ---------------------------------------------------------------------------

/// A clamped, 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

impl PageRequest {
    /// Build a request from raw query values, clamping the page to `>= 1` and
    /// the size to `1..=MAX_PAGE_SIZE`.
    pub fn new(page: Option<i64>, page_size: Option<i64>, default_size: i64) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: clamp_limit(page_size, default_size),
        }
    }

    /// Row offset for SQL `OFFSET`.
    pub fn offset(self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    pub fn limit(self) -> i64 {
        self.page_size
    }
}

/// Clamp a user-provided limit to `1..=MAX_PAGE_SIZE`.
pub fn clamp_limit(limit: Option<i64>, default: i64) -> i64 {
    limit.unwrap_or(default).clamp(1, MAX_PAGE_SIZE)
}

/// `ceil(count / page_size)`; zero rows means zero pages.
pub fn total_pages(count: i64, page_size: i64) -> i64 {
    if count <= 0 || page_size <= 0 {
        return 0;
    }
    (count + page_size - 1) / page_size
}

/// One page of results plus the page count.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total_count: i64) -> Self {
        Self {
            items,
            page: request.page,
            page_size: request.page_size,
            total_pages: total_pages(total_count, request.page_size),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }
}
