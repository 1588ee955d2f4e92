//! Shared query parameter types for API handlers.

use cadence_core::pagination::{clamp_limit, PageRequest};
use serde::Deserialize;

/// Page-number pagination (`?page=&page_size=`), 1-based.
#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl PageParams {
    pub fn request(&self, default_size: i64) -> PageRequest {
        PageRequest::new(self.page, self.page_size, default_size)
    }
}

/// Top-N listings (`?limit=`).
#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<i64>,
}

impl LimitParams {
    pub fn limit_or(&self, default: i64) -> i64 {
        clamp_limit(self.limit, default)
    }
}

/// Prefix search (`?q=&limit=&page=&page_size=`).
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub limit: Option<i64>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}
