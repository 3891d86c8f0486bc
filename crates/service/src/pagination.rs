//! Pagination utilities for service layer
//!
//! Provides a simple `Pagination` struct and helpers to normalize inputs.

use serde::Serialize;

/// Pagination parameters
#[derive(Clone, Copy, Debug)]
pub struct Pagination {
    /// 1-based page index
    pub page: u32,
    /// items per page
    pub per_page: u32,
}

impl Pagination {
    /// Clamp to sane defaults and convert to `u64`
    pub fn normalize(self) -> (u64, u64) {
        let page = if self.page == 0 { 1 } else { self.page };
        let per_page = self.per_page.clamp(1, 100);
        ((page - 1) as u64, per_page as u64)
    }

    /// Cut the requested page out of `items`.
    pub fn apply<T: Clone>(self, items: &[T]) -> Page<T> {
        let (idx, per) = self.normalize();
        let start = idx.saturating_mul(per).min(items.len() as u64) as usize;
        let end = (start as u64).saturating_add(per).min(items.len() as u64) as usize;
        Page {
            items: items[start..end].to_vec(),
            page: idx + 1,
            per_page: per,
            total: items.len() as u64,
        }
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 1, per_page: 20 } }
}

/// One page of results plus the size of the full collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
}
