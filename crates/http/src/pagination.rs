//! Pagination query parameters and response metadata

use fleet_storage::{ListQuery, DEFAULT_PER_PAGE};
use serde::{Deserialize, Serialize};

/// `page` / `per_page` query parameters shared by every listing endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl PageParams {
    /// Apply these parameters on top of a search-scoped query.
    pub fn apply(&self, query: ListQuery) -> ListQuery {
        query
            .page(self.page.unwrap_or(1))
            .per_page(self.per_page.unwrap_or(DEFAULT_PER_PAGE))
    }
}

/// Pagination metadata for list responses.
#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    pub current_page: u32,
    pub per_page: u32,
    pub total_items: u64,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn new(query: &ListQuery, total: u64) -> Self {
        let per_page = query.per_page;
        let total_pages = if per_page > 0 {
            total.div_ceil(u64::from(per_page)) as u32
        } else {
            0
        };

        Self {
            current_page: query.page,
            per_page,
            total_items: total,
            total_pages,
            has_next: query.page < total_pages,
            has_prev: query.page > 1,
        }
    }
}
