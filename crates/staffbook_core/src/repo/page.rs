//! Paged query request and result envelope.
//!
//! # Invariants
//! - A normalized query has `page >= 1` and `1 <= page_size <= 100`.
//! - `total_pages == ceil(total_items / page_size)`.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

fn default_page() -> i64 {
    DEFAULT_PAGE
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

/// Page request with an entity-specific filter payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedQuery<F> {
    /// 1-based page number.
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    pub filter: Option<F>,
}

impl<F> Default for PagedQuery<F> {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            filter: None,
        }
    }
}

impl<F> PagedQuery<F> {
    pub fn new(page: i64, page_size: i64) -> Self {
        Self {
            page,
            page_size,
            filter: None,
        }
    }

    pub fn with_filter(mut self, filter: F) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Clamps `page` and `page_size` into their valid ranges.
    pub fn normalize(&mut self) {
        if self.page <= 0 {
            self.page = DEFAULT_PAGE;
        }
        if self.page_size <= 0 {
            self.page_size = DEFAULT_PAGE_SIZE;
        }
        if self.page_size > MAX_PAGE_SIZE {
            self.page_size = MAX_PAGE_SIZE;
        }
    }

    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    /// 1-based page number. Expects a normalized query.
    pub fn page_number(&self) -> u64 {
        u64::try_from(self.page.max(1)).unwrap_or(1)
    }

    /// Rows to skip before this page. Expects a normalized query.
    pub fn offset(&self) -> u64 {
        (self.page_number() - 1).saturating_mul(self.limit())
    }

    /// Rows in one page. Expects a normalized query.
    pub fn limit(&self) -> u64 {
        u64::try_from(self.page_size).unwrap_or(0)
    }
}

/// One page of results plus totals for the whole filtered set.
///
/// Every count is unsigned; `page` and `page_size` echo the normalized
/// request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total_items: u64,
    pub total_pages: u64,
    pub page: u64,
    pub page_size: u64,
}

impl<T> PaginatedResult<T> {
    /// Builds a result for a normalized query.
    pub fn new<F>(items: Vec<T>, total_items: u64, query: &PagedQuery<F>) -> Self {
        let page_size = query.limit();
        let total_pages = if page_size == 0 {
            0
        } else {
            total_items.div_ceil(page_size)
        };
        Self {
            items,
            total_items,
            total_pages,
            page: query.page_number(),
            page_size,
        }
    }

    /// Maps items while keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResult<U> {
        PaginatedResult {
            items: self.items.into_iter().map(f).collect(),
            total_items: self.total_items,
            total_pages: self.total_pages,
            page: self.page,
            page_size: self.page_size,
        }
    }
}
