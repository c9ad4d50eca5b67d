use serde::{Deserialize, Serialize};

/// Raw `?page=&limit=` query values.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// Resolved page request: `page` is 1-based, `limit` is clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: u64,
    pub limit: u64,
}

impl PageParams {
    #[must_use]
    pub fn resolve(query: PageQuery, default_limit: u64, max_limit: u64) -> Self {
        let max_limit = max_limit.max(1);
        Self {
            page: query.page.unwrap_or(1).max(1),
            limit: query.limit.unwrap_or(default_limit).clamp(1, max_limit),
        }
    }

    /// Zero-based index for `Paginator::fetch_page`.
    #[must_use]
    pub const fn page_index(&self) -> u64 {
        self.page - 1
    }

    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.page_index() * self.limit
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl Pagination {
    #[must_use]
    pub const fn new(params: PageParams, total: u64) -> Self {
        Self {
            page: params.page,
            limit: params.limit,
            total,
            total_pages: total.div_ceil(params.limit),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Paginated<T> {
    #[must_use]
    pub const fn new(items: Vec<T>, params: PageParams, total: u64) -> Self {
        Self {
            items,
            pagination: Pagination::new(params, total),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}
