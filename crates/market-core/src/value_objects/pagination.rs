//! Offset pagination

use serde::Serialize;

/// Default page size for listings
pub const DEFAULT_LIMIT: u32 = 10;
/// Largest page size a caller may ask for
pub const MAX_LIMIT: u32 = 100;

/// Normalized page/limit pair (1-based page)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Normalize raw query values: page < 1 becomes 1, limit < 1 becomes
    /// [`DEFAULT_LIMIT`], and limit is capped at [`MAX_LIMIT`].
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self::with_default_limit(page, limit, DEFAULT_LIMIT)
    }

    pub fn with_default_limit(page: Option<i64>, limit: Option<i64>, default_limit: u32) -> Self {
        let page = page.filter(|p| *p >= 1).unwrap_or(1);
        let limit = limit.filter(|l| *l >= 1).unwrap_or(i64::from(default_limit));
        Self {
            page: u32::try_from(page).unwrap_or(u32::MAX),
            limit: limit.min(i64::from(MAX_LIMIT)) as u32,
        }
    }

    #[inline]
    pub fn page(&self) -> u32 {
        self.page
    }

    #[inline]
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Rows to skip
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of results plus the total row count
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    #[serde(skip)]
    pub request: PageRequest,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            request,
        }
    }

    /// `ceil(total / limit)`
    pub fn total_pages(&self) -> i64 {
        let limit = i64::from(self.request.limit());
        (self.total + limit - 1) / limit
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            request: self.request,
        }
    }
}
