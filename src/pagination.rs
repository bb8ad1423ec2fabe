//! Page-number pagination shared by list endpoints.

use serde::Serialize;

/// Normalised page request.
///
/// Page numbers below 1 become 1 and page sizes are clamped to
/// `1..=MAX_PAGE_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    page_size: u64,
}

impl PageRequest {
    /// Page size used when none is requested.
    pub const DEFAULT_PAGE_SIZE: u64 = 20;
    /// Largest page size honoured.
    pub const MAX_PAGE_SIZE: u64 = 100;

    /// Builds a request from raw, possibly out-of-range values.
    #[must_use]
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Self {
        let clamped_page = page.map_or(1, |value| u64::try_from(value.max(1)).unwrap_or(1));
        let clamped_size = page_size.map_or(Self::DEFAULT_PAGE_SIZE, |value| {
            u64::try_from(value.max(1))
                .unwrap_or(1)
                .min(Self::MAX_PAGE_SIZE)
        });
        Self {
            page: clamped_page,
            page_size: clamped_size,
        }
    }

    /// Returns the first page at the default size.
    #[must_use]
    pub const fn first() -> Self {
        Self {
            page: 1,
            page_size: Self::DEFAULT_PAGE_SIZE,
        }
    }

    /// Returns the 1-based page number.
    #[must_use]
    pub const fn page(self) -> u64 {
        self.page
    }

    /// Returns the page size.
    #[must_use]
    pub const fn page_size(self) -> u64 {
        self.page_size
    }

    /// Returns the number of records preceding this page.
    #[must_use]
    pub const fn offset(self) -> u64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first()
    }
}

/// Paginated response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    /// Total number of matching records.
    pub count: u64,
    /// Number of pages, at least 1.
    pub total_pages: u64,
    /// Page number served.
    pub current_page: u64,
    /// Page size used.
    pub page_size: u64,
    /// Whether a later page exists.
    pub next: bool,
    /// Whether an earlier page exists.
    pub previous: bool,
    /// Records on this page.
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Assembles the envelope for `request` given the total match count.
    #[must_use]
    pub fn new(request: PageRequest, count: u64, results: Vec<T>) -> Self {
        let total_pages = count.div_ceil(request.page_size()).max(1);
        Self {
            count,
            total_pages,
            current_page: request.page(),
            page_size: request.page_size(),
            next: request.page() < total_pages,
            previous: request.page() > 1,
            results,
        }
    }

    /// Converts every record, keeping the envelope.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            total_pages: self.total_pages,
            current_page: self.current_page,
            page_size: self.page_size,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}
