//! Page/size window validation shared by list endpoints.

use thiserror::Error;

/// Page size applied when the client does not send one.
pub const DEFAULT_PAGE_SIZE: i64 = 10;
/// Hard ceiling on page size; larger requests are rejected, not clamped.
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PagingError {
    #[error("page must be >= 1, got {0}")]
    InvalidPage(i64),
    #[error("size must be between 1 and {MAX_PAGE_SIZE}, got {0}")]
    InvalidSize(i64),
}

/// A validated pagination window: 1-based `page`, bounded `size`.
///
/// Construction is the single validation point; once a `PageRequest` exists
/// its `offset`/`limit` are guaranteed non-negative and bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    size: i64,
}

impl PageRequest {
    /// Validates `page >= 1` and `1 <= size <= MAX_PAGE_SIZE`.
    ///
    /// # Errors
    ///
    /// Returns [`PagingError`] when either bound is violated.
    pub fn new(page: i64, size: i64) -> Result<Self, PagingError> {
        if page < 1 {
            return Err(PagingError::InvalidPage(page));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&size) {
            return Err(PagingError::InvalidSize(size));
        }
        Ok(Self { page, size })
    }

    #[must_use]
    pub fn page(self) -> i64 {
        self.page
    }

    /// Number of records to skip before the window starts.
    ///
    /// Saturates at `i64::MAX` for absurdly large pages; the window is past
    /// the end of any result set either way, so the query returns no rows.
    #[must_use]
    pub fn offset(self) -> i64 {
        (self.page - 1).saturating_mul(self.size)
    }

    /// Maximum number of records in the window.
    #[must_use]
    pub fn limit(self) -> i64 {
        self.size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}
