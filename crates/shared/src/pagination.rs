//! Offset pagination helpers.

use serde::{Deserialize, Serialize};

/// Default page size for list endpoints.
pub const DEFAULT_PER_PAGE: i64 = 20;

/// Largest page size a client may request.
pub const MAX_PER_PAGE: i64 = 100;

/// Normalized page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl PageRequest {
    /// Clamps raw query values into a usable page request.
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        }
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    /// Saturates instead of overflowing; a huge page is simply empty.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Pagination metadata returned with list responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(request: PageRequest, total: i64) -> Self {
        let total_pages = if total <= 0 {
            0
        } else {
            (total + request.per_page - 1) / request.per_page
        };
        Self {
            page: request.page,
            per_page: request.per_page,
            total,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let req = PageRequest::default();
        assert_eq!(req.page, 1);
        assert_eq!(req.per_page, DEFAULT_PER_PAGE);
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn test_clamping() {
        let req = PageRequest::new(Some(0), Some(1000));
        assert_eq!(req.page, 1);
        assert_eq!(req.per_page, MAX_PER_PAGE);

        let req = PageRequest::new(Some(-3), Some(0));
        assert_eq!(req.page, 1);
        assert_eq!(req.per_page, 1);
    }

    #[test]
    fn test_offset() {
        let req = PageRequest::new(Some(3), Some(10));
        assert_eq!(req.limit(), 10);
        assert_eq!(req.offset(), 20);
    }

    #[test]
    fn test_offset_of_huge_page_saturates() {
        let req = PageRequest::new(Some(i64::MAX), Some(20));
        assert_eq!(req.offset(), i64::MAX);

        let req = PageRequest::new(Some(i64::MAX), Some(1));
        assert_eq!(req.offset(), i64::MAX - 1);
    }

    #[test]
    fn test_total_pages() {
        let req = PageRequest::new(Some(1), Some(10));
        assert_eq!(Pagination::new(req, 0).total_pages, 0);
        assert_eq!(Pagination::new(req, 10).total_pages, 1);
        assert_eq!(Pagination::new(req, 11).total_pages, 2);
    }
}
