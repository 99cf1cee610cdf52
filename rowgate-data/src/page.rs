use serde::{Deserialize, Serialize};

use crate::error::DataError;

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    10
}

/// Pagination parameters as they arrive from a caller (1-based).
///
/// Kept signed so that `0` and negative values reach validation instead of
/// failing deserialization with an opaque error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PageRequest {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size", alias = "pageSize")]
    pub page_size: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

impl PageRequest {
    pub fn new(page: i64, page_size: i64) -> Self {
        Self { page, page_size }
    }

    /// Reject non-positive values and compute the slice bounds.
    pub fn validate(&self) -> Result<PageWindow, DataError> {
        let invalid = || DataError::InvalidPageRequest {
            page: self.page,
            page_size: self.page_size,
        };
        if self.page < 1 || self.page_size < 1 {
            return Err(invalid());
        }
        let page = self.page as u64;
        let page_size = self.page_size as u64;
        let offset = (page - 1).checked_mul(page_size).ok_or_else(invalid)?;
        Ok(PageWindow {
            page,
            page_size,
            offset,
        })
    }
}

/// A validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u64,
    pub page_size: u64,
    pub offset: u64,
}

/// A page of results with pagination metadata.
///
/// `filtered_total` counts every record matching the filter, independent of
/// the slice; `unfiltered_total` counts the whole collection.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub filtered_total: u64,
    pub unfiltered_total: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(
        items: Vec<T>,
        window: &PageWindow,
        filtered_total: u64,
        unfiltered_total: u64,
    ) -> Self {
        Self {
            items,
            filtered_total,
            unfiltered_total,
            page: window.page,
            page_size: window.page_size,
            total_pages: filtered_total.div_ceil(window.page_size),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            filtered_total: self.filtered_total,
            unfiltered_total: self.unfiltered_total,
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let req: PageRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req, PageRequest::new(1, 10));
        let req: PageRequest = serde_json::from_str(r#"{"page": 3, "pageSize": 25}"#).unwrap();
        assert_eq!(req, PageRequest::new(3, 25));
    }

    #[test]
    fn test_offset() {
        let window = PageRequest::new(2, 5).validate().unwrap();
        assert_eq!(window.offset, 5);
        assert_eq!(PageRequest::new(1, 10).validate().unwrap().offset, 0);
    }

    #[test]
    fn test_rejects_non_positive() {
        for (page, size) in [(0, 10), (1, 0), (-1, 10), (1, -5)] {
            let err = PageRequest::new(page, size).validate().unwrap_err();
            assert!(matches!(err, DataError::InvalidPageRequest { .. }), "{page}/{size}");
        }
    }

    #[test]
    fn test_rejects_offset_overflow() {
        let err = PageRequest::new(i64::MAX, i64::MAX).validate().unwrap_err();
        assert!(matches!(err, DataError::InvalidPageRequest { .. }));
    }

    #[test]
    fn test_total_pages() {
        let window = PageRequest::new(1, 5).validate().unwrap();
        assert_eq!(Page::new(vec![1, 2], &window, 12, 40).total_pages, 3);
        assert_eq!(Page::<i32>::new(vec![], &window, 0, 40).total_pages, 0);
    }
}
