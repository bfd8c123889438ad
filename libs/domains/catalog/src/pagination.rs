//! Page parameter validation and total-page arithmetic.
//!
//! Paging is validated before any query runs. Totals are always computed
//! from the count of items matching the active filter, never from the
//! unfiltered collection size.

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::error::{CatalogError, CatalogResult};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Paging query parameters shared by all listing endpoints
#[derive(Debug, Clone, Copy, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    /// 1-based page number
    #[serde(default = "default_page")]
    pub page: i64,
    /// Number of items per page
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn default_page() -> i64 {
    DEFAULT_PAGE
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Validated offset/limit pair ready to hand to a repository
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBounds {
    pub offset: u64,
    pub limit: u64,
}

impl PageParams {
    /// Validate the parameters and compute offset/limit.
    ///
    /// `page <= 0` or `pageSize <= 0` is a client error, rejected here so
    /// that no query is ever issued for invalid paging input.
    pub fn bounds(&self) -> CatalogResult<PageBounds> {
        if self.page <= 0 || self.page_size <= 0 {
            return Err(CatalogError::InvalidArgument(
                "page and pageSize must be positive integers".to_string(),
            ));
        }

        let offset = (self.page - 1).saturating_mul(self.page_size);
        Ok(PageBounds {
            offset: offset as u64,
            limit: self.page_size as u64,
        })
    }
}

/// Total page count for a filtered item count: ceiling division.
///
/// Zero matching items means zero pages; a page request beyond the end is
/// served as an empty page, not an error.
pub fn total_pages(filtered_count: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 0;
    }
    filtered_count.div_ceil(page_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = PageParams::default();
        assert_eq!(params.page, 1);
        assert_eq!(params.page_size, 10);

        let bounds = params.bounds().unwrap();
        assert_eq!(bounds.offset, 0);
        assert_eq!(bounds.limit, 10);
    }

    #[test]
    fn test_offset_is_page_minus_one_times_size() {
        let bounds = PageParams { page: 3, page_size: 10 }.bounds().unwrap();
        assert_eq!(bounds.offset, 20);
        assert_eq!(bounds.limit, 10);

        let bounds = PageParams { page: 7, page_size: 25 }.bounds().unwrap();
        assert_eq!(bounds.offset, 150);
        assert_eq!(bounds.limit, 25);
    }

    #[test]
    fn test_non_positive_page_is_rejected() {
        for (page, page_size) in [(0, 10), (-1, 10), (1, 0), (1, -5), (0, 0)] {
            let result = PageParams { page, page_size }.bounds();
            assert!(
                matches!(result, Err(CatalogError::InvalidArgument(_))),
                "page={page} pageSize={page_size} should be rejected"
            );
        }
    }

    #[test]
    fn test_huge_page_does_not_overflow() {
        let bounds = PageParams {
            page: i64::MAX,
            page_size: i64::MAX,
        }
        .bounds()
        .unwrap();
        assert_eq!(bounds.offset, i64::MAX as u64);
    }

    #[test]
    fn test_total_pages_is_ceiling_division() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(25, 10), 3);
        assert_eq!(total_pages(30, 10), 3);
        assert_eq!(total_pages(31, 10), 4);
    }

    #[test]
    fn test_deserializes_camel_case_page_size() {
        let params: PageParams =
            serde_json::from_str(r#"{"page": 2, "pageSize": 5}"#).unwrap();
        assert_eq!(params.page, 2);
        assert_eq!(params.page_size, 5);

        // Missing fields fall back to defaults
        let params: PageParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.page, 1);
        assert_eq!(params.page_size, 10);
    }
}
