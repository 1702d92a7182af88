//! Page arithmetic for `current`/`pageSize` listings

use serde::Serialize;
use utoipa::ToSchema;

pub const DEFAULT_CURRENT: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// A 1-based page request; both fields are always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub current: u64,
    pub page_size: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            current: DEFAULT_CURRENT,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Values that are missing, zero, negative or not numbers fall back to the defaults.
    pub fn new(current: Option<i64>, page_size: Option<i64>) -> Self {
        Self {
            current: positive_or(current, DEFAULT_CURRENT),
            page_size: positive_or(page_size, DEFAULT_PAGE_SIZE),
        }
    }

    /// Parse the raw query-string values.
    pub fn from_raw(current: Option<&str>, page_size: Option<&str>) -> Self {
        let parse = |v: Option<&str>| v.and_then(|s| s.trim().parse::<i64>().ok());
        Self::new(parse(current), parse(page_size))
    }

    pub fn skip(&self) -> u64 {
        (self.current - 1).saturating_mul(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        i64::try_from(self.page_size).unwrap_or(i64::MAX)
    }

    pub fn total_pages(&self, total_items: u64) -> u64 {
        total_items.div_ceil(self.page_size)
    }

    pub fn meta(&self, total_items: u64) -> PageMeta {
        PageMeta {
            current: self.current,
            page_size: self.page_size,
            pages: self.total_pages(total_items),
            total: total_items,
        }
    }
}

fn positive_or(value: Option<i64>, default: u64) -> u64 {
    match value {
        Some(v) if v > 0 => v as u64,
        _ => default,
    }
}

/// Position of a page within the full listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub current: u64,
    pub page_size: u64,
    pub pages: u64,
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_missing_or_invalid_values() {
        assert_eq!(PageRequest::from_raw(None, None), PageRequest::default());
        assert_eq!(
            PageRequest::from_raw(Some("0"), Some("0")),
            PageRequest::default()
        );
        assert_eq!(
            PageRequest::from_raw(Some("-3"), Some("abc")),
            PageRequest::default()
        );
        assert_eq!(
            PageRequest::from_raw(Some(""), Some("-1")),
            PageRequest::default()
        );
    }

    #[test]
    fn test_skip_and_total_pages() {
        let page = PageRequest::from_raw(Some("3"), Some("5"));
        assert_eq!(page.skip(), 10);
        assert_eq!(page.limit(), 5);
        assert_eq!(page.total_pages(11), 3);
        assert_eq!(page.total_pages(10), 2);
        assert_eq!(page.total_pages(0), 0);
    }

    #[test]
    fn test_first_page_skips_nothing() {
        let page = PageRequest::new(Some(1), Some(25));
        assert_eq!(page.skip(), 0);
    }

    #[test]
    fn test_page_size_larger_than_total() {
        let page = PageRequest::new(Some(1), Some(100));
        assert_eq!(page.total_pages(7), 1);
    }

    #[test]
    fn test_meta() {
        let meta = PageRequest::new(Some(2), Some(10)).meta(21);
        assert_eq!(
            meta,
            PageMeta {
                current: 2,
                page_size: 10,
                pages: 3,
                total: 21
            }
        );
    }
}
