//! Offset/limit windowing shared by every list endpoint.

use serde::{Deserialize, Serialize};

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 100;

/// Raw `?page=&limit=` query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// A resolved pagination window. Page is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl PageQuery {
    pub fn resolve(&self) -> Pagination {
        let page = self.page.unwrap_or(DEFAULT_PAGE).max(1);
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        Pagination { page, limit }
    }
}

impl Pagination {
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

/// Window summary returned alongside every list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub current: i64,
    pub pages: i64,
    pub total: i64,
}

impl PageInfo {
    /// `pages` is ceil(total / limit); 0 when the collection is empty.
    /// `current` echoes the requested page even past the end.
    pub fn new(pagination: Pagination, total: i64) -> Self {
        let pages = if total == 0 {
            0
        } else {
            (total + pagination.limit - 1) / pagination.limit
        };

        PageInfo {
            current: pagination.page,
            pages,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = PageQuery::default().resolve();
        assert_eq!(p.page, 1);
        assert_eq!(p.limit, 10);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn test_clamping() {
        let p = PageQuery {
            page: Some(0),
            limit: Some(1000),
        }
        .resolve();
        assert_eq!(p.page, 1);
        assert_eq!(p.limit, 100);

        let p = PageQuery {
            page: Some(-3),
            limit: Some(0),
        }
        .resolve();
        assert_eq!(p.page, 1);
        assert_eq!(p.limit, 1);
    }

    #[test]
    fn test_offset_math() {
        let p = PageQuery {
            page: Some(3),
            limit: Some(10),
        }
        .resolve();
        assert_eq!(p.offset(), 20);
    }

    #[test]
    fn test_page_info_ceiling() {
        let p = Pagination { page: 1, limit: 10 };
        assert_eq!(PageInfo::new(p, 0).pages, 0);
        assert_eq!(PageInfo::new(p, 1).pages, 1);
        assert_eq!(PageInfo::new(p, 10).pages, 1);
        assert_eq!(PageInfo::new(p, 11).pages, 2);
    }

    #[test]
    fn test_page_info_echoes_requested_page_past_end() {
        let p = Pagination { page: 9, limit: 10 };
        let info = PageInfo::new(p, 15);
        assert_eq!(info.current, 9);
        assert_eq!(info.pages, 2);
        assert_eq!(info.total, 15);
    }
}
