//! Application services
//!
//! Each service combines the commute core with the repositories for one
//! area of the API. Services are cheap to clone and shared across requests.

pub mod commute;
pub mod favorites;
pub mod housing;
pub mod users;

use serde::{Deserialize, Serialize};

use crate::config::SearchConfig;

pub use commute::CommuteService;
pub use favorites::{FavoriteService, FavoriteWithHousing};
pub use housing::{HousingService, NearbyHousing};
pub use users::UserService;

/// Requested page of a listing result, 1-based
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageRequest {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl PageRequest {
    /// Page number and size with defaults applied. Page 0 is read as page 1
    /// and sizes are capped at the configured maximum.
    #[must_use]
    pub fn resolve(&self, search: &SearchConfig) -> (u32, u32) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self
            .per_page
            .unwrap_or(search.default_per_page)
            .clamp(1, search.max_per_page.max(1));
        (page, per_page)
    }
}

/// One page of results plus the numbers a client needs to navigate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: usize,
    pub pages: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> Page<T> {
    /// Cut page `page` of size `per_page` out of the full result list
    #[must_use]
    pub fn paginate(all: Vec<T>, page: u32, per_page: u32) -> Self {
        let total = all.len();
        let size = per_page.max(1) as usize;
        let pages = total.div_ceil(size);
        let start = (page.max(1) as usize - 1).saturating_mul(size);

        let items: Vec<T> = all.into_iter().skip(start).take(size).collect();

        Self {
            items,
            page,
            per_page,
            total,
            pages,
            has_next: (page as usize) < pages,
            has_prev: page > 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, 2, vec![1, 2], false, true)]
    #[case(2, 2, vec![3, 4], true, true)]
    #[case(3, 2, vec![5], true, false)]
    #[case(4, 2, vec![], true, false)]
    fn test_paginate(
        #[case] page: u32,
        #[case] per_page: u32,
        #[case] expected: Vec<i32>,
        #[case] has_prev: bool,
        #[case] has_next: bool,
    ) {
        let result = Page::paginate(vec![1, 2, 3, 4, 5], page, per_page);
        assert_eq!(result.items, expected);
        assert_eq!(result.total, 5);
        assert_eq!(result.pages, 3);
        assert_eq!(result.has_next, has_next);
        assert_eq!(result.has_prev, has_prev);
    }

    #[test]
    fn test_paginate_empty() {
        let result: Page<i32> = Page::paginate(Vec::new(), 1, 20);
        assert_eq!(result.pages, 0);
        assert!(!result.has_next);
        assert!(!result.has_prev);
    }

    #[test]
    fn test_page_request_resolve() {
        let search = SearchConfig::default();
        assert_eq!(PageRequest::default().resolve(&search), (1, 20));

        let request = PageRequest {
            page: Some(0),
            per_page: Some(10_000),
        };
        assert_eq!(request.resolve(&search), (1, 100));
    }
}
