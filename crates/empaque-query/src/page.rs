// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: usize = 12;
pub const MAX_PAGE_SIZE: usize = 100;

/// 1-based page request. Construction clamps rather than errors: page 0
/// becomes page 1 and oversized page sizes fold down to [`MAX_PAGE_SIZE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: usize,
    pub per_page: usize,
}

impl PageRequest {
    #[must_use]
    pub fn new(page: usize, per_page: usize) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, MAX_PAGE_SIZE),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

/// Slice one page out of an already ordered list. A page past the end is
/// empty, not an error; `total_pages` is at least 1 so the storefront's
/// pager always has something to render. Requests built by hand through
/// the pub fields get the same clamps as [`PageRequest::new`].
#[must_use]
pub fn paginate<T>(items: Vec<T>, request: PageRequest) -> Page<T> {
    let page = request.page.max(1);
    let per_page = request.per_page.clamp(1, MAX_PAGE_SIZE);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page).max(1);
    let start = (page - 1).saturating_mul(per_page);
    let items: Vec<T> = items.into_iter().skip(start).take(per_page).collect();
    Page {
        items,
        page,
        per_page,
        total_items,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn slices_are_contiguous_and_exhaustive() {
        let items: Vec<u32> = (0..25).collect();
        let mut seen = Vec::new();
        for page in 1..=3 {
            let p = paginate(items.clone(), PageRequest::new(page, 10));
            assert_eq!(p.total_items, 25);
            assert_eq!(p.total_pages, 3);
            seen.extend(p.items);
        }
        assert_eq!(seen, items);
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let p = paginate(vec![1, 2, 3], PageRequest::new(9, 10));
        assert!(p.items.is_empty());
        assert_eq!(p.total_items, 3);
        assert_eq!(p.total_pages, 1);
    }

    #[test]
    fn empty_list_still_reports_one_page() {
        let p = paginate(Vec::<u32>::new(), PageRequest::default());
        assert!(p.items.is_empty());
        assert_eq!(p.total_pages, 1);
    }

    #[test]
    fn hand_built_zero_request_does_not_underflow() {
        let p = paginate(vec![1, 2, 3], PageRequest { page: 0, per_page: 0 });
        assert_eq!(p.page, 1);
        assert_eq!(p.per_page, 1);
        assert_eq!(p.items, vec![1]);
        assert_eq!(p.total_pages, 3);
    }

    #[test]
    fn request_clamps_instead_of_failing() {
        let r = PageRequest::new(0, 0);
        assert_eq!(r.page, 1);
        assert_eq!(r.per_page, 1);
        let r = PageRequest::new(2, 10_000);
        assert_eq!(r.per_page, MAX_PAGE_SIZE);
    }

    proptest! {
        #[test]
        fn pages_partition_the_list(len in 0usize..400, per_page in 1usize..=MAX_PAGE_SIZE) {
            let items: Vec<usize> = (0..len).collect();
            let total_pages = paginate(items.clone(), PageRequest::new(1, per_page)).total_pages;
            let mut seen = Vec::new();
            for page in 1..=total_pages {
                seen.extend(paginate(items.clone(), PageRequest::new(page, per_page)).items);
            }
            prop_assert_eq!(seen, items);
        }
    }
}
