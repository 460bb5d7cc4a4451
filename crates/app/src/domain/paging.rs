//! Paging & Sorting

use serde::Serialize;

/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Parse a sort direction; anything other than `asc` (any case) sorts descending.
    #[must_use]
    pub fn parse_lenient(value: &str) -> Self {
        if value.eq_ignore_ascii_case("asc") {
            Self::Asc
        } else {
            Self::Desc
        }
    }

    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// A zero-based page request with a sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest<S> {
    pub page_number: u32,
    pub page_size: u32,
    pub sort_by: S,
    pub sort_order: SortOrder,
}

impl<S> PageRequest<S> {
    /// Page size clamped into `1..=MAX_PAGE_SIZE`.
    #[must_use]
    pub fn limit(&self) -> u32 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }

    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page_number) * u64::from(self.limit())
    }
}

/// One page of results plus the figures a client needs to paginate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page_number: u32,
    pub page_size: u32,
    pub total_elements: u64,
    pub total_pages: u64,
    pub last_page: bool,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new<S>(content: Vec<T>, request: &PageRequest<S>, total_elements: u64) -> Self {
        let page_size = request.limit();
        let total_pages = total_elements.div_ceil(u64::from(page_size));

        Self {
            content,
            page_number: request.page_number,
            page_size,
            total_elements,
            total_pages,
            last_page: u64::from(request.page_number) + 1 >= total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(page_number: u32, page_size: u32) -> PageRequest<()> {
        PageRequest {
            page_number,
            page_size,
            sort_by: (),
            sort_order: SortOrder::Asc,
        }
    }

    #[test]
    fn offset_is_page_number_times_size() {
        assert_eq!(request(0, 10).offset(), 0);
        assert_eq!(request(3, 10).offset(), 30);
    }

    #[test]
    fn page_size_is_clamped() {
        assert_eq!(request(0, 0).limit(), 1);
        assert_eq!(request(0, 5_000).limit(), MAX_PAGE_SIZE);
    }

    #[test]
    fn page_counts_partial_last_page() {
        let page = Page::new(vec![1, 2, 3], &request(2, 10), 23);

        assert_eq!(page.total_pages, 3);
        assert!(page.last_page);
    }

    #[test]
    fn first_of_many_pages_is_not_last() {
        let page = Page::new(vec![1; 10], &request(0, 10), 23);

        assert!(!page.last_page);
    }

    #[test]
    fn empty_result_is_a_single_last_page() {
        let page: Page<u8> = Page::new(Vec::new(), &request(0, 10), 0);

        assert_eq!(page.total_pages, 0);
        assert!(page.last_page);
    }

    #[test]
    fn lenient_order_parsing() {
        assert_eq!(SortOrder::parse_lenient("ASC"), SortOrder::Asc);
        assert_eq!(SortOrder::parse_lenient("desc"), SortOrder::Desc);
        assert_eq!(SortOrder::parse_lenient("sideways"), SortOrder::Desc);
    }
}
