//! Filter and pagination state for the image listing.
//!
//! `QueryState` is the single owner of what the explorer asks the backend for.
//! Every filter edit restarts pagination at page 1, and the page is clamped to
//! the known page count whenever the total changes.

use crate::error::FilterError;

pub const DEFAULT_PAGE_SIZE: u32 = 24;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterField {
    Class,
    Split,
    MinBoxes,
    MaxBoxes,
}

/// Parse free-text numeric input. Empty, non-numeric and negative text all mean
/// "leave it out of the query".
pub fn parse_optional_int(text: &str) -> Option<u32> {
    text.trim().parse::<u32>().ok()
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterState {
    pub class_filter: Option<String>,
    pub split_filter: Option<String>,
    /// Raw text as typed; parsed on every query derivation.
    pub min_boxes: String,
    pub max_boxes: String,
}

impl FilterState {
    pub fn min_boxes(&self) -> Option<u32> {
        parse_optional_int(&self.min_boxes)
    }

    pub fn max_boxes(&self) -> Option<u32> {
        parse_optional_int(&self.max_boxes)
    }

    pub fn range_issue(&self) -> Option<FilterError> {
        match (self.min_boxes(), self.max_boxes()) {
            (Some(min), Some(max)) if min > max => Some(FilterError::InvertedBoxRange { min, max }),
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.class_filter.is_some()
            || self.split_filter.is_some()
            || self.min_boxes().is_some()
            || self.max_boxes().is_some()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageState {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
}

impl PageState {
    pub fn new(limit: u32) -> Self {
        Self {
            page: 1,
            limit: limit.max(1),
            total: 0,
        }
    }

    pub fn total_pages(&self) -> u32 {
        let pages = self.total.div_ceil(u64::from(self.limit));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    pub fn max_page(&self) -> u32 {
        self.total_pages().max(1)
    }

    fn clamp(&self, page: u32) -> u32 {
        page.clamp(1, self.max_page())
    }
}

/// The backend listing request derived from the current filters and page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageQuery {
    pub page: u32,
    pub limit: u32,
    pub class_filter: Option<String>,
    pub split_filter: Option<String>,
    pub min_boxes: Option<u32>,
    pub max_boxes: Option<u32>,
}

impl ImageQuery {
    /// Query-string pairs; absent filters are omitted rather than sent empty.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("page", self.page.to_string()), ("limit", self.limit.to_string())];
        if let Some(class) = &self.class_filter {
            pairs.push(("class_filter", class.clone()));
        }
        if let Some(split) = &self.split_filter {
            pairs.push(("split_filter", split.clone()));
        }
        if let Some(min) = self.min_boxes {
            pairs.push(("min_boxes", min.to_string()));
        }
        if let Some(max) = self.max_boxes {
            pairs.push(("max_boxes", max.to_string()));
        }
        pairs
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct QueryState {
    filters: FilterState,
    pages: PageState,
}

impl Default for QueryState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl QueryState {
    pub fn new(limit: u32) -> Self {
        Self {
            filters: FilterState::default(),
            pages: PageState::new(limit),
        }
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn page(&self) -> u32 {
        self.pages.page
    }

    pub fn total_pages(&self) -> u32 {
        self.pages.total_pages()
    }

    /// Update one filter. Always restarts pagination, even if the value is unchanged.
    pub fn set_filter(&mut self, field: FilterField, value: &str) {
        let choice = || {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };
        match field {
            FilterField::Class => self.filters.class_filter = choice(),
            FilterField::Split => self.filters.split_filter = choice(),
            FilterField::MinBoxes => self.filters.min_boxes = value.to_string(),
            FilterField::MaxBoxes => self.filters.max_boxes = value.to_string(),
        }
        self.pages.page = 1;
    }

    pub fn clear_filters(&mut self) {
        self.filters = FilterState::default();
        self.pages.page = 1;
    }

    /// Request a page; out-of-range requests clamp to `[1, max(1, total_pages)]`.
    pub fn set_page(&mut self, page: u32) {
        self.pages.page = self.pages.clamp(page);
    }

    pub fn next_page(&mut self) {
        self.set_page(self.pages.page.saturating_add(1));
    }

    pub fn prev_page(&mut self) {
        self.set_page(self.pages.page.saturating_sub(1));
    }

    /// Record the backend's match count. Returns true if the page had to move.
    pub fn set_total(&mut self, total: u64) -> bool {
        self.pages.total = total;
        let clamped = self.pages.clamp(self.pages.page);
        let moved = clamped != self.pages.page;
        self.pages.page = clamped;
        moved
    }

    pub fn current_query(&self) -> ImageQuery {
        ImageQuery {
            page: self.pages.page,
            limit: self.pages.limit,
            class_filter: self.filters.class_filter.clone(),
            split_filter: self.filters.split_filter.clone(),
            min_boxes: self.filters.min_boxes(),
            max_boxes: self.filters.max_boxes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_total(total: u64) -> QueryState {
        let mut state = QueryState::new(24);
        state.set_total(total);
        state
    }

    #[test]
    fn parse_optional_int_omits_garbage() {
        assert_eq!(parse_optional_int("12"), Some(12));
        assert_eq!(parse_optional_int(" 3 "), Some(3));
        assert_eq!(parse_optional_int(""), None);
        assert_eq!(parse_optional_int("abc"), None);
        assert_eq!(parse_optional_int("-2"), None);
        assert_eq!(parse_optional_int("1.5"), None);
    }

    #[test]
    fn every_filter_mutation_restarts_at_page_one() {
        let fields = [
            (FilterField::Class, "dog"),
            (FilterField::Split, "val"),
            (FilterField::MinBoxes, "2"),
            (FilterField::MaxBoxes, "oops"),
            (FilterField::Class, ""),
        ];
        for (field, value) in fields {
            let mut state = with_total(500);
            state.set_page(7);
            assert_eq!(state.page(), 7);
            state.set_filter(field, value);
            assert_eq!(state.page(), 1, "{field:?}={value}");
        }
    }

    #[test]
    fn class_filter_on_page_four_queries_page_one() {
        let mut state = with_total(200);
        state.set_page(4);
        state.set_filter(FilterField::Class, "dog");
        let query = state.current_query();
        assert_eq!(query.page, 1);
        assert_eq!(query.class_filter.as_deref(), Some("dog"));
    }

    #[test]
    fn total_pages_is_ceiling_division() {
        for (total, limit, expected) in [(0, 24, 0), (1, 24, 1), (24, 24, 1), (25, 24, 2), (50, 24, 3), (7, 1, 7)] {
            let mut state = QueryState::new(limit);
            state.set_total(total);
            assert_eq!(state.total_pages(), expected, "total={total} limit={limit}");
        }
    }

    #[test]
    fn page_request_beyond_last_clamps() {
        let mut state = with_total(50);
        assert_eq!(state.total_pages(), 3);
        state.set_page(5);
        assert_eq!(state.page(), 3);
        state.set_page(0);
        assert_eq!(state.page(), 1);
    }

    #[test]
    fn shrinking_total_pulls_page_back() {
        let mut state = with_total(240);
        state.set_page(10);
        assert!(state.set_total(30));
        assert_eq!(state.page(), 2);
        assert!(!state.set_total(30));
        assert!(state.set_total(0));
        assert_eq!(state.page(), 1);
    }

    #[test]
    fn invalid_numbers_are_left_out_of_the_query() {
        let mut state = with_total(10);
        state.set_filter(FilterField::MinBoxes, "x");
        state.set_filter(FilterField::MaxBoxes, "");
        let pairs = state.current_query().to_pairs();
        assert_eq!(pairs, vec![("page", "1".to_string()), ("limit", "24".to_string())]);
    }

    #[test]
    fn inverted_range_is_reported_but_still_queried() {
        let mut state = with_total(10);
        state.set_filter(FilterField::MinBoxes, "5");
        state.set_filter(FilterField::MaxBoxes, "2");
        assert_eq!(
            state.filters().range_issue(),
            Some(FilterError::InvertedBoxRange { min: 5, max: 2 })
        );
        let query = state.current_query();
        assert_eq!((query.min_boxes, query.max_boxes), (Some(5), Some(2)));
    }
}
