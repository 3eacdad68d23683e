//! State of the paged image grid: the current page of summaries and the
//! latest-request-wins bookkeeping for listing fetches.

use tracing::{debug, warn};

use crate::error::ApiError;
use crate::models::{ImagePage, ImageSummary};
use crate::query::ImageQuery;

/// Stamp for an issued request; only the latest one may be applied. The
/// session generation keeps tokens from an earlier dataset from ever matching.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken {
    generation: u64,
    seq: u64,
}

#[derive(Debug, PartialEq)]
pub enum GridUpdate {
    Applied { total: u64 },
    Failed,
    Stale,
}

#[derive(Debug, Default)]
pub struct ImageGrid {
    images: Vec<ImageSummary>,
    total: u64,
    loaded_once: bool,
    loading: bool,
    error: Option<String>,
    latest: RequestToken,
    last_issued: Option<ImageQuery>,
}

impl ImageGrid {
    /// Grid for the session identified by `generation`.
    pub fn new(generation: u64) -> Self {
        Self {
            latest: RequestToken { generation, seq: 0 },
            ..Self::default()
        }
    }

    pub fn images(&self) -> &[ImageSummary] {
        &self.images
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Zero matches after a successful load; rendered as an explicit empty state.
    pub fn is_empty_result(&self) -> bool {
        self.loaded_once && self.error.is_none() && self.images.is_empty()
    }

    /// True when `query` differs from the last one a fetch was issued for.
    pub fn needs_fetch(&self, query: &ImageQuery) -> bool {
        self.last_issued.as_ref() != Some(query)
    }

    /// Mark a fetch for `query` as in flight. The current images stay visible.
    pub fn begin_load(&mut self, query: &ImageQuery) -> RequestToken {
        self.latest.seq += 1;
        self.last_issued = Some(query.clone());
        self.loading = true;
        debug!(
            generation = self.latest.generation,
            seq = self.latest.seq,
            page = query.page,
            "issuing image listing request"
        );
        self.latest
    }

    pub fn apply(&mut self, token: RequestToken, result: Result<ImagePage, ApiError>) -> GridUpdate {
        if token != self.latest {
            debug!(?token, latest = ?self.latest, "discarding stale image listing");
            return GridUpdate::Stale;
        }
        self.loading = false;
        match result {
            Ok(page) => {
                self.images = page.images;
                self.total = page.total;
                self.loaded_once = true;
                self.error = None;
                GridUpdate::Applied { total: page.total }
            }
            Err(err) => {
                warn!("Failed to load images: {err}");
                self.error = Some(err.to_string());
                GridUpdate::Failed
            }
        }
    }

    /// Forget the last issued query so the next frame fetches again.
    pub fn invalidate(&mut self) {
        self.last_issued = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{FilterField, QueryState};

    fn listing(ids: &[&str], total: u64) -> ImagePage {
        ImagePage {
            images: ids
                .iter()
                .map(|id| ImageSummary {
                    id: id.to_string(),
                    filename: format!("{id}.jpg"),
                    width: 100,
                    height: 100,
                    split: Some("train".to_string()),
                    annotations: Vec::new(),
                })
                .collect(),
            total,
        }
    }

    fn ids(grid: &ImageGrid) -> Vec<&str> {
        grid.images().iter().map(|image| image.id.as_str()).collect()
    }

    #[test]
    fn late_response_to_older_query_is_discarded() {
        let mut state = QueryState::default();
        let mut grid = ImageGrid::default();
        let q1 = state.current_query();
        let t1 = grid.begin_load(&q1);
        state.set_filter(FilterField::Class, "dog");
        let q2 = state.current_query();
        let t2 = grid.begin_load(&q2);

        assert_eq!(grid.apply(t2, Ok(listing(&["dog_1"], 1))), GridUpdate::Applied { total: 1 });
        assert_eq!(grid.apply(t1, Ok(listing(&["any_1", "any_2"], 2))), GridUpdate::Stale);
        assert_eq!(ids(&grid), ["dog_1"]);
        assert_eq!(grid.total(), 1);
        assert!(!grid.is_loading());
    }

    #[test]
    fn early_response_to_older_query_is_also_discarded() {
        let mut grid = ImageGrid::default();
        let query = QueryState::default().current_query();
        let t1 = grid.begin_load(&query);
        let t2 = grid.begin_load(&query);
        assert_eq!(grid.apply(t1, Ok(listing(&["old"], 1))), GridUpdate::Stale);
        assert!(grid.is_loading());
        grid.apply(t2, Ok(listing(&["new"], 1)));
        assert_eq!(ids(&grid), ["new"]);
    }

    #[test]
    fn tokens_from_another_session_never_apply() {
        let query = QueryState::default().current_query();
        let mut old_grid = ImageGrid::new(1);
        let old_token = old_grid.begin_load(&query);
        let mut grid = ImageGrid::new(2);
        let token = grid.begin_load(&query);
        assert_ne!(old_token, token);

        grid.apply(token, Ok(listing(&["b_img"], 1)));
        assert_eq!(grid.apply(old_token, Ok(listing(&["a_img"], 1))), GridUpdate::Stale);
        assert_eq!(ids(&grid), ["b_img"]);
    }

    #[test]
    fn previous_page_stays_visible_while_loading() {
        let mut grid = ImageGrid::default();
        let mut state = QueryState::default();
        let token = grid.begin_load(&state.current_query());
        grid.apply(token, Ok(listing(&["a", "b"], 30)));
        state.set_total(30);
        state.set_page(2);
        grid.begin_load(&state.current_query());
        assert!(grid.is_loading());
        assert_eq!(ids(&grid), ["a", "b"]);
    }

    #[test]
    fn failure_keeps_images_and_reports_unavailable() {
        let mut grid = ImageGrid::default();
        let query = QueryState::default().current_query();
        let token = grid.begin_load(&query);
        grid.apply(token, Ok(listing(&["a"], 1)));
        let token = grid.begin_load(&query);
        let update = grid.apply(token, Err(ApiError::Network("connection refused".into())));
        assert_eq!(update, GridUpdate::Failed);
        assert_eq!(ids(&grid), ["a"]);
        assert!(grid.error().is_some_and(|msg| msg.contains("connection refused")));
    }

    #[test]
    fn fetch_is_needed_only_when_query_changes() {
        let mut state = QueryState::default();
        let mut grid = ImageGrid::default();
        assert!(grid.needs_fetch(&state.current_query()));
        grid.begin_load(&state.current_query());
        assert!(!grid.needs_fetch(&state.current_query()));
        state.set_filter(FilterField::Split, "val");
        assert!(grid.needs_fetch(&state.current_query()));
        grid.begin_load(&state.current_query());
        grid.invalidate();
        assert!(grid.needs_fetch(&state.current_query()));
    }

    #[test]
    fn zero_matches_is_an_empty_state_not_an_error() {
        let mut grid = ImageGrid::default();
        assert!(!grid.is_empty_result());
        let token = grid.begin_load(&QueryState::default().current_query());
        grid.apply(token, Ok(listing(&[], 0)));
        assert!(grid.is_empty_result());
        assert_eq!(grid.error(), None);
    }
}
