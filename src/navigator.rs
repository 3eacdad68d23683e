//! Single-image viewer selection and its keyboard navigation.
//!
//! The selection is a weak reference by id into the currently loaded page. The
//! position is looked up again on every move, so a page that was re-fetched
//! underneath the viewer can never leave a stale index behind.

use eframe::egui;

use crate::models::ImageSummary;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ViewerState {
    #[default]
    Grid,
    Viewing { selected_id: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavKey {
    Prev,
    Next,
    Close,
}

/// Keyboard input scoped to the Viewing state. It only exists while an image is open.
#[derive(Debug)]
pub struct KeySubscription {
    bindings: [(egui::Key, NavKey); 3],
}

impl KeySubscription {
    fn attach() -> Self {
        Self {
            bindings: [
                (egui::Key::ArrowLeft, NavKey::Prev),
                (egui::Key::ArrowRight, NavKey::Next),
                (egui::Key::Escape, NavKey::Close),
            ],
        }
    }

    pub fn poll(&self, ctx: &egui::Context) -> Vec<NavKey> {
        ctx.input(|i| {
            self.bindings
                .iter()
                .filter(|(key, _)| i.key_pressed(*key))
                .map(|(_, nav)| *nav)
                .collect()
        })
    }
}

/// Position of `id` in the page, found by linear search.
pub fn resolve_index(images: &[ImageSummary], id: &str) -> Option<usize> {
    images.iter().position(|image| image.id == id)
}

#[derive(Debug, Default)]
pub struct Navigator {
    state: ViewerState,
    keys: Option<KeySubscription>,
}

impl Navigator {
    pub fn selected_id(&self) -> Option<&str> {
        match &self.state {
            ViewerState::Grid => None,
            ViewerState::Viewing { selected_id } => Some(selected_id),
        }
    }

    pub fn is_viewing(&self) -> bool {
        matches!(self.state, ViewerState::Viewing { .. })
    }

    pub fn is_listening(&self) -> bool {
        self.keys.is_some()
    }

    pub fn current_index(&self, images: &[ImageSummary]) -> Option<usize> {
        self.selected_id().and_then(|id| resolve_index(images, id))
    }

    /// Open `id` if it is part of the current page; otherwise nothing happens.
    pub fn select(&mut self, id: &str, images: &[ImageSummary]) -> bool {
        if resolve_index(images, id).is_none() {
            return false;
        }
        self.state = ViewerState::Viewing {
            selected_id: id.to_string(),
        };
        if self.keys.is_none() {
            self.keys = Some(KeySubscription::attach());
        }
        true
    }

    pub fn close(&mut self) {
        self.state = ViewerState::Grid;
        self.keys = None;
    }

    pub fn prev(&mut self, images: &[ImageSummary]) {
        let Some(index) = self.current_index(images) else {
            return;
        };
        if index > 0 {
            self.state = ViewerState::Viewing {
                selected_id: images[index - 1].id.clone(),
            };
        }
    }

    pub fn next(&mut self, images: &[ImageSummary]) {
        let Some(index) = self.current_index(images) else {
            return;
        };
        if index + 1 < images.len() {
            self.state = ViewerState::Viewing {
                selected_id: images[index + 1].id.clone(),
            };
        }
    }

    pub fn handle_key(&mut self, key: NavKey, images: &[ImageSummary]) {
        if !self.is_viewing() {
            return;
        }
        match key {
            NavKey::Prev => self.prev(images),
            NavKey::Next => self.next(images),
            NavKey::Close => self.close(),
        }
    }

    /// Drain key presses while an image is open. Does nothing in grid mode.
    pub fn poll_keys(&mut self, ctx: &egui::Context, images: &[ImageSummary]) {
        let Some(keys) = &self.keys else {
            return;
        };
        for key in keys.poll(ctx) {
            self.handle_key(key, images);
        }
    }

    /// Drop a selection that no longer exists in a freshly applied page.
    pub fn reconcile(&mut self, images: &[ImageSummary]) -> bool {
        if self.is_viewing() && self.current_index(images).is_none() {
            self.close();
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(ids: impl IntoIterator<Item = String>) -> Vec<ImageSummary> {
        ids.into_iter()
            .map(|id| ImageSummary {
                filename: format!("{id}.jpg"),
                id,
                width: 640,
                height: 480,
                split: None,
                annotations: Vec::new(),
            })
            .collect()
    }

    fn numbered(count: usize) -> Vec<ImageSummary> {
        page((0..count).map(|i| format!("img_{i:02}")))
    }

    #[test]
    fn select_unknown_id_is_a_noop() {
        let images = numbered(3);
        let mut nav = Navigator::default();
        assert!(!nav.select("missing", &images));
        assert!(!nav.is_viewing());
        assert!(!nav.is_listening());
    }

    #[test]
    fn keyboard_subscription_follows_viewing_state() {
        let images = numbered(3);
        let mut nav = Navigator::default();
        assert!(nav.select("img_01", &images));
        assert!(nav.is_listening());
        nav.handle_key(NavKey::Close, &images);
        assert!(!nav.is_viewing());
        assert!(!nav.is_listening());
    }

    #[test]
    fn prev_at_start_and_next_at_end_do_nothing() {
        let images = numbered(4);
        let mut nav = Navigator::default();
        nav.select("img_00", &images);
        nav.prev(&images);
        assert_eq!(nav.selected_id(), Some("img_00"));

        nav.select("img_03", &images);
        nav.next(&images);
        assert_eq!(nav.selected_id(), Some("img_03"));
    }

    #[test]
    fn three_forward_one_back_lands_two_ahead() {
        let images = numbered(24);
        let mut nav = Navigator::default();
        nav.select("img_07", &images);
        for _ in 0..3 {
            nav.handle_key(NavKey::Next, &images);
        }
        nav.handle_key(NavKey::Prev, &images);
        assert_eq!(nav.selected_id(), Some("img_09"));
        assert_eq!(nav.current_index(&images), Some(9));
    }

    #[test]
    fn index_is_resolved_against_the_reloaded_page() {
        let first = numbered(5);
        let mut nav = Navigator::default();
        nav.select("img_02", &first);

        // Same image, different neighbours after a refresh.
        let reloaded = page(["x", "img_02", "y"].map(String::from));
        nav.next(&reloaded);
        assert_eq!(nav.selected_id(), Some("y"));
    }

    #[test]
    fn reconcile_clears_vanished_selection() {
        let images = numbered(3);
        let mut nav = Navigator::default();
        nav.select("img_01", &images);
        assert!(!nav.reconcile(&images));

        let other = page(["a", "b"].map(String::from));
        assert!(nav.reconcile(&other));
        assert!(!nav.is_viewing());
        assert!(!nav.is_listening());
    }

    #[test]
    fn keys_are_ignored_in_grid_mode() {
        let images = numbered(3);
        let mut nav = Navigator::default();
        nav.handle_key(NavKey::Next, &images);
        assert!(!nav.is_viewing());
    }
}
