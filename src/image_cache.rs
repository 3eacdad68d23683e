use std::collections::{HashMap, HashSet};

use crate::models::ImageSummary;

/// Bounded cache of decoded pictures keyed by image id.
///
/// Over capacity, the entry furthest (in page order) from the anchor is evicted;
/// entries not on the current page go first.
#[derive(Debug)]
pub struct ImageCache<T> {
    entries: HashMap<String, T>,
    pending: HashSet<String>,
    failed: HashSet<String>,
    max_size: usize,
}

impl<T> ImageCache<T> {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: HashMap::new(),
            pending: HashSet::new(),
            failed: HashSet::new(),
            max_size: max_size.max(1),
        }
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn is_pending(&self, id: &str) -> bool {
        self.pending.contains(id)
    }

    pub fn is_failed(&self, id: &str) -> bool {
        self.failed.contains(id)
    }

    /// Claim `id` for fetching. Returns false if it is cached, in flight or known broken.
    pub fn mark_pending(&mut self, id: &str) -> bool {
        if self.entries.contains_key(id) || self.pending.contains(id) || self.failed.contains(id) {
            return false;
        }
        self.pending.insert(id.to_string());
        true
    }

    /// Record a failed fetch; `id` is not requested again for this cache's lifetime.
    pub fn mark_failed(&mut self, id: &str) {
        self.pending.remove(id);
        self.failed.insert(id.to_string());
    }

    /// Store a fetched picture. Only ids claimed with `mark_pending` are accepted;
    /// returns false when `value` was dropped.
    pub fn insert(&mut self, id: String, value: T, page: &[ImageSummary], anchor: usize) -> bool {
        if !self.pending.remove(&id) {
            return false;
        }
        self.entries.insert(id.clone(), value);

        while self.entries.len() > self.max_size {
            let furthest = self
                .entries
                .keys()
                .filter(|cached| **cached != id)
                .max_by_key(|cached| {
                    page.iter()
                        .position(|image| &image.id == *cached)
                        .map_or(usize::MAX, |pos| pos.abs_diff(anchor))
                })
                .cloned();
            match furthest {
                Some(path_to_remove) => {
                    self.entries.remove(&path_to_remove);
                }
                None => break,
            }
        }
        true
    }
}

/// Ids of the neighbours of `index` within the current page. Never crosses the page.
pub fn neighbour_ids(page: &[ImageSummary], index: usize) -> Vec<&str> {
    let mut ids = Vec::with_capacity(2);
    if index > 0 {
        if let Some(prev) = page.get(index - 1) {
            ids.push(prev.id.as_str());
        }
    }
    if let Some(next) = page.get(index + 1) {
        ids.push(next.id.as_str());
    }
    ids
}
