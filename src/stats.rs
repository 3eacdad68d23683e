//! Aggregate statistics snapshots for the loaded dataset.
//!
//! The four panels load independently. Any mix of loading, ready and
//! unavailable panels is a valid state; one failed fetch never blanks the rest.

use tracing::{debug, warn};

use crate::error::ApiError;
use crate::models::{BoxStats, ImageStats, OverviewStats, SpatialStats};

/// A `center` edge-proximity share above this (in percent) is flagged.
pub const CENTER_BIAS_THRESHOLD: f64 = 60.0;

#[derive(Debug)]
pub enum PanelState<T> {
    Loading,
    Ready(T),
    Unavailable(String),
}

impl<T> Default for PanelState<T> {
    fn default() -> Self {
        PanelState::Loading
    }
}

impl<T> PanelState<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            PanelState::Ready(value) => Some(value),
            _ => None,
        }
    }

    fn from_result(kind: &str, result: Result<T, ApiError>) -> Self {
        match result {
            Ok(value) => PanelState::Ready(value),
            Err(err) => {
                warn!("Failed to load {kind} stats: {err}");
                PanelState::Unavailable(err.to_string())
            }
        }
    }
}

#[derive(Debug)]
pub enum StatsPayload {
    Overview(Result<OverviewStats, ApiError>),
    Boxes(Result<BoxStats, ApiError>),
    Images(Result<ImageStats, ApiError>),
    Spatial(Result<SpatialStats, ApiError>),
}

#[derive(Debug, Default)]
pub struct StatsBoard {
    generation: u64,
    pub overview: PanelState<OverviewStats>,
    pub boxes: PanelState<BoxStats>,
    pub images: PanelState<ImageStats>,
    pub spatial: PanelState<SpatialStats>,
}

impl StatsBoard {
    /// Start a fresh round of fetches; earlier rounds can no longer apply.
    pub fn begin(&mut self, generation: u64) {
        *self = StatsBoard {
            generation,
            ..StatsBoard::default()
        };
    }

    pub fn apply(&mut self, generation: u64, payload: StatsPayload) -> bool {
        if generation != self.generation {
            debug!(generation, current = self.generation, "discarding stale stats");
            return false;
        }
        match payload {
            StatsPayload::Overview(result) => self.overview = PanelState::from_result("overview", result),
            StatsPayload::Boxes(result) => self.boxes = PanelState::from_result("box", result),
            StatsPayload::Images(result) => self.images = PanelState::from_result("image", result),
            StatsPayload::Spatial(result) => self.spatial = PanelState::from_result("spatial", result),
        }
        true
    }
}

/// Most frequent over least frequent class count, with classes in backend order.
pub fn class_imbalance_ratio(stats: &OverviewStats) -> Option<u64> {
    if stats.class_distribution.len() < 2 {
        return None;
    }
    let first = stats.class_distribution.first().map_or(0, |(_, count)| *count);
    let last = stats.class_distribution.last().map_or(0, |(_, count)| *count).max(1);
    Some((first as f64 / last as f64).round() as u64)
}

pub fn max_class_count(stats: &OverviewStats) -> u64 {
    stats
        .class_distribution
        .iter()
        .map(|(_, count)| *count)
        .max()
        .unwrap_or(0)
        .max(1)
}

/// Rounded percentages of small, medium and large boxes.
pub fn size_category_percentages(stats: &BoxStats) -> [u64; 3] {
    let counts = [stats.small_count, stats.medium_count, stats.large_count];
    let total = counts.iter().sum::<u64>().max(1) as f64;
    counts.map(|count| (count as f64 / total * 100.0).round() as u64)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Contrast {
    Low,
    Medium,
    High,
}

impl Contrast {
    pub fn from_brightness_std(std: f64) -> Self {
        if std > 50.0 {
            Contrast::High
        } else if std > 25.0 {
            Contrast::Medium
        } else {
            Contrast::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Contrast::Low => "LOW",
            Contrast::Medium => "MED",
            Contrast::High => "HIGH",
        }
    }
}

pub fn has_center_bias(stats: &SpatialStats) -> bool {
    stats.edge("center") > CENTER_BIAS_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overview(distribution: &[(&str, u64)]) -> OverviewStats {
        OverviewStats {
            total_images: 10,
            total_annotations: 20,
            total_classes: distribution.len() as u64,
            avg_boxes_per_image: 2.0,
            empty_images: 0,
            class_distribution: distribution.iter().map(|(n, c)| (n.to_string(), *c)).collect(),
        }
    }

    #[test]
    fn partial_completion_is_a_valid_state() {
        let mut board = StatsBoard::default();
        board.begin(1);
        board.apply(1, StatsPayload::Overview(Ok(overview(&[("a", 1)]))));
        board.apply(1, StatsPayload::Boxes(Err(ApiError::Network("down".into()))));
        assert!(board.overview.ready().is_some());
        assert!(matches!(board.boxes, PanelState::Unavailable(_)));
        assert!(matches!(board.images, PanelState::Loading));
        assert!(matches!(board.spatial, PanelState::Loading));
    }

    #[test]
    fn stats_from_previous_dataset_are_dropped() {
        let mut board = StatsBoard::default();
        board.begin(1);
        board.begin(2);
        assert!(!board.apply(1, StatsPayload::Overview(Ok(overview(&[("old", 1)])))));
        assert!(matches!(board.overview, PanelState::Loading));
    }

    #[test]
    fn imbalance_uses_first_and_last_class() {
        assert_eq!(class_imbalance_ratio(&overview(&[("a", 90), ("b", 20), ("c", 10)])), Some(9));
        assert_eq!(class_imbalance_ratio(&overview(&[("a", 5), ("b", 0)])), Some(5));
        assert_eq!(class_imbalance_ratio(&overview(&[("a", 5)])), None);
    }

    #[test]
    fn size_percentages_guard_empty_totals() {
        let stats = BoxStats {
            size_distribution: vec![],
            aspect_ratio_distribution: vec![],
            small_count: 0,
            medium_count: 0,
            large_count: 0,
            boxes_per_image: vec![],
            tiny_boxes: 0,
        };
        assert_eq!(size_category_percentages(&stats), [0, 0, 0]);
        let stats = BoxStats {
            small_count: 1,
            medium_count: 1,
            large_count: 2,
            ..stats
        };
        assert_eq!(size_category_percentages(&stats), [25, 25, 50]);
    }

    #[test]
    fn contrast_levels() {
        assert_eq!(Contrast::from_brightness_std(60.0), Contrast::High);
        assert_eq!(Contrast::from_brightness_std(30.0), Contrast::Medium);
        assert_eq!(Contrast::from_brightness_std(25.0), Contrast::Low);
    }
}
