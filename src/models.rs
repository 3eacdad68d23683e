use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetFormat {
    Coco,
    Yolo,
    Voc,
}

impl DatasetFormat {
    pub fn label(self) -> &'static str {
        match self {
            DatasetFormat::Coco => "COCO",
            DatasetFormat::Yolo => "YOLO",
            DatasetFormat::Voc => "VOC",
        }
    }
}

/// A dataset the backend has loaded. Immutable for the lifetime of a session.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct DatasetInfo {
    #[serde(default)]
    pub name: String,
    pub path: String,
    pub format: DatasetFormat,
    pub total_images: u64,
    #[serde(default)]
    pub total_annotations: u64,
    pub classes: Vec<String>,
    pub splits: Vec<String>,
}

/// One bounding box in normalized (0..1) image coordinates, `x`/`y` being the
/// top-left corner.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Annotation {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub class_name: String,
    #[serde(default)]
    pub confidence: Option<f32>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ImageSummary {
    pub id: String,
    pub filename: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub split: Option<String>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ImagePage {
    pub images: Vec<ImageSummary>,
    pub total: u64,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct OverviewStats {
    pub total_images: u64,
    pub total_annotations: u64,
    pub total_classes: u64,
    pub avg_boxes_per_image: f64,
    pub empty_images: u64,
    #[serde(deserialize_with = "ordered_map")]
    pub class_distribution: Vec<(String, u64)>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct BoxStats {
    pub size_distribution: Vec<f32>,
    pub aspect_ratio_distribution: Vec<f32>,
    pub small_count: u64,
    pub medium_count: u64,
    pub large_count: u64,
    #[serde(deserialize_with = "ordered_map")]
    pub boxes_per_image: Vec<(String, f64)>,
    pub tiny_boxes: u64,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ImageStats {
    pub min_width: u32,
    pub max_width: u32,
    pub min_height: u32,
    pub max_height: u32,
    pub avg_width: f64,
    pub avg_height: f64,
    #[serde(deserialize_with = "ordered_map")]
    pub formats: Vec<(String, u64)>,
    #[serde(deserialize_with = "ordered_map")]
    pub color_modes: Vec<(String, u64)>,
    pub brightness_mean: f64,
    pub brightness_std: f64,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SpatialStats {
    pub heatmap: Vec<Vec<f32>>,
    #[serde(deserialize_with = "ordered_map")]
    pub edge_proximity: Vec<(String, f64)>,
    #[serde(deserialize_with = "ordered_map")]
    pub per_class_heatmaps: Vec<(String, Vec<Vec<f32>>)>,
}

impl SpatialStats {
    pub fn edge(&self, side: &str) -> f64 {
        self.edge_proximity
            .iter()
            .find(|(name, _)| name == side)
            .map_or(0.0, |(_, value)| *value)
    }
}

/// Directory listing returned by `/browse`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct BrowseListing {
    pub current_path: String,
    #[serde(default)]
    pub parent_path: Option<String>,
    pub folders: Vec<String>,
    #[serde(deserialize_with = "ordered_map")]
    pub detected_datasets: Vec<(String, String)>,
}

impl BrowseListing {
    pub fn detected_format(&self, folder: &str) -> Option<&str> {
        self.detected_datasets
            .iter()
            .find(|(name, _)| name == folder)
            .map(|(_, format)| format.as_str())
    }

    /// Backend path of `folder` inside this listing.
    pub fn child_path(&self, folder: &str) -> String {
        format!("{}/{}", self.current_path.trim_end_matches('/'), folder)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: Option<String>,
}

// JSON objects keep the backend's key order (e.g. class counts sorted by frequency).
fn ordered_map<'de, D, V>(deserializer: D) -> Result<Vec<(String, V)>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    struct OrderedVisitor<V>(std::marker::PhantomData<V>);

    impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedVisitor<V> {
        type Value = Vec<(String, V)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a JSON object")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((key, value)) = map.next_entry::<String, V>()? {
                entries.push((key, value));
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(OrderedVisitor(std::marker::PhantomData))
}
