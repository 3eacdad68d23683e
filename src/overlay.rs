//! Bounding-box overlays expressed as percentages of the image container.

use eframe::egui;

use crate::models::Annotation;

/// Cyclic per-annotation palette. Colors follow position within an image, so two
/// images may reuse the same color for different classes.
pub const PALETTE: [egui::Color32; 6] = [
    egui::Color32::from_rgb(0x00, 0xff, 0x88),
    egui::Color32::from_rgb(0xff, 0x66, 0x00),
    egui::Color32::from_rgb(0x00, 0xaa, 0xff),
    egui::Color32::from_rgb(0xff, 0x00, 0xaa),
    egui::Color32::from_rgb(0xaa, 0xff, 0x00),
    egui::Color32::from_rgb(0xaa, 0x00, 0xff),
];

pub fn palette_color(index: usize) -> egui::Color32 {
    PALETTE[index % PALETTE.len()]
}

#[derive(Clone, Debug, PartialEq)]
pub struct OverlayRect {
    pub left_pct: f32,
    pub top_pct: f32,
    pub width_pct: f32,
    pub height_pct: f32,
    pub color: egui::Color32,
    pub label: Option<String>,
}

pub fn annotation_label(annotation: &Annotation) -> String {
    match annotation.confidence {
        Some(conf) => format!("{} {:.1}%", annotation.class_name, conf * 100.0),
        None => annotation.class_name.clone(),
    }
}

/// Out-of-range coordinates pass through unchanged; clipping happens when painting.
pub fn to_overlay_rect(annotation: &Annotation, index: usize, show_labels: bool) -> OverlayRect {
    OverlayRect {
        left_pct: annotation.x * 100.0,
        top_pct: annotation.y * 100.0,
        width_pct: annotation.width * 100.0,
        height_pct: annotation.height * 100.0,
        color: palette_color(index),
        label: show_labels.then(|| annotation_label(annotation)),
    }
}

pub fn overlay_rects(annotations: &[Annotation], show_labels: bool) -> Vec<OverlayRect> {
    annotations
        .iter()
        .enumerate()
        .map(|(i, annotation)| to_overlay_rect(annotation, i, show_labels))
        .collect()
}

impl OverlayRect {
    pub fn screen_rect(&self, container: egui::Rect) -> egui::Rect {
        let size = container.size();
        let min = container.min
            + egui::vec2(size.x * self.left_pct / 100.0, size.y * self.top_pct / 100.0);
        let extent = egui::vec2(size.x * self.width_pct / 100.0, size.y * self.height_pct / 100.0);
        egui::Rect::from_min_size(min, extent.max(egui::Vec2::ZERO))
    }
}

/// Stroke every rect inside `container` and draw label chips above their top-left corner.
pub fn paint_overlays(painter: &egui::Painter, container: egui::Rect, rects: &[OverlayRect], stroke_width: f32) {
    let painter = painter.with_clip_rect(container.intersect(painter.clip_rect()));
    for rect in rects {
        let screen = rect.screen_rect(container);
        if !screen.is_finite() {
            continue;
        }
        painter.rect_stroke(
            screen,
            0.0,
            egui::Stroke::new(stroke_width, rect.color),
            egui::StrokeKind::Middle,
        );

        if let Some(label) = &rect.label {
            let galley = painter.layout_no_wrap(
                label.clone(),
                egui::FontId::proportional(11.0),
                egui::Color32::BLACK,
            );
            let chip = egui::Rect::from_min_size(
                egui::pos2(screen.min.x, screen.min.y - galley.size().y),
                galley.size() + egui::vec2(4.0, 0.0),
            );
            // Boxes touching the top edge get their chip inside the box instead.
            let chip = if chip.min.y < container.min.y {
                chip.translate(egui::vec2(0.0, galley.size().y))
            } else {
                chip
            };
            painter.rect_filled(chip, 0.0, rect.color);
            painter.galley(chip.min + egui::vec2(2.0, 0.0), galley, egui::Color32::BLACK);
        }
    }
}
