//! Painters for backend-computed distributions: histograms, heatmaps,
//! progress bars and headline stat boxes. No state lives here.

use eframe::egui;

pub const ACCENT: egui::Color32 = egui::Color32::from_rgb(0x00, 0xff, 0x88);
pub const WARN: egui::Color32 = egui::Color32::from_rgb(0xff, 0xaa, 0x00);
const INSET: egui::Color32 = egui::Color32::from_gray(24);

/// Bar heights as fractions of `max(data, 1)`.
pub fn histogram_fractions(data: &[f32]) -> Vec<f32> {
    let max = data.iter().copied().fold(1.0_f32, f32::max);
    data.iter().map(|value| value.max(0.0) / max).collect()
}

/// Intensity grows monotonically with `value`: more opaque and more red.
pub fn heatmap_cell_color(value: f32) -> egui::Color32 {
    let value = if value.is_finite() { value.clamp(0.0, 1.0) } else { 0.0 };
    let green = (100.0 - value * 100.0).round() as u8;
    let alpha = (value * 0.8 * 255.0).round() as u8;
    egui::Color32::from_rgba_unmultiplied(255, green, 0, alpha)
}

/// `value / max`, or 0 when `max` is zero.
pub fn progress_fraction(value: f64, max: f64) -> f32 {
    if max <= 0.0 {
        return 0.0;
    }
    (value / max) as f32
}

pub fn histogram(ui: &mut egui::Ui, data: &[f32], color: egui::Color32, height: f32) {
    let (rect, _) = ui.allocate_exact_size(egui::vec2(ui.available_width(), height), egui::Sense::hover());
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 0.0, INSET);
    if data.is_empty() {
        return;
    }
    let inner = rect.shrink(4.0);
    let gap = 1.0;
    let bar_width = ((inner.width() - gap * (data.len() as f32 - 1.0)) / data.len() as f32).max(1.0);
    for (i, fraction) in histogram_fractions(data).into_iter().enumerate() {
        let x = inner.min.x + i as f32 * (bar_width + gap);
        let bar = egui::Rect::from_min_max(
            egui::pos2(x, inner.max.y - inner.height() * fraction),
            egui::pos2(x + bar_width, inner.max.y),
        );
        painter.rect_filled(bar, 0.0, color);
    }
}

/// Paint a 2-D grid of intensities; nothing at all for an empty grid.
pub fn heatmap(ui: &mut egui::Ui, grid: &[Vec<f32>], aspect: f32) {
    let columns = grid.first().map_or(0, Vec::len);
    if grid.is_empty() || columns == 0 {
        return;
    }
    let width = ui.available_width();
    let (rect, _) = ui.allocate_exact_size(egui::vec2(width, width / aspect.max(0.1)), egui::Sense::hover());
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 0.0, INSET);
    let cell = egui::vec2(rect.width() / columns as f32, rect.height() / grid.len() as f32);
    for (row, values) in grid.iter().enumerate() {
        for (col, value) in values.iter().take(columns).enumerate() {
            let min = rect.min + egui::vec2(col as f32 * cell.x, row as f32 * cell.y);
            painter.rect_filled(egui::Rect::from_min_size(min, cell), 0.0, heatmap_cell_color(*value));
        }
    }
}

pub fn progress_bar(ui: &mut egui::Ui, label: &str, value: f64, max: f64) {
    ui.horizontal(|ui| {
        ui.add_sized([90.0, 16.0], egui::Label::new(egui::RichText::new(label).small()).truncate());
        let width = (ui.available_width() - 60.0).max(20.0);
        let (rect, _) = ui.allocate_exact_size(egui::vec2(width, 14.0), egui::Sense::hover());
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, INSET);
        let fraction = progress_fraction(value, max).clamp(0.0, 1.0);
        let filled = egui::Rect::from_min_size(rect.min, egui::vec2(rect.width() * fraction, rect.height()));
        painter.rect_filled(filled, 0.0, ACCENT);
        ui.label(egui::RichText::new(format_count(value)).small());
    });
}

pub fn stat_box(ui: &mut egui::Ui, label: &str, value: &str, warn: bool) {
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.set_min_width(110.0);
        ui.vertical(|ui| {
            ui.label(egui::RichText::new(label.to_uppercase()).small().weak());
            ui.label(
                egui::RichText::new(value)
                    .size(20.0)
                    .strong()
                    .color(if warn { WARN } else { ACCENT }),
            );
        });
    });
}

/// Thousands-separated integer, or one decimal for fractional values.
pub fn format_count(value: f64) -> String {
    if value.fract() != 0.0 {
        return format!("{value:.1}");
    }
    let digits = format!("{}", value.abs() as u64);
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if value < 0.0 {
        out.insert(0, '-');
    }
    out
}
