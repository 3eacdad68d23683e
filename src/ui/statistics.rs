use eframe::egui;

use crate::models::{BoxStats, ImageStats, OverviewStats, SpatialStats};
use crate::stats::{
    Contrast, PanelState, class_imbalance_ratio, has_center_bias, max_class_count,
    size_category_percentages,
};
use crate::ui::charts::{self, ACCENT, WARN};

const ASPECT_COLOR: egui::Color32 = egui::Color32::from_rgb(0xff, 0x66, 0x00);
const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(0xff, 0x44, 0x44);
const CLASS_HEATMAPS: usize = 5;

/// Render `state`, delegating to `ready` once the panel has data.
fn panel<T>(ui: &mut egui::Ui, state: &PanelState<T>, ready: impl FnOnce(&mut egui::Ui, &T)) {
    match state {
        PanelState::Loading => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(egui::RichText::new("LOADING...").color(WARN));
            });
        }
        PanelState::Unavailable(message) => {
            ui.label(egui::RichText::new(format!("Unavailable: {message}")).weak());
        }
        PanelState::Ready(stats) => {
            egui::ScrollArea::vertical()
                .auto_shrink([false; 2])
                .show(ui, |ui| ready(ui, stats));
        }
    }
}

fn section(ui: &mut egui::Ui, title: &str) {
    ui.add_space(8.0);
    ui.label(egui::RichText::new(title.to_uppercase()).small().strong().color(ACCENT));
    ui.separator();
}

fn diagnostic(ui: &mut egui::Ui, color: egui::Color32, text: &str) {
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new("●").color(color));
        ui.label(text);
    });
}

pub fn overview_tab(ui: &mut egui::Ui, state: &PanelState<OverviewStats>) {
    panel(ui, state, |ui, stats| {
        section(ui, "Class distribution");
        let max = max_class_count(stats) as f64;
        for (class, count) in &stats.class_distribution {
            charts::progress_bar(ui, class, *count as f64, max);
        }
        if stats.class_distribution.is_empty() {
            ui.label(egui::RichText::new("No classes").weak());
        }

        section(ui, "Diagnostics");
        if let Some(ratio) = class_imbalance_ratio(stats) {
            diagnostic(ui, WARN, &format!("Class imbalance: {ratio}:1 between most and least frequent class"));
        }
        if stats.empty_images > 0 {
            diagnostic(
                ui,
                ERROR_COLOR,
                &format!("{} images have no annotations", charts::format_count(stats.empty_images as f64)),
            );
        }
        diagnostic(
            ui,
            ACCENT,
            &format!(
                "Dataset loaded: {} images, {} annotations",
                charts::format_count(stats.total_images as f64),
                charts::format_count(stats.total_annotations as f64)
            ),
        );
    });
}

pub fn boxes_tab(ui: &mut egui::Ui, state: &PanelState<BoxStats>) {
    panel(ui, state, |ui, stats| {
        ui.columns(2, |columns| {
            section(&mut columns[0], "Box size distribution");
            charts::histogram(&mut columns[0], &stats.size_distribution, ACCENT, 120.0);
            section(&mut columns[1], "Aspect ratio distribution");
            charts::histogram(&mut columns[1], &stats.aspect_ratio_distribution, ASPECT_COLOR, 120.0);
        });

        section(ui, "COCO size categories");
        let [small, medium, large] = size_category_percentages(stats);
        ui.horizontal(|ui| {
            charts::stat_box(ui, "Small", &format!("{small}%"), false);
            charts::stat_box(ui, "Medium", &format!("{medium}%"), false);
            charts::stat_box(ui, "Large", &format!("{large}%"), false);
        });
        ui.label(
            egui::RichText::new(format!(
                "{} small · {} medium · {} large",
                charts::format_count(stats.small_count as f64),
                charts::format_count(stats.medium_count as f64),
                charts::format_count(stats.large_count as f64)
            ))
            .small()
            .weak(),
        );

        section(ui, "Boxes per image");
        ui.horizontal(|ui| {
            for (name, value) in &stats.boxes_per_image {
                charts::stat_box(ui, name, &charts::format_count(*value), false);
            }
        });

        if stats.tiny_boxes > 0 {
            section(ui, "Warnings");
            diagnostic(
                ui,
                WARN,
                &format!("{} tiny boxes (under 16 px)", charts::format_count(stats.tiny_boxes as f64)),
            );
        }
    });
}

pub fn images_tab(ui: &mut egui::Ui, state: &PanelState<ImageStats>) {
    panel(ui, state, |ui, stats| {
        section(ui, "Resolution");
        ui.horizontal(|ui| {
            charts::stat_box(ui, "Width", &format!("{}–{}", stats.min_width, stats.max_width), false);
            charts::stat_box(ui, "Height", &format!("{}–{}", stats.min_height, stats.max_height), false);
            charts::stat_box(ui, "Avg size", &format!("{:.0}×{:.0}", stats.avg_width, stats.avg_height), false);
        });

        ui.columns(2, |columns| {
            section(&mut columns[0], "Formats");
            let max = stats.formats.iter().map(|(_, count)| *count).max().unwrap_or(0) as f64;
            for (format, count) in &stats.formats {
                charts::progress_bar(&mut columns[0], format, *count as f64, max);
            }
            section(&mut columns[1], "Color modes");
            let max = stats.color_modes.iter().map(|(_, count)| *count).max().unwrap_or(0) as f64;
            for (mode, count) in &stats.color_modes {
                charts::progress_bar(&mut columns[1], mode, *count as f64, max);
            }
        });

        section(ui, "Brightness");
        let contrast = Contrast::from_brightness_std(stats.brightness_std);
        ui.horizontal(|ui| {
            charts::stat_box(ui, "Mean", &format!("{:.1}", stats.brightness_mean), false);
            charts::stat_box(ui, "Std dev", &format!("{:.1}", stats.brightness_std), false);
            charts::stat_box(ui, "Contrast", contrast.label(), contrast == Contrast::Low);
        });
        charts::progress_bar(ui, "Mean / 255", stats.brightness_mean, 255.0);
    });
}

pub fn spatial_tab(ui: &mut egui::Ui, state: &PanelState<SpatialStats>) {
    panel(ui, state, |ui, stats| {
        ui.columns(2, |columns| {
            section(&mut columns[0], "Box center heatmap");
            charts::heatmap(&mut columns[0], &stats.heatmap, 16.0 / 9.0);
            if stats.heatmap.is_empty() {
                columns[0].label(egui::RichText::new("No boxes").weak());
            }

            let ui = &mut columns[1];
            section(ui, "Edge proximity");
            for side in ["top", "bottom", "left", "right", "center"] {
                charts::progress_bar(ui, side, stats.edge(side), 100.0);
            }
            if has_center_bias(stats) {
                diagnostic(ui, WARN, &format!("Center bias: {:.0}% of boxes sit near the center", stats.edge("center")));
            }
        });

        if !stats.per_class_heatmaps.is_empty() {
            section(ui, "Per-class heatmaps");
            let shown = &stats.per_class_heatmaps[..stats.per_class_heatmaps.len().min(CLASS_HEATMAPS)];
            ui.columns(CLASS_HEATMAPS, |columns| {
                for ((class, grid), column) in shown.iter().zip(columns.iter_mut()) {
                    column.label(egui::RichText::new(class).small());
                    charts::heatmap(column, grid, 1.0);
                }
            });
        }
    });
}
