use eframe::egui;

use crate::app::{ExplorerApp, Session, Tab};
use crate::jobs::{Jobs, PictureKind};
use crate::models::ImageSummary;
use crate::navigator::NavKey;
use crate::overlay::{overlay_rects, paint_overlays};
use crate::ui::charts::{self, ACCENT, WARN};
use crate::ui::statistics;
use crate::utils::fit_size;

const GRID_COLUMNS: usize = 4;
const GRID_SPACING: f32 = 8.0;
const CAPTION_HEIGHT: f32 = 20.0;
const BACKDROP: egui::Color32 = egui::Color32::from_gray(16);

pub fn central_panel(app: &mut ExplorerApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let ExplorerApp {
            session,
            jobs,
            show_boxes,
            show_labels,
            ..
        } = app;
        let Some(session) = session.as_mut() else {
            return;
        };

        match session.active_tab {
            Tab::Overview => statistics::overview_tab(ui, &session.stats.overview),
            Tab::Boxes => statistics::boxes_tab(ui, &session.stats.boxes),
            Tab::Images => statistics::images_tab(ui, &session.stats.images),
            Tab::Spatial => statistics::spatial_tab(ui, &session.stats.spatial),
            Tab::Explorer if session.navigator.is_viewing() => {
                viewer(ui, session, jobs, *show_boxes, *show_labels);
            }
            Tab::Explorer => explorer(ui, session, jobs, *show_boxes),
        }
    });
}

fn explorer(ui: &mut egui::Ui, session: &mut Session, jobs: &Jobs, show_boxes: bool) {
    ui.horizontal(|ui| {
        ui.heading("Explorer");
        ui.separator();
        if session.grid.is_loading() {
            ui.spinner();
            ui.label(egui::RichText::new("LOADING...").color(WARN));
        } else if let Some(err) = session.grid.error() {
            ui.label(egui::RichText::new("UNAVAILABLE").color(WARN)).on_hover_text(err);
            if ui.small_button("⟳ Reload").clicked() {
                session.grid.invalidate();
            }
        } else {
            ui.label(format!(
                "SHOWING {} OF {}",
                session.grid.images().len(),
                charts::format_count(session.grid.total() as f64)
            ));
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let page = session.query.page();
            let total_pages = session.query.total_pages();
            if ui.add_enabled(page < total_pages, egui::Button::new("NEXT ▶")).clicked() {
                session.query.next_page();
            }
            ui.label(format!("{page} / {total_pages}"));
            if ui.add_enabled(page > 1, egui::Button::new("◀ PREV")).clicked() {
                session.query.prev_page();
            }
        });
    });
    ui.separator();

    if session.grid.images().is_empty() {
        if let Some(err) = session.grid.error() {
            centered_message(ui, &format!("Image listing unavailable: {err}"), WARN);
        } else if session.grid.is_empty_result() {
            let weak = ui.visuals().weak_text_color();
            centered_message(ui, "No images match the current filters", weak);
        }
        return;
    }

    let missing: Vec<String> = session
        .grid
        .images()
        .iter()
        .filter(|image| !session.thumbnails.contains(&image.id))
        .map(|image| image.id.clone())
        .collect();
    for id in missing {
        session.ensure_picture(jobs, &id, PictureKind::Thumbnail);
    }

    let cell_width = ((ui.available_width() - GRID_SPACING * (GRID_COLUMNS as f32 - 1.0))
        / GRID_COLUMNS as f32)
        .max(80.0);
    let image_size = egui::vec2(cell_width, cell_width * 0.75);

    let mut clicked = None;
    let output = egui::ScrollArea::vertical().auto_shrink([false; 2]).show(ui, |ui| {
        ui.spacing_mut().item_spacing = egui::vec2(GRID_SPACING, GRID_SPACING);
        for row in session.grid.images().chunks(GRID_COLUMNS) {
            ui.horizontal(|ui| {
                for image in row {
                    if thumbnail_card(ui, image, session.thumbnails.get(&image.id), image_size, show_boxes) {
                        clicked = Some(image.id.clone());
                    }
                }
            });
        }
    });

    if session.grid.is_loading() {
        // Previous page stays visible under a veil until the new one lands.
        let painter = ui.painter_at(output.inner_rect);
        painter.rect_filled(output.inner_rect, 0.0, egui::Color32::from_black_alpha(140));
        painter.text(
            output.inner_rect.center(),
            egui::Align2::CENTER_CENTER,
            "LOADING...",
            egui::FontId::monospace(16.0),
            ACCENT,
        );
    }

    if let Some(id) = clicked {
        session.navigator.select(&id, session.grid.images());
    }
}

/// One grid cell. Returns true when clicked.
fn thumbnail_card(
    ui: &mut egui::Ui,
    image: &ImageSummary,
    texture: Option<&egui::TextureHandle>,
    size: egui::Vec2,
    show_boxes: bool,
) -> bool {
    let (rect, response) = ui.allocate_exact_size(size + egui::vec2(0.0, CAPTION_HEIGHT), egui::Sense::click());
    let image_area = egui::Rect::from_min_size(rect.min, size);
    let painter = ui.painter_at(rect);
    painter.rect_filled(image_area, 2.0, BACKDROP);

    match texture {
        Some(texture) => {
            let shown = egui::Rect::from_center_size(image_area.center(), fit_size(texture.size_vec2(), size));
            painter.image(
                texture.id(),
                shown,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
            if show_boxes {
                paint_overlays(&painter, shown, &overlay_rects(&image.annotations, false), 1.5);
            }
        }
        None => {
            painter.text(
                image_area.center(),
                egui::Align2::CENTER_CENTER,
                "…",
                egui::FontId::proportional(18.0),
                ui.visuals().weak_text_color(),
            );
        }
    }

    let caption_y = image_area.max.y + CAPTION_HEIGHT / 2.0;
    painter.text(
        egui::pos2(rect.min.x + 2.0, caption_y),
        egui::Align2::LEFT_CENTER,
        short_name(&image.filename, 28),
        egui::FontId::monospace(11.0),
        ui.visuals().text_color(),
    );
    painter.text(
        egui::pos2(rect.max.x - 2.0, caption_y),
        egui::Align2::RIGHT_CENTER,
        format!("{} boxes", image.annotations.len()),
        egui::FontId::monospace(11.0),
        ACCENT,
    );

    if response.hovered() {
        painter.rect_stroke(rect, 2.0, egui::Stroke::new(1.0, ACCENT), egui::StrokeKind::Inside);
    }
    response.on_hover_text(image.filename.as_str()).clicked()
}

fn viewer(ui: &mut egui::Ui, session: &mut Session, jobs: &Jobs, show_boxes: bool, show_labels: bool) {
    session.warm_viewer(jobs);
    let images = session.grid.images();
    let Some(index) = session.navigator.current_index(images) else {
        return;
    };
    let image = &images[index];

    let mut action = None;
    ui.horizontal(|ui| {
        if ui.add_enabled(index > 0, egui::Button::new("◀ PREV")).clicked() {
            action = Some(NavKey::Prev);
        }
        if ui.button("CLOSE ✕").clicked() {
            action = Some(NavKey::Close);
        }
        if ui.add_enabled(index + 1 < images.len(), egui::Button::new("NEXT ▶")).clicked() {
            action = Some(NavKey::Next);
        }
        ui.separator();
        ui.label(format!("{} / {}", index + 1, images.len()));
        ui.label(egui::RichText::new(&image.filename).monospace());
    });

    let (area, _) = ui.allocate_exact_size(ui.available_size(), egui::Sense::hover());
    let painter = ui.painter_at(area);
    painter.rect_filled(area, 0.0, BACKDROP);

    if let Some(texture) = session.pictures.get(&image.id) {
        let shown = egui::Rect::from_center_size(area.center(), fit_size(texture.size_vec2(), area.size()));
        painter.image(
            texture.id(),
            shown,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );
        if show_boxes {
            paint_overlays(&painter, shown, &overlay_rects(&image.annotations, show_labels), 2.0);
        }
    } else if session.pictures.is_failed(&image.id) {
        painter.text(
            area.center(),
            egui::Align2::CENTER_CENTER,
            "Image unavailable",
            egui::FontId::proportional(16.0),
            WARN,
        );
    } else {
        painter.text(
            area.center(),
            egui::Align2::CENTER_CENTER,
            "LOADING...",
            egui::FontId::monospace(16.0),
            ACCENT,
        );
    }

    if let Some(key) = action {
        session.navigator.handle_key(key, session.grid.images());
    }
}

fn centered_message(ui: &mut egui::Ui, text: &str, color: egui::Color32) {
    ui.add_space(40.0);
    ui.vertical_centered(|ui| {
        ui.label(egui::RichText::new(text).color(color));
    });
}

/// `name` cut to at most `max` characters, ending in an ellipsis when shortened.
fn short_name(name: &str, max: usize) -> String {
    if name.chars().count() <= max {
        return name.to_string();
    }
    let mut short: String = name.chars().take(max.saturating_sub(1)).collect();
    short.push('…');
    short
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_names_are_shortened() {
        assert_eq!(short_name("a.jpg", 28), "a.jpg");
        assert_eq!(short_name("abcdefgh.jpg", 6), "abcde…");
        assert_eq!(short_name("abcdefgh.jpg", 6).chars().count(), 6);
    }
}
