use eframe::egui;

use crate::app::ExplorerApp;
use crate::overlay::{annotation_label, palette_color};
use crate::query::FilterField;
use crate::ui::charts::WARN;

const ALL_CLASSES: &str = "All classes";
const ALL_SPLITS: &str = "All splits";

/// Filter controls for the explorer grid. Every edit goes through
/// `QueryState::set_filter`, which sends the grid back to page one.
pub fn side_panel(app: &mut ExplorerApp, ctx: &egui::Context) {
    egui::SidePanel::left("side_panel")
        .default_width(220.0)
        .resizable(false)
        .show(ctx, |ui| {
            let ExplorerApp {
                session,
                show_boxes,
                show_labels,
                ..
            } = app;
            let Some(session) = session.as_mut() else {
                return;
            };

            ui.heading("Filters");
            ui.add_space(4.0);

            let current = session.query.filters().clone();
            let mut class = current.class_filter.clone().unwrap_or_default();
            ui.label(egui::RichText::new("CLASS").small().weak());
            egui::ComboBox::from_id_salt("class_filter")
                .width(200.0)
                .selected_text(if class.is_empty() { ALL_CLASSES } else { class.as_str() })
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut class, String::new(), ALL_CLASSES);
                    for name in &session.dataset.classes {
                        ui.selectable_value(&mut class, name.clone(), name);
                    }
                });
            if class != current.class_filter.clone().unwrap_or_default() {
                session.query.set_filter(FilterField::Class, &class);
            }

            let mut split = current.split_filter.clone().unwrap_or_default();
            ui.label(egui::RichText::new("SPLIT").small().weak());
            egui::ComboBox::from_id_salt("split_filter")
                .width(200.0)
                .selected_text(if split.is_empty() { ALL_SPLITS } else { split.as_str() })
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut split, String::new(), ALL_SPLITS);
                    for name in &session.dataset.splits {
                        ui.selectable_value(&mut split, name.clone(), name);
                    }
                });
            if split != current.split_filter.clone().unwrap_or_default() {
                session.query.set_filter(FilterField::Split, &split);
            }

            ui.label(egui::RichText::new("BOXES PER IMAGE").small().weak());
            ui.horizontal(|ui| {
                let mut min = current.min_boxes.clone();
                let response = ui.add(egui::TextEdit::singleline(&mut min).hint_text("min").desired_width(60.0));
                if response.changed() {
                    session.query.set_filter(FilterField::MinBoxes, &min);
                }
                ui.label("–");
                let mut max = current.max_boxes.clone();
                let response = ui.add(egui::TextEdit::singleline(&mut max).hint_text("max").desired_width(60.0));
                if response.changed() {
                    session.query.set_filter(FilterField::MaxBoxes, &max);
                }
            });
            if let Some(issue) = session.query.filters().range_issue() {
                ui.label(egui::RichText::new(format!("⚠ {issue}")).small().color(WARN));
            }

            ui.add_space(6.0);
            let clear = ui.add_enabled(session.query.filters().is_active(), egui::Button::new("Clear filters"));
            if clear.clicked() {
                session.query.clear_filters();
            }

            ui.separator();
            ui.heading("View");
            ui.checkbox(show_boxes, "Show boxes");
            ui.add_enabled(*show_boxes, egui::Checkbox::new(show_labels, "Show labels"));
        });
}

/// Details for the image open in the viewer.
pub fn image_info_panel(app: &mut ExplorerApp, ctx: &egui::Context) {
    egui::SidePanel::right("image_info_panel")
        .default_width(260.0)
        .show(ctx, |ui| {
            let Some(session) = app.session.as_ref() else {
                return;
            };
            let images = session.grid.images();
            let Some(index) = session.navigator.current_index(images) else {
                return;
            };
            let image = &images[index];

            ui.heading("Image");
            egui::Grid::new("image_info").num_columns(2).striped(true).show(ui, |ui| {
                ui.label("File");
                ui.add(egui::Label::new(egui::RichText::new(&image.filename).monospace()).truncate());
                ui.end_row();
                ui.label("Size");
                ui.label(format!("{} × {}", image.width, image.height));
                ui.end_row();
                ui.label("Split");
                ui.label(image.split.as_deref().unwrap_or("—"));
                ui.end_row();
                ui.label("Boxes");
                ui.label(image.annotations.len().to_string());
                ui.end_row();
                ui.label("Position");
                ui.label(format!("{} of {} on page", index + 1, images.len()));
                ui.end_row();
            });

            ui.separator();
            ui.heading("Annotations");
            if image.annotations.is_empty() {
                ui.label(egui::RichText::new("No annotations").weak());
            }
            egui::ScrollArea::vertical().auto_shrink([false; 2]).show(ui, |ui| {
                for (i, annotation) in image.annotations.iter().enumerate() {
                    ui.horizontal(|ui| {
                        let (swatch, _) = ui.allocate_exact_size(egui::vec2(10.0, 10.0), egui::Sense::hover());
                        ui.painter().rect_filled(swatch, 2.0, palette_color(i));
                        ui.label(annotation_label(annotation));
                    });
                    ui.label(
                        egui::RichText::new(format!(
                            "x {:.1}%  y {:.1}%  w {:.1}%  h {:.1}%",
                            annotation.x * 100.0,
                            annotation.y * 100.0,
                            annotation.width * 100.0,
                            annotation.height * 100.0,
                        ))
                        .small()
                        .weak(),
                    );
                }
            });

            ui.separator();
            ui.label(egui::RichText::new("← / → navigate · Esc closes").small().weak());
        });
}
