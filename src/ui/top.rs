use eframe::egui;

use crate::app::{ExplorerApp, Tab};
use crate::ui::charts::{self, ACCENT};

pub fn top_panel(app: &mut ExplorerApp, ctx: &egui::Context) {
    let mut start_over = false;
    egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
        let Some(session) = app.session.as_mut() else {
            return;
        };
        ui.add_space(4.0);
        ui.horizontal(|ui| {
            ui.heading(egui::RichText::new("◈ DATASET EXPLORER").color(ACCENT).strong());
            ui.label(
                egui::RichText::new(session.dataset.format.label())
                    .monospace()
                    .background_color(egui::Color32::from_gray(40)),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("NEW").on_hover_text("Load another dataset").clicked() {
                    start_over = true;
                }
            });
        });
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("PATH").small().weak());
            ui.label(egui::RichText::new(&session.dataset.path).monospace());
            ui.separator();
            ui.label(format!(
                "LOADED {} images",
                charts::format_count(session.dataset.total_images as f64)
            ));
            ui.separator();
            ui.label(egui::RichText::new("● READY").color(ACCENT));
        });

        ui.add_space(4.0);
        ui.horizontal(|ui| match session.stats.overview.ready() {
            Some(overview) => {
                charts::stat_box(ui, "Images", &charts::format_count(overview.total_images as f64), false);
                charts::stat_box(ui, "Annotations", &charts::format_count(overview.total_annotations as f64), false);
                charts::stat_box(ui, "Classes", &overview.total_classes.to_string(), false);
                charts::stat_box(ui, "Avg/Image", &format!("{:.1}", overview.avg_boxes_per_image), false);
                charts::stat_box(ui, "Empty", &overview.empty_images.to_string(), overview.empty_images > 0);
            }
            None => {
                for label in ["Images", "Annotations", "Classes", "Avg/Image", "Empty"] {
                    charts::stat_box(ui, label, "—", false);
                }
            }
        });

        ui.add_space(4.0);
        ui.horizontal(|ui| {
            for tab in Tab::ALL {
                ui.selectable_value(&mut session.active_tab, tab, tab.label());
            }
        });
        ui.add_space(2.0);
    });

    if start_over {
        app.new_session();
    }
}

pub fn status_bar(app: &ExplorerApp, ctx: &egui::Context) {
    egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            if let Some(session) = &app.session {
                ui.label(
                    egui::RichText::new(format!(
                        "{} classes | {} splits",
                        session.dataset.classes.len(),
                        session.dataset.splits.len()
                    ))
                    .small()
                    .weak(),
                );
            }
            if let Some((message, _)) = &app.status_message {
                ui.separator();
                ui.label(egui::RichText::new(message).small().color(charts::WARN));
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(egui::RichText::new(app.jobs.client().base_url().as_str()).small().weak());
            });
        });
    });
}
