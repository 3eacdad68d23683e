use eframe::egui;

use crate::app::ExplorerApp;
use crate::ui::charts::{ACCENT, WARN};

const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(0xff, 0x44, 0x44);

enum BrowseAction {
    Open(Option<String>),
    Load(String),
}

/// Shown while no dataset is loaded.
pub fn load_screen(app: &mut ExplorerApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            ui.heading(egui::RichText::new("◈ DATASET EXPLORER").color(ACCENT).size(28.0).strong());
            ui.label(egui::RichText::new("Supports COCO · YOLO · Pascal VOC").weak());
            ui.add_space(16.0);

            ui.horizontal(|ui| {
                ui.add_space((ui.available_width() - 260.0).max(0.0) / 2.0);
                let form = &mut app.load_form;
                ui.selectable_value(&mut form.use_browser, false, "MANUAL PATH");
                ui.selectable_value(&mut form.use_browser, true, "BROWSE");
            });
            ui.add_space(12.0);
        });

        if app.load_form.use_browser {
            browse_mode(app, ui);
        } else {
            manual_mode(app, ui);
        }

        if let Some(error) = &app.load_form.error {
            ui.add_space(12.0);
            ui.vertical_centered(|ui| {
                ui.label(egui::RichText::new(format!("✕ {error}")).color(ERROR_COLOR));
            });
        }
    });
}

fn manual_mode(app: &mut ExplorerApp, ui: &mut egui::Ui) {
    let loading = app.load_form.is_loading();
    let mut submit = false;
    ui.vertical_centered(|ui| {
        ui.horizontal(|ui| {
            ui.add_space((ui.available_width() - 620.0).max(0.0) / 2.0);
            let response = ui.add_enabled(
                !loading,
                egui::TextEdit::singleline(&mut app.load_form.path_input)
                    .hint_text("/path/to/dataset")
                    .desired_width(420.0),
            );
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                submit = true;
            }
            if ui.add_enabled(!loading, egui::Button::new("Pick…")).clicked() {
                if let Some(folder) = rfd::FileDialog::new().pick_folder() {
                    app.load_form.path_input = folder.display().to_string();
                }
            }
            let label = if loading { "LOADING..." } else { "LOAD" };
            let can_load = !loading && !app.load_form.path_input.trim().is_empty();
            if ui.add_enabled(can_load, egui::Button::new(label)).clicked() {
                submit = true;
            }
        });
        ui.label(egui::RichText::new("Path as seen by the backend").small().weak());
    });

    if submit && !loading {
        let path = app.load_form.path_input.clone();
        app.request_dataset(path);
    }
}

fn browse_mode(app: &mut ExplorerApp, ui: &mut egui::Ui) {
    let browser = &app.load_form.browser;
    if browser.listing.is_none() && !browser.loading && browser.error.is_none() {
        app.browse(None);
    }

    let loading = app.load_form.is_loading();
    let loading_folder = app.load_form.loading_folder.clone();
    let browser = &app.load_form.browser;
    let mut action = None;

    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.set_width(ui.available_width());
        if let Some(error) = &browser.error {
            ui.label(egui::RichText::new(format!("✕ {error}")).color(ERROR_COLOR));
            if ui.button("Retry").clicked() {
                action = Some(BrowseAction::Open(
                    browser.listing.as_ref().map(|listing| listing.current_path.clone()),
                ));
            }
        }
        let Some(listing) = &browser.listing else {
            if browser.loading {
                ui.spinner();
            }
            return;
        };

        ui.horizontal(|ui| {
            let up = ui.add_enabled(listing.parent_path.is_some() && !browser.loading, egui::Button::new("⬆ Up"));
            if up.clicked() {
                action = Some(BrowseAction::Open(listing.parent_path.clone()));
            }
            ui.label(egui::RichText::new(&listing.current_path).monospace());
            if browser.loading {
                ui.spinner();
            }
        });
        ui.separator();

        if listing.folders.is_empty() {
            ui.label(egui::RichText::new("No folders here").weak());
        }
        egui::ScrollArea::vertical()
            .max_height(ui.available_height() - 40.0)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                for folder in &listing.folders {
                    ui.horizontal(|ui| {
                        if ui.link(format!("📁 {folder}")).clicked() {
                            action = Some(BrowseAction::Open(Some(listing.child_path(folder))));
                        }
                        let Some(format) = listing.detected_format(folder) else {
                            return;
                        };
                        ui.label(
                            egui::RichText::new(format.to_uppercase())
                                .small()
                                .monospace()
                                .color(ACCENT),
                        );
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            let path = listing.child_path(folder);
                            let busy = loading && loading_folder.as_deref() == Some(path.as_str());
                            let label = if busy { "LOADING..." } else { "LOAD" };
                            let button = egui::Button::new(egui::RichText::new(label).color(if busy { WARN } else { ACCENT }));
                            if ui.add_enabled(!loading, button).clicked() {
                                action = Some(BrowseAction::Load(path));
                            }
                        });
                    });
                }
            });
    });

    match action {
        Some(BrowseAction::Open(path)) => app.browse(path),
        Some(BrowseAction::Load(path)) => {
            app.load_form.loading_folder = Some(path.clone());
            app.request_dataset(path);
        }
        None => {}
    }
}
