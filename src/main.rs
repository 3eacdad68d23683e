#![windows_subsystem = "windows"]

mod api;
mod app;
mod config;
mod error;
mod grid;
mod http_client;
mod image_cache;
mod jobs;
mod logging;
mod models;
mod navigator;
mod overlay;
mod query;
mod stats;
mod ui;
mod utils;

use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use eframe::egui;
use tracing::{error, info, warn};

use crate::api::ApiClient;
use crate::app::ExplorerApp;
use crate::config::{DEFAULT_API_URL, ExplorerConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(err) = logging::init() {
        eprintln!("{err}");
    }

    let config = ExplorerConfig::load().unwrap_or_else(|err| {
        warn!("{err}; using default configuration");
        ExplorerConfig::default()
    });
    let client = match ApiClient::new(&config.api_url) {
        Ok(client) => client,
        Err(err) => {
            warn!("{err}; falling back to {DEFAULT_API_URL}");
            ApiClient::new(DEFAULT_API_URL)?
        }
    };

    let shutdown = Arc::new(AtomicBool::new(false));
    let repaint = Arc::new(Mutex::new(None::<egui::Context>));

    // panic hook
    let old_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        error!("{panic_info}");
        old_hook(panic_info);
    }));

    // Ctrl+C handler
    let flag = shutdown.clone();
    let waker = repaint.clone();
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
        match waker.lock().ok().and_then(|ctx| ctx.clone()) {
            Some(ctx) => ctx.request_repaint(),
            None => std::process::exit(130),
        }
    })?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([900.0, 560.0])
            .with_title("Dataset Explorer"),
        ..Default::default()
    };

    eframe::run_native(
        "Dataset Explorer",
        options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
            if let Ok(mut slot) = repaint.lock() {
                *slot = Some(cc.egui_ctx.clone());
            }
            Ok(Box::new(ExplorerApp::new(config, client, shutdown)))
        }),
    )?;

    info!("Dataset explorer closed");
    Ok(())
}
