use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use eframe::egui;
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::config::ExplorerConfig;
use crate::error::ApiError;
use crate::grid::{GridUpdate, ImageGrid, RequestToken};
use crate::image_cache::{ImageCache, neighbour_ids};
use crate::jobs::{JobMessage, Jobs, LoadOrigin, PictureKind};
use crate::models::{BrowseListing, DatasetInfo, ImagePage};
use crate::navigator::Navigator;
use crate::query::QueryState;
use crate::stats::StatsBoard;
use crate::ui;

const STATUS_SECONDS: f32 = 3.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tab {
    Overview,
    Boxes,
    Images,
    Spatial,
    Explorer,
}

impl Tab {
    pub const ALL: [Tab; 5] = [Tab::Overview, Tab::Boxes, Tab::Images, Tab::Spatial, Tab::Explorer];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Boxes => "Boxes",
            Tab::Images => "Images",
            Tab::Spatial => "Spatial",
            Tab::Explorer => "Explorer",
        }
    }
}

/// Everything derived from one loaded dataset. Dropped wholesale on "NEW".
pub struct Session {
    /// Tags every request issued for this dataset; results carrying another one are dropped.
    pub generation: u64,
    pub dataset: DatasetInfo,
    pub stats: StatsBoard,
    pub query: QueryState,
    pub grid: ImageGrid,
    pub navigator: Navigator,
    pub thumbnails: ImageCache<egui::TextureHandle>,
    pub pictures: ImageCache<egui::TextureHandle>,
    pub active_tab: Tab,
}

impl Session {
    fn new(generation: u64, dataset: DatasetInfo, config: &ExplorerConfig) -> Self {
        let mut stats = StatsBoard::default();
        stats.begin(generation);
        Self {
            generation,
            dataset,
            stats,
            query: QueryState::new(config.page_size),
            grid: ImageGrid::new(generation),
            navigator: Navigator::default(),
            // Must hold a full page of thumbnails and the viewer's three pictures.
            thumbnails: ImageCache::new(config.thumbnail_cache.max(config.page_size as usize)),
            pictures: ImageCache::new(config.viewer_cache.max(3)),
            active_tab: Tab::Overview,
        }
    }

    /// Fetch a picture unless it is already cached or in flight.
    pub fn ensure_picture(&mut self, jobs: &Jobs, id: &str, kind: PictureKind) {
        let cache = match kind {
            PictureKind::Thumbnail => &mut self.thumbnails,
            PictureKind::Full => &mut self.pictures,
        };
        if cache.mark_pending(id) {
            jobs.load_picture(self.generation, id.to_string(), kind);
        }
    }

    /// Full-size picture for the open image plus its in-page neighbours.
    pub fn warm_viewer(&mut self, jobs: &Jobs) {
        let Some(index) = self.navigator.current_index(self.grid.images()) else {
            return;
        };
        let mut wanted = vec![self.grid.images()[index].id.clone()];
        wanted.extend(
            neighbour_ids(self.grid.images(), index)
                .into_iter()
                .map(str::to_string),
        );
        for id in wanted {
            self.ensure_picture(jobs, &id, PictureKind::Full);
        }
    }

    fn anchor(&self) -> usize {
        self.navigator.current_index(self.grid.images()).unwrap_or(0)
    }
}

#[derive(Default)]
pub struct FolderBrowser {
    pub listing: Option<BrowseListing>,
    pub loading: bool,
    pub error: Option<String>,
    token: u64,
}

#[derive(Default)]
pub struct LoadForm {
    pub path_input: String,
    pub use_browser: bool,
    pub error: Option<String>,
    pub pending: Option<(u64, LoadOrigin)>,
    /// Folder whose LOAD button was pressed in the browser.
    pub loading_folder: Option<String>,
    pub browser: FolderBrowser,
}

impl LoadForm {
    pub fn is_loading(&self) -> bool {
        matches!(self.pending, Some((_, LoadOrigin::User)))
    }
}

pub struct ExplorerApp {
    pub config: ExplorerConfig,
    pub jobs: Jobs,
    pub session: Option<Session>,
    pub load_form: LoadForm,
    pub show_boxes: bool,
    pub show_labels: bool,
    pub status_message: Option<(String, f32)>,
    next_token: u64,
    started: bool,
    shutdown: Arc<AtomicBool>,
}

impl ExplorerApp {
    pub fn new(config: ExplorerConfig, client: ApiClient, shutdown: Arc<AtomicBool>) -> Self {
        Self {
            load_form: LoadForm {
                path_input: config.initial_path.clone().unwrap_or_default(),
                ..LoadForm::default()
            },
            config,
            jobs: Jobs::new(client),
            session: None,
            show_boxes: true,
            show_labels: true,
            status_message: None,
            next_token: 0,
            started: false,
            shutdown,
        }
    }

    pub fn show_status(&mut self, message: &str) {
        self.status_message = Some((message.to_string(), STATUS_SECONDS));
    }

    fn next_token(&mut self) -> u64 {
        self.next_token += 1;
        self.next_token
    }

    fn start(&mut self, ctx: &egui::Context) {
        if self.started {
            return;
        }
        self.started = true;
        self.jobs.set_repaint_context(ctx.clone());
        info!("Using backend at {}", self.jobs.client().base_url());
        match self.config.initial_path.clone() {
            Some(path) => self.request_dataset(path),
            None => {
                let token = self.next_token();
                self.load_form.pending = Some((token, LoadOrigin::Resume));
                self.jobs.load_dataset(token, LoadOrigin::Resume, None);
            }
        }
    }

    /// Ask the backend to load `path`. Failures are shown inline on the load screen.
    pub fn request_dataset(&mut self, path: String) {
        let path = path.trim().to_string();
        if path.is_empty() {
            return;
        }
        let token = self.next_token();
        self.load_form.error = None;
        self.load_form.pending = Some((token, LoadOrigin::User));
        self.jobs.load_dataset(token, LoadOrigin::User, Some(path));
    }

    pub fn browse(&mut self, path: Option<String>) {
        let token = self.next_token();
        let browser = &mut self.load_form.browser;
        browser.token = token;
        browser.loading = true;
        browser.error = None;
        self.jobs.browse(token, path);
    }

    /// Discard the current dataset and everything derived from it.
    pub fn new_session(&mut self) {
        if let Some(session) = self.session.take() {
            info!("Closing dataset {}", session.dataset.path);
        }
        self.load_form.error = None;
        self.load_form.loading_folder = None;
    }

    fn start_session(&mut self, dataset: DatasetInfo) {
        info!(
            "Loaded {} dataset at {} ({} images)",
            dataset.format.label(),
            dataset.path,
            dataset.total_images
        );
        let generation = self.next_token();
        self.session = Some(Session::new(generation, dataset, &self.config));
        self.jobs.load_stats(generation);
        self.load_form.loading_folder = None;
    }

    fn poll_jobs(&mut self, ctx: &egui::Context) {
        while let Some(message) = self.jobs.try_recv() {
            match message {
                JobMessage::DatasetLoaded { token, result } => self.handle_dataset_loaded(token, result),
                JobMessage::Stats { generation, payload } => {
                    if let Some(session) = self.session.as_mut() {
                        session.stats.apply(generation, payload);
                    }
                }
                JobMessage::ImagesPage { token, result } => self.handle_images_page(token, result),
                JobMessage::Picture {
                    generation,
                    id,
                    kind,
                    result,
                } => self.handle_picture(ctx, generation, id, kind, result),
                JobMessage::Browse { token, result } => self.handle_browse(token, result),
            }
        }
    }

    fn handle_dataset_loaded(&mut self, token: u64, result: Result<DatasetInfo, ApiError>) {
        let Some((pending, origin)) = self.load_form.pending else {
            return;
        };
        if pending != token {
            debug!(token, pending, "discarding stale dataset load");
            return;
        }
        self.load_form.pending = None;
        match (result, origin) {
            (Ok(dataset), _) => self.start_session(dataset),
            (Err(err), LoadOrigin::Resume) => debug!("No dataset to resume: {err}"),
            (Err(err), LoadOrigin::User) => {
                warn!("Dataset load failed: {err}");
                self.load_form.error = Some(err.to_string());
                self.load_form.loading_folder = None;
            }
        }
    }

    fn handle_images_page(&mut self, token: RequestToken, result: Result<ImagePage, ApiError>) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match session.grid.apply(token, result) {
            GridUpdate::Applied { total } => {
                if session.query.set_total(total) {
                    debug!(page = session.query.page(), "page clamped to available range");
                }
                if session.navigator.reconcile(session.grid.images()) {
                    debug!("selected image left the page; closing viewer");
                }
            }
            GridUpdate::Failed => self.show_status("Image listing unavailable"),
            GridUpdate::Stale => {}
        }
    }

    fn handle_picture(
        &mut self,
        ctx: &egui::Context,
        generation: u64,
        id: String,
        kind: PictureKind,
        result: Result<egui::ColorImage, ApiError>,
    ) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if generation != session.generation {
            debug!(generation, current = session.generation, %id, "discarding picture from an earlier dataset");
            return;
        }
        let anchor = session.anchor();
        let cache = match kind {
            PictureKind::Thumbnail => &mut session.thumbnails,
            PictureKind::Full => &mut session.pictures,
        };
        if !cache.is_pending(&id) {
            return;
        }
        match result {
            Ok(image) => {
                let texture = ctx.load_texture(format!("{kind:?}-{id}"), image, egui::TextureOptions::LINEAR);
                cache.insert(id, texture, session.grid.images(), anchor);
            }
            Err(err) => {
                warn!("Failed to load image {id}: {err}");
                cache.mark_failed(&id);
            }
        }
    }

    fn handle_browse(&mut self, token: u64, result: Result<BrowseListing, ApiError>) {
        let browser = &mut self.load_form.browser;
        if token != browser.token {
            return;
        }
        browser.loading = false;
        match result {
            Ok(listing) => browser.listing = Some(listing),
            Err(err) => browser.error = Some(err.to_string()),
        }
    }

    /// Issue one listing fetch whenever the derived query differs from the last one sent.
    fn sync_grid(&mut self) -> Option<RequestToken> {
        let session = self.session.as_mut()?;
        let query = session.query.current_query();
        if !session.grid.needs_fetch(&query) {
            return None;
        }
        let token = session.grid.begin_load(&query);
        self.jobs.load_images(token, query);
        Some(token)
    }

    /// Viewer keys only act while the explorer tab, and so the viewer, is on screen.
    fn poll_viewer_keys(&mut self, ctx: &egui::Context) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.active_tab != Tab::Explorer || !session.navigator.is_listening() {
            return;
        }
        let Session { navigator, grid, .. } = session;
        navigator.poll_keys(ctx, grid.images());
    }

    fn tick_status(&mut self, ctx: &egui::Context) {
        if let Some((_, remaining)) = self.status_message.as_mut() {
            *remaining -= ctx.input(|i| i.stable_dt);
            if *remaining <= 0.0 {
                self.status_message = None;
            } else {
                ctx.request_repaint();
            }
        }
    }

    fn check_shutdown(&self, ctx: &egui::Context) {
        if self.shutdown.load(Ordering::SeqCst) {
            info!("Interrupted; closing window");
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }
}

impl eframe::App for ExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.start(ctx);
        self.check_shutdown(ctx);
        self.poll_jobs(ctx);
        self.tick_status(ctx);

        if self.session.is_none() {
            ui::load::load_screen(self, ctx);
            return;
        }

        ui::top::top_panel(self, ctx);
        ui::top::status_bar(self, ctx);

        let explorer_active = self
            .session
            .as_ref()
            .is_some_and(|session| session.active_tab == Tab::Explorer);
        if explorer_active {
            self.sync_grid();
            let viewing = self.session.as_ref().is_some_and(|s| s.navigator.is_viewing());
            if viewing {
                ui::side::image_info_panel(self, ctx);
            } else {
                ui::side::side_panel(self, ctx);
            }
        }
        ui::central::central_panel(self, ctx);
        self.poll_viewer_keys(ctx);
    }
}
