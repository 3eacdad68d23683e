//! Background HTTP work for the UI thread.
//!
//! Every request runs on its own short-lived worker thread and reports back
//! through one channel. The UI drains the channel once per frame; each message
//! carries the token or generation it was issued with so the receiver can drop
//! anything that has been superseded.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use eframe::egui;
use tracing::{debug, error};

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::grid::RequestToken;
use crate::models::{BrowseListing, DatasetInfo, ImagePage};
use crate::query::ImageQuery;
use crate::stats::StatsPayload;
use crate::utils::{THUMBNAIL_MAX_SIZE, VIEWER_MAX_SIZE, decode_picture};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PictureKind {
    Thumbnail,
    Full,
}

impl PictureKind {
    fn limit(self) -> (u32, u32) {
        match self {
            PictureKind::Thumbnail => THUMBNAIL_MAX_SIZE,
            PictureKind::Full => VIEWER_MAX_SIZE,
        }
    }
}

#[derive(Debug)]
pub enum JobMessage {
    DatasetLoaded {
        token: u64,
        result: Result<DatasetInfo, ApiError>,
    },
    Stats {
        generation: u64,
        payload: StatsPayload,
    },
    ImagesPage {
        token: RequestToken,
        result: Result<ImagePage, ApiError>,
    },
    Picture {
        generation: u64,
        id: String,
        kind: PictureKind,
        result: Result<egui::ColorImage, ApiError>,
    },
    Browse {
        token: u64,
        result: Result<BrowseListing, ApiError>,
    },
}

/// How a dataset load was triggered; resuming never reports failures to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOrigin {
    Resume,
    User,
}

pub struct Jobs {
    client: Arc<ApiClient>,
    tx: Sender<JobMessage>,
    rx: Receiver<JobMessage>,
    repaint: Option<egui::Context>,
}

impl Jobs {
    pub fn new(client: ApiClient) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            client: Arc::new(client),
            tx,
            rx,
            repaint: None,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Workers wake the UI through this context once their result is queued.
    pub fn set_repaint_context(&mut self, ctx: egui::Context) {
        self.repaint = Some(ctx);
    }

    pub fn try_recv(&self) -> Option<JobMessage> {
        match self.rx.try_recv() {
            Ok(message) => Some(message),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                error!("Job channel disconnected");
                None
            }
        }
    }

    fn spawn<F>(&self, name: &str, work: F)
    where
        F: FnOnce(&ApiClient) -> JobMessage + Send + 'static,
    {
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        let repaint = self.repaint.clone();
        let spawned = thread::Builder::new()
            .name(format!("explorer-{name}"))
            .spawn(move || {
                let message = work(&client);
                if tx.send(message).is_ok() {
                    if let Some(ctx) = repaint {
                        ctx.request_repaint();
                    }
                }
            });
        if let Err(err) = spawned {
            error!("Failed to spawn {name} worker: {err}");
        }
    }

    pub fn load_dataset(&self, token: u64, origin: LoadOrigin, path: Option<String>) {
        debug!(token, ?origin, ?path, "loading dataset");
        self.spawn("dataset", move |client| JobMessage::DatasetLoaded {
            token,
            result: match path {
                Some(path) => client.load_dataset(&path),
                None => client.dataset_info(),
            },
        });
    }

    /// The four stats fetches are independent and run concurrently.
    pub fn load_stats(&self, generation: u64) {
        self.spawn("stats-overview", move |client| JobMessage::Stats {
            generation,
            payload: StatsPayload::Overview(client.overview_stats()),
        });
        self.spawn("stats-boxes", move |client| JobMessage::Stats {
            generation,
            payload: StatsPayload::Boxes(client.box_stats()),
        });
        self.spawn("stats-images", move |client| JobMessage::Stats {
            generation,
            payload: StatsPayload::Images(client.image_stats()),
        });
        self.spawn("stats-spatial", move |client| JobMessage::Stats {
            generation,
            payload: StatsPayload::Spatial(client.spatial_stats()),
        });
    }

    pub fn load_images(&self, token: RequestToken, query: ImageQuery) {
        self.spawn("images", move |client| JobMessage::ImagesPage {
            token,
            result: client.images(&query),
        });
    }

    /// Fetch and decode a picture for the session identified by `generation`.
    pub fn load_picture(&self, generation: u64, id: String, kind: PictureKind) {
        self.spawn("picture", move |client| {
            let result = client
                .image_bytes(&id)
                .and_then(|bytes| decode_picture(&bytes, kind.limit()));
            JobMessage::Picture {
                generation,
                id,
                kind,
                result,
            }
        });
    }

    pub fn browse(&self, token: u64, path: Option<String>) {
        self.spawn("browse", move |client| JobMessage::Browse {
            token,
            result: client.browse(path.as_deref()),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::test_server::{json_response, serve_once};
    use std::time::{Duration, Instant};

    fn wait_for(jobs: &Jobs) -> JobMessage {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(message) = jobs.try_recv() {
                return message;
            }
            assert!(Instant::now() < deadline, "no job message arrived");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn listing_result_comes_back_with_its_token() {
        let (base, _requests) = serve_once(json_response("200 OK", r#"{"images": [], "total": 0}"#));
        let jobs = Jobs::new(ApiClient::new(&base).unwrap());
        let query = crate::query::QueryState::default().current_query();
        let mut grid = crate::grid::ImageGrid::default();
        let token = grid.begin_load(&query);
        jobs.load_images(token, query);

        match wait_for(&jobs) {
            JobMessage::ImagesPage { token: got, result } => {
                assert_eq!(got, token);
                assert_eq!(result.unwrap().total, 0);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn failed_dataset_load_reports_detail() {
        let (base, _requests) =
            serve_once(json_response("400 Bad Request", r#"{"detail": "Path does not exist: /x"}"#));
        let jobs = Jobs::new(ApiClient::new(&base).unwrap());
        jobs.load_dataset(3, LoadOrigin::User, Some("/x".to_string()));

        match wait_for(&jobs) {
            JobMessage::DatasetLoaded { token, result } => {
                assert_eq!(token, 3);
                assert_eq!(result.unwrap_err().to_string(), "Path does not exist: /x");
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }
}
