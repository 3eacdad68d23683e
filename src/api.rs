//! Typed client for the dataset backend's HTTP contract.

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::ApiError;
use crate::http_client::{self, MAX_IMAGE_BYTES, MAX_JSON_BYTES};
use crate::models::{
    BoxStats, BrowseListing, DatasetInfo, ErrorBody, ImagePage, ImageStats, ImageSummary,
    OverviewStats, SpatialStats,
};
use crate::query::ImageQuery;

const FALLBACK_DETAIL: &str = "Request failed";

#[derive(Clone, Debug)]
pub struct ApiClient {
    base: Url,
}

impl ApiClient {
    /// `base_url` is the API root, e.g. `http://127.0.0.1:5151/api/`.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let mut base = Url::parse(base_url)?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn dataset_info(&self) -> Result<DatasetInfo, ApiError> {
        self.get_json(self.endpoint(&["dataset", "info"])?)
    }

    pub fn load_dataset(&self, path: &str) -> Result<DatasetInfo, ApiError> {
        let mut url = self.endpoint(&["dataset", "load"])?;
        url.query_pairs_mut().append_pair("path", path);
        self.send_json("POST", url)
    }

    pub fn overview_stats(&self) -> Result<OverviewStats, ApiError> {
        self.get_json(self.endpoint(&["stats", "overview"])?)
    }

    pub fn box_stats(&self) -> Result<BoxStats, ApiError> {
        self.get_json(self.endpoint(&["stats", "boxes"])?)
    }

    pub fn image_stats(&self) -> Result<ImageStats, ApiError> {
        self.get_json(self.endpoint(&["stats", "images"])?)
    }

    pub fn spatial_stats(&self) -> Result<SpatialStats, ApiError> {
        self.get_json(self.endpoint(&["stats", "spatial"])?)
    }

    pub fn images(&self, query: &ImageQuery) -> Result<ImagePage, ApiError> {
        let mut url = self.endpoint(&["images"])?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query.to_pairs() {
                pairs.append_pair(key, &value);
            }
        }
        self.get_json(url)
    }

    // Part of the backend contract; the UI reads these from the dataset and listing.
    #[allow(dead_code)]
    pub fn image(&self, id: &str) -> Result<ImageSummary, ApiError> {
        self.get_json(self.endpoint(&["images", id])?)
    }

    pub fn image_file_url(&self, id: &str) -> Result<Url, ApiError> {
        self.endpoint(&["images", id, "file"])
    }

    /// Raw encoded image bytes, not decoded here.
    pub fn image_bytes(&self, id: &str) -> Result<Vec<u8>, ApiError> {
        let url = self.image_file_url(id)?;
        let response = self.call("GET", &url)?;
        Ok(http_client::read_response_bytes(response, MAX_IMAGE_BYTES)?)
    }

    /// List a backend directory; `None` asks for the backend's default (home) directory.
    pub fn browse(&self, path: Option<&str>) -> Result<BrowseListing, ApiError> {
        let mut url = self.endpoint(&["browse"])?;
        url.query_pairs_mut().append_pair("path", path.unwrap_or(""));
        self.get_json(url)
    }

    // Part of the backend contract; the UI reads these from the dataset and listing.
    #[allow(dead_code)]
    pub fn classes(&self) -> Result<Vec<String>, ApiError> {
        self.get_json(self.endpoint(&["classes"])?)
    }

    // Part of the backend contract; the UI reads these from the dataset and listing.
    #[allow(dead_code)]
    pub fn splits(&self) -> Result<Vec<String>, ApiError> {
        self.get_json(self.endpoint(&["splits"])?)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        self.send_json("GET", url)
    }

    fn send_json<T: DeserializeOwned>(&self, method: &str, url: Url) -> Result<T, ApiError> {
        let response = self.call(method, &url)?;
        let bytes = http_client::read_response_bytes(response, MAX_JSON_BYTES)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn call(&self, method: &str, url: &Url) -> Result<ureq::Response, ApiError> {
        debug!("{method} {url}");
        match http_client::agent().request_url(method, url).call() {
            Ok(response) => Ok(response),
            Err(ureq::Error::Status(status, response)) => Err(status_error(status, response)),
            Err(ureq::Error::Transport(transport)) => Err(ApiError::Network(transport.to_string())),
        }
    }
}

fn status_error(status: u16, response: ureq::Response) -> ApiError {
    let detail = http_client::read_response_bytes(response, MAX_JSON_BYTES)
        .ok()
        .and_then(|bytes| serde_json::from_slice::<ErrorBody>(&bytes).ok())
        .and_then(|body| body.detail)
        .unwrap_or_else(|| FALLBACK_DETAIL.to_string());
    ApiError::Status { status, detail }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::test_server::{json_response, serve_once};
    use crate::query::{FilterField, QueryState};

    #[test]
    fn base_url_gains_trailing_slash() {
        let client = ApiClient::new("http://localhost:5151/api").unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:5151/api/");
        let url = client.image_file_url("train/img 01").unwrap();
        assert_eq!(url.as_str(), "http://localhost:5151/api/images/train%2Fimg%2001/file");
    }

    #[test]
    fn rejects_non_http_base() {
        assert!(matches!(
            ApiClient::new("mailto:someone@example.com"),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn images_sends_only_present_filters() {
        let body = r#"{"images": [{"id": "img_01", "filename": "a.jpg", "width": 640,
            "height": 480, "split": "train", "annotations": []}], "total": 1, "page": 1,
            "limit": 24, "pages": 1}"#;
        let (base, requests) = serve_once(json_response("200 OK", body));
        let client = ApiClient::new(&base).unwrap();
        let mut state = QueryState::new(24);
        state.set_filter(FilterField::Class, "dog");
        state.set_filter(FilterField::MinBoxes, "nope");

        let page = client.images(&state.current_query()).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.images[0].id, "img_01");

        let request_line = requests.recv().unwrap();
        assert!(request_line.starts_with("GET /api/images?page=1&limit=24&class_filter=dog "));
        assert!(!request_line.contains("min_boxes"));
    }

    #[test]
    fn load_dataset_surfaces_backend_detail() {
        let body = r#"{"detail": "Could not detect dataset format"}"#;
        let (base, requests) = serve_once(json_response("400 Bad Request", body));
        let client = ApiClient::new(&base).unwrap();

        let err = client.load_dataset("/data/unknown").unwrap_err();
        match err {
            ApiError::Status { status, detail } => {
                assert_eq!(status, 400);
                assert_eq!(detail, "Could not detect dataset format");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let request_line = requests.recv().unwrap();
        assert!(request_line.starts_with("POST /api/dataset/load?path=%2Fdata%2Funknown "));
    }

    #[test]
    fn error_without_detail_falls_back() {
        let (base, _requests) = serve_once(json_response("500 Internal Server Error", "oops"));
        let client = ApiClient::new(&base).unwrap();
        let err = client.overview_stats().unwrap_err();
        assert_eq!(err.to_string(), FALLBACK_DETAIL);
    }

    #[test]
    fn unreachable_backend_is_a_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = ApiClient::new(&format!("http://{addr}/api/")).unwrap();
        assert!(matches!(client.splits(), Err(ApiError::Network(_))));
    }

    #[test]
    fn single_image_and_classes() {
        let body = r#"{"id": "img 7", "filename": "7.jpg", "width": 32, "height": 16,
            "annotations": [{"x": 0.1, "y": 0.2, "width": 0.3, "height": 0.4, "class_name": "cat"}]}"#;
        let (base, requests) = serve_once(json_response("200 OK", body));
        let image = ApiClient::new(&base).unwrap().image("img 7").unwrap();
        assert_eq!(image.annotations[0].class_name, "cat");
        assert_eq!(image.split, None);
        assert!(requests.recv().unwrap().starts_with("GET /api/images/img%207 "));

        let (base, _requests) = serve_once(json_response("200 OK", r#"["cat", "dog"]"#));
        let classes = ApiClient::new(&base).unwrap().classes().unwrap();
        assert_eq!(classes, ["cat", "dog"]);
    }

    #[test]
    fn browse_parses_detected_datasets() {
        let body = r#"{"current_path": "/data", "parent_path": "/", "folders": ["coco", "misc"],
            "detected_datasets": {"coco": "COCO"}}"#;
        let (base, _requests) = serve_once(json_response("200 OK", body));
        let client = ApiClient::new(&base).unwrap();
        let listing = client.browse(Some("/data")).unwrap();
        assert_eq!(listing.detected_format("coco"), Some("COCO"));
        assert_eq!(listing.detected_format("misc"), None);
    }
}
