use thiserror::Error;

/// Failures talking to the dataset backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("Network error: {0}")]
    Network(String),
    /// The backend answered with a non-2xx status; `detail` comes from its `{detail}` body.
    #[error("{detail}")]
    Status { status: u16, detail: String },
    /// The response body was not what the contract promises.
    #[error("Malformed response: {0}")]
    Decode(String),
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

impl From<url::ParseError> for ApiError {
    fn from(err: url::ParseError) -> Self {
        ApiError::InvalidUrl(err.to_string())
    }
}

/// Client-side filter problems. These never block a query.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("min boxes ({min}) is greater than max boxes ({max}); no image can match")]
    InvertedBoxRange { min: u32, max: u32 },
}
