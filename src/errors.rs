use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Custom error types for the leaf area service
#[derive(Error, Debug)]
pub enum LeafAreaError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration from {path}: {source}")]
    ConfigLoad {
        source: toml::de::Error,
        path: PathBuf,
    },

    /// Uploaded bytes could not be decoded as a raster image.
    #[error("Invalid image")]
    InvalidImage,

    /// Missing or non-numeric length/width form fields.
    #[error("Invalid length or width")]
    InvalidDimensions,

    /// No image part in the upload.
    #[error("Image required")]
    MissingImage,

    /// Segmentation produced an all-zero mask, so no bounding box exists.
    #[error("No leaf detected in image")]
    NoLeafDetected,

    #[error("Malformed multipart request: {0}")]
    Multipart(String),

    #[error("Unexpected error: {0}")]
    Other(String),
}

/// Type alias for Result with our custom error type
pub type Result<T> = std::result::Result<T, LeafAreaError>;

// Validation and processing failures alike surface as 400 with the error
// text in a JSON body. The uniform status is a compatibility constraint.
impl IntoResponse for LeafAreaError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string() }));
        (StatusCode::BAD_REQUEST, body).into_response()
    }
}
