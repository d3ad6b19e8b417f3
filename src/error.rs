use std::path::PathBuf;
use thiserror::Error;

/// The main error type for composure operations.
#[derive(Debug, Error)]
pub enum ComposureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("Guide set is empty; nothing to measure distances against")]
    EmptyGuideSet,

    #[error("Detection '{label}' has non-finite box coordinates")]
    NonFiniteDetection { label: String },

    #[error("Invalid input {path}: {message}")]
    InvalidInput { path: PathBuf, message: String },

    #[error("Failed to decode image {path}: {source}")]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to write image {path}: {source}")]
    ImageWrite {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to read image dimensions from {path}: {source}")]
    DimensionRead {
        path: PathBuf,
        #[source]
        source: imagesize::ImageError,
    },

    #[error("Failed to parse detections JSON from {path}: {source}")]
    DetectionsParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse settings YAML from {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to serialize report: {source}")]
    ReportWrite {
        #[source]
        source: serde_json::Error,
    },
}

impl ComposureError {
    /// Shorthand for an [`ComposureError::InvalidConfiguration`] error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }
}
