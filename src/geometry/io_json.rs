//! JSON reading for detections produced by an external object detector.
//!
//! The file is a JSON array of entries shaped like
//! `{"label": "dog", "confidence": 0.97, "box": {"xmin": .., "ymin": .., "xmax": .., "ymax": ..}, "units": "absolute"}`
//! where `units` is optional.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::detection::RawDetection;
use crate::error::ComposureError;

/// Reads raw detections from a JSON file.
///
/// # Errors
/// Returns an error if the file cannot be opened or parsed.
pub fn read_detections_json(path: &Path) -> Result<Vec<RawDetection>, ComposureError> {
    let file = File::open(path).map_err(ComposureError::Io)?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| ComposureError::DetectionsParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses raw detections from a JSON string.
pub fn from_detections_str(json: &str) -> Result<Vec<RawDetection>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Parses raw detections from bytes.
pub fn from_detections_slice(bytes: &[u8]) -> Result<Vec<RawDetection>, serde_json::Error> {
    serde_json::from_slice(bytes)
}
