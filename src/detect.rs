//! Object-detector seam and the per-process analysis context.
//!
//! The detection model itself lives outside this crate. [`JsonDetector`]
//! reads what such a model wrote to disk; anything else producing labelled
//! boxes can implement [`Detector`].

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::ComposureError;
use crate::features::FeatureExtractor;
use crate::geometry::io_json::read_detections_json;
use crate::geometry::Detection;

/// Produces labelled boxes for an image.
pub trait Detector: Send + Sync {
    fn name(&self) -> &'static str;

    /// Detections for `image`, resolved to pixel coordinates of a
    /// `width × height` image.
    fn detect(
        &self,
        image: &Path,
        width: u32,
        height: u32,
    ) -> Result<Vec<Detection>, ComposureError>;
}

/// Reads detections from a JSON file written by an external model.
#[derive(Clone, Debug, Default)]
pub struct JsonDetector {
    /// Explicit detections file; the image's sidecar file when `None`.
    pub path: Option<PathBuf>,
    /// Detections below this confidence are dropped.
    pub min_confidence: f64,
}

impl JsonDetector {
    pub fn new(path: Option<PathBuf>, min_confidence: f64) -> Self {
        Self {
            path,
            min_confidence,
        }
    }

    /// `photo.jpg` -> `photo.detections.json` in the same directory.
    pub fn sidecar_path(image: &Path) -> PathBuf {
        let stem = image
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        image.with_file_name(format!("{stem}.detections.json"))
    }
}

impl Detector for JsonDetector {
    fn name(&self) -> &'static str {
        "json"
    }

    fn detect(
        &self,
        image: &Path,
        width: u32,
        height: u32,
    ) -> Result<Vec<Detection>, ComposureError> {
        let path = match &self.path {
            Some(path) => path.clone(),
            None => {
                let sidecar = Self::sidecar_path(image);
                if !sidecar.is_file() {
                    warn!(
                        image = %image.display(),
                        sidecar = %sidecar.display(),
                        "no detections file found; scoring no subjects"
                    );
                    return Ok(Vec::new());
                }
                sidecar
            }
        };

        let raw = read_detections_json(&path)?;
        let total = raw.len();
        let detections: Vec<Detection> = raw
            .iter()
            .filter(|det| det.confidence >= self.min_confidence)
            .map(|det| det.resolve(width, height))
            .collect();

        for det in &detections {
            info!(
                label = %det.label,
                confidence = det.confidence,
                bbox = ?det.bbox,
                "detected subject"
            );
        }
        if detections.len() < total {
            info!(
                dropped = total - detections.len(),
                min_confidence = self.min_confidence,
                "dropped low-confidence detections"
            );
        }

        Ok(detections)
    }
}

/// Collaborators built once per process and shared by reference.
///
/// Each pipeline installs only what it uses: `rot` and `spiral` a detector,
/// `similarity` an extractor.
#[derive(Default)]
pub struct Context {
    detector: Option<Box<dyn Detector>>,
    extractor: Option<Box<dyn FeatureExtractor>>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_detector(mut self, detector: Box<dyn Detector>) -> Self {
        info!(detector = detector.name(), "detector ready");
        self.detector = Some(detector);
        self
    }

    pub fn with_extractor(mut self, extractor: Box<dyn FeatureExtractor>) -> Self {
        info!(extractor = extractor.name(), "feature extractor ready");
        self.extractor = Some(extractor);
        self
    }

    pub fn detector(&self) -> Result<&dyn Detector, ComposureError> {
        self.detector
            .as_deref()
            .ok_or_else(|| ComposureError::invalid_config("no detector configured"))
    }

    pub fn extractor(&self) -> Result<&dyn FeatureExtractor, ComposureError> {
        self.extractor
            .as_deref()
            .ok_or_else(|| ComposureError::invalid_config("no feature extractor configured"))
    }
}
