//! Detector output: labelled boxes and the coordinate units they arrive in.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::bbox::{BBoxXYXY, Normalized, Pixel};

/// Coordinate units a detector reported a box in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxUnits {
    /// Fractions of image width/height.
    Normalized,
    /// Image pixels.
    Absolute,
}

impl BoxUnits {
    /// Guesses units for an untagged box: any coordinate above 1.0 means pixels.
    ///
    /// A tiny pixel box near the origin is misread as normalized; detectors
    /// should tag their boxes instead.
    pub fn infer(bbox: &RawBox) -> Self {
        if bbox.max_coordinate() > 1.0 {
            BoxUnits::Absolute
        } else {
            BoxUnits::Normalized
        }
    }
}

/// Box corners exactly as a detector wrote them, units not yet resolved.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawBox {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl RawBox {
    pub fn max_coordinate(&self) -> f64 {
        self.xmin.max(self.ymin).max(self.xmax).max(self.ymax)
    }
}

/// One entry of a detections file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawDetection {
    pub label: String,

    #[serde(default)]
    pub confidence: f64,

    #[serde(rename = "box")]
    pub bbox: RawBox,

    /// Explicit unit tag; inferred from the coordinates when missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<BoxUnits>,
}

impl RawDetection {
    /// Resolves the box into pixel space for an image of the given size.
    pub fn resolve(&self, image_width: u32, image_height: u32) -> Detection {
        let units = match self.units {
            Some(units) => units,
            None => {
                let inferred = BoxUnits::infer(&self.bbox);
                debug!(label = %self.label, ?inferred, "box units not tagged, inferred from coordinates");
                inferred
            }
        };

        let RawBox {
            xmin,
            ymin,
            xmax,
            ymax,
        } = self.bbox;
        let bbox = match units {
            BoxUnits::Absolute => BBoxXYXY::<Pixel>::from_xyxy(xmin, ymin, xmax, ymax),
            BoxUnits::Normalized => BBoxXYXY::<Normalized>::from_xyxy(xmin, ymin, xmax, ymax)
                .to_pixel(image_width as f64, image_height as f64),
        };

        Detection {
            label: self.label.clone(),
            confidence: self.confidence,
            bbox,
        }
    }
}

/// A detected subject with its box in image pixels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    pub confidence: f64,
    #[serde(rename = "box")]
    pub bbox: BBoxXYXY<Pixel>,
}

impl Detection {
    pub fn new(label: impl Into<String>, confidence: f64, bbox: BBoxXYXY<Pixel>) -> Self {
        Self {
            label: label.into(),
            confidence,
            bbox,
        }
    }
}
