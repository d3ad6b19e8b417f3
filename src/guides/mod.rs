//! Composition guides: ordered point sets fitted to an image.
//!
//! A [`GuideSet`] is what the proximity scorer measures detections against.
//! Points are kept in generation order (left line before right line, sweep
//! order along the spiral), never re-sorted by position.

pub mod spiral;
pub mod thirds;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ComposureError;
use crate::geometry::Point;

pub use spiral::{spiral_points, GoldenSpiral, SpiralConfig};
pub use thirds::{thirds_points, Orientation, Segment, ThirdsLayout};

/// The family of guide a [`GuideSet`] was generated from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuideKind {
    ThirdsGrid,
    Spiral,
}

/// An ordered collection of guide points for one image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GuideSet {
    pub kind: GuideKind,
    pub points: Vec<Point>,
}

impl GuideSet {
    /// Rule-of-thirds lines for an image of the given size.
    pub fn thirds_grid(
        width: u32,
        height: u32,
        layout: ThirdsLayout,
    ) -> Result<Self, ComposureError> {
        check_dimensions(width, height)?;
        let points = thirds_points(layout, width, height);
        debug!(?layout, width, height, points = points.len(), "generated thirds grid");

        Ok(Self {
            kind: GuideKind::ThirdsGrid,
            points,
        })
    }

    /// Golden spiral for an image of the given size.
    pub fn golden_spiral(
        width: u32,
        height: u32,
        config: &SpiralConfig,
    ) -> Result<Self, ComposureError> {
        check_dimensions(width, height)?;
        let points = spiral_points(width, height, config)?;
        debug!(width, height, points = points.len(), "generated golden spiral");

        Ok(Self {
            kind: GuideKind::Spiral,
            points,
        })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<(), ComposureError> {
    if width == 0 || height == 0 {
        return Err(ComposureError::invalid_config(format!(
            "image dimensions must be positive, got {width}x{height}"
        )));
    }
    Ok(())
}
