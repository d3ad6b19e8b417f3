//! Rule-of-thirds grid lines rasterized into guide points.

use serde::{Deserialize, Serialize};

use crate::error::ComposureError;
use crate::geometry::Point;

/// Number of equal strips each axis is divided into.
const THIRDS: u32 = 3;

/// Which grid lines to draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Two vertical lines splitting the width into thirds.
    Vertical,
    /// Two horizontal lines splitting the height into thirds.
    Horizontal,
    /// All four lines, producing nine blocks.
    Blocks,
}

/// A validated orientation/grid-size combination.
///
/// Only three combinations exist; everything else is rejected by
/// [`ThirdsLayout::new`] before any geometry is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThirdsLayout {
    Vertical3,
    Horizontal3,
    Blocks9,
}

impl ThirdsLayout {
    /// Validates an orientation against a grid size.
    ///
    /// `vertical` and `horizontal` require 3, `blocks` requires 9.
    pub fn new(orientation: Orientation, grid_size: u32) -> Result<Self, ComposureError> {
        match (orientation, grid_size) {
            (Orientation::Vertical, 3) => Ok(ThirdsLayout::Vertical3),
            (Orientation::Horizontal, 3) => Ok(ThirdsLayout::Horizontal3),
            (Orientation::Blocks, 9) => Ok(ThirdsLayout::Blocks9),
            (Orientation::Blocks, other) => Err(ComposureError::invalid_config(format!(
                "blocks orientation requires 9 as grid size, got {other}"
            ))),
            (Orientation::Vertical | Orientation::Horizontal, other) => {
                Err(ComposureError::invalid_config(format!(
                    "vertical and horizontal orientation require 3 as grid size, got {other}"
                )))
            }
        }
    }

    pub fn orientation(self) -> Orientation {
        match self {
            ThirdsLayout::Vertical3 => Orientation::Vertical,
            ThirdsLayout::Horizontal3 => Orientation::Horizontal,
            ThirdsLayout::Blocks9 => Orientation::Blocks,
        }
    }

    pub fn grid_size(self) -> u32 {
        match self {
            ThirdsLayout::Vertical3 | ThirdsLayout::Horizontal3 => 3,
            ThirdsLayout::Blocks9 => 9,
        }
    }

    /// Line segments for an image of the given size, in drawing order.
    pub fn segments(self, width: u32, height: u32) -> Vec<Segment> {
        match self {
            ThirdsLayout::Vertical3 => vertical_segments(width, height).to_vec(),
            ThirdsLayout::Horizontal3 => horizontal_segments(width, height).to_vec(),
            ThirdsLayout::Blocks9 => blocks_segments(width, height),
        }
    }
}

/// A straight guide line between two endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        self.start.distance(&self.end)
    }

    /// Evenly spaced points from `start` to `end`, both included.
    ///
    /// One point per whole pixel of length; a single-point segment yields its
    /// midpoint, a sub-pixel segment yields nothing.
    pub fn rasterize(&self) -> Vec<Point> {
        let n = self.length().floor() as usize;

        (0..n)
            .map(|i| {
                let t = if n > 1 {
                    i as f64 / (n - 1) as f64
                } else {
                    0.5
                };
                self.start.lerp(&self.end, t)
            })
            .collect()
    }
}

/// Left line, then right line, both spanning the full height.
fn vertical_segments(width: u32, height: u32) -> [Segment; 2] {
    let third = (width / THIRDS) as f64;
    let right = width as f64 - third;
    let h = height as f64;

    [
        Segment::new(Point::new(third, 0.0), Point::new(third, h)),
        Segment::new(Point::new(right, 0.0), Point::new(right, h)),
    ]
}

/// Top line, then bottom line, both spanning the full width.
fn horizontal_segments(width: u32, height: u32) -> [Segment; 2] {
    let third = (height / THIRDS) as f64;
    let bottom = height as f64 - third;
    let w = width as f64;

    [
        Segment::new(Point::new(0.0, third), Point::new(w, third)),
        Segment::new(Point::new(0.0, bottom), Point::new(w, bottom)),
    ]
}

fn blocks_segments(width: u32, height: u32) -> Vec<Segment> {
    let mut segments = vertical_segments(width, height).to_vec();
    segments.extend(horizontal_segments(width, height));
    segments
}

/// Rasterizes all segments of a layout, concatenated in drawing order.
pub fn thirds_points(layout: ThirdsLayout, width: u32, height: u32) -> Vec<Point> {
    layout
        .segments(width, height)
        .iter()
        .flat_map(Segment::rasterize)
        .collect()
}
