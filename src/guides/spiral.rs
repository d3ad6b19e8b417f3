//! Golden (logarithmic) spiral fitted into an image.
//!
//! The curve is `x(t) = x0 + a·e^(k·t)·cos t`, `y(t) = y0 + a·e^(k·t)·sin t`
//! with the growth rate `k = 2·ln(φ)/π`, so the radius grows by φ every
//! quarter turn. The anchor `(x0, y0)` is the point the spiral winds into,
//! and `a` is chosen so the curve passes through the origin at `t = θ0`.

use serde::{Deserialize, Serialize};

use crate::error::ComposureError;
use crate::geometry::Point;

/// The golden ratio.
pub const PHI: f64 = 1.618_033_988_749_895;

/// Start of the angle sweep; far enough in that the inner turns collapse
/// onto the anchor.
pub const SWEEP_START: f64 = -20.0;

/// Sampling and placement parameters for the spiral.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpiralConfig {
    /// Number of samples over the angle sweep.
    pub resolution: usize,
    /// Horizontal placement of the anchor, as a fraction of image width.
    pub offset_x: f64,
    /// Vertical placement of the anchor, as a fraction of image height.
    pub offset_y: f64,
}

impl Default for SpiralConfig {
    fn default() -> Self {
        Self {
            resolution: 1000,
            offset_x: 0.72,
            offset_y: 0.30,
        }
    }
}

impl SpiralConfig {
    pub fn validate(&self) -> Result<(), ComposureError> {
        if self.resolution < 2 {
            return Err(ComposureError::invalid_config(format!(
                "spiral resolution must be at least 2, got {}",
                self.resolution
            )));
        }
        if !self.offset_x.is_finite() || !self.offset_y.is_finite() {
            return Err(ComposureError::invalid_config(
                "spiral offsets must be finite numbers",
            ));
        }
        Ok(())
    }
}

/// Constants of the unit golden spiral.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GoldenSpiral {
    pub x0: f64,
    pub y0: f64,
    pub theta0: f64,
    pub k: f64,
    pub a: f64,
}

impl Default for GoldenSpiral {
    fn default() -> Self {
        Self::new()
    }
}

impl GoldenSpiral {
    pub fn new() -> Self {
        let y0 = 1.0 / (2.0 + PHI);
        let x0 = (2.0 * PHI + 1.0) * y0;
        let theta0 = (-y0).atan2(-x0);
        let k = 2.0 * PHI.ln() / std::f64::consts::PI;
        let a = -x0 / ((k * theta0).exp() * theta0.cos());

        Self {
            x0,
            y0,
            theta0,
            k,
            a,
        }
    }

    /// Curve point at angle `t`.
    #[inline]
    pub fn at(&self, t: f64) -> Point {
        let r = self.a * (self.k * t).exp();
        Point::new(self.x0 + r * t.cos(), self.y0 + r * t.sin())
    }

    /// `resolution` evenly spaced angles over `[SWEEP_START, θ0]`, both ends included.
    pub fn sweep(&self, resolution: usize) -> Vec<f64> {
        let span = self.theta0 - SWEEP_START;
        let last = resolution.saturating_sub(1).max(1) as f64;
        (0..resolution)
            .map(|i| SWEEP_START + span * (i as f64 / last))
            .collect()
    }
}

/// Samples the golden spiral and fits it into a `width × height` image.
///
/// The raw curve is scaled uniformly by the smaller of the two axis ratios,
/// so it never exceeds either dimension, then moved so that its anchor
/// sits at `(offset_x · width, offset_y · height)`. Points keep sweep order.
pub fn spiral_points(
    width: u32,
    height: u32,
    config: &SpiralConfig,
) -> Result<Vec<Point>, ComposureError> {
    config.validate()?;

    let spiral = GoldenSpiral::new();
    let raw: Vec<Point> = spiral
        .sweep(config.resolution)
        .into_iter()
        .map(|t| spiral.at(t))
        .collect();

    let max_x = raw.iter().map(|p| p.x.abs()).fold(0.0, f64::max);
    let max_y = raw.iter().map(|p| p.y.abs()).fold(0.0, f64::max);
    if max_x <= 0.0 || max_y <= 0.0 {
        return Err(ComposureError::invalid_config(
            "spiral sweep produced a degenerate curve",
        ));
    }

    let scale = (width as f64 / max_x).min(height as f64 / max_y);
    let offset = Point::new(width as f64 * config.offset_x, height as f64 * config.offset_y);

    Ok(raw
        .into_iter()
        .map(|p| {
            Point::new(
                scale * (p.x - spiral.x0) + offset.x,
                scale * (p.y - spiral.y0) + offset.y,
            )
        })
        .collect())
}
