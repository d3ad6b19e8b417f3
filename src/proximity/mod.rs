//! Nearest-guide-point scoring for detected subjects.
//!
//! For every detection the box center is compared against every guide point
//! (a full linear scan, no spatial index) and the closest one is reported.
//! Ties keep the first point in guide order.

mod report;

pub use report::CompositionReport;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ComposureError;
use crate::geometry::{Detection, Point};

/// The guide point nearest to some target.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClosestPoint {
    /// Position of the point within the guide sequence.
    pub index: usize,
    pub point: Point,
    pub distance: f64,
}

/// Finds the guide point nearest to `target`.
///
/// # Errors
/// Returns [`ComposureError::EmptyGuideSet`] when `points` is empty.
pub fn closest_point(points: &[Point], target: Point) -> Result<ClosestPoint, ComposureError> {
    let (first, rest) = points.split_first().ok_or(ComposureError::EmptyGuideSet)?;

    let mut best = ClosestPoint {
        index: 0,
        point: *first,
        distance: first.distance(&target),
    };
    for (offset, point) in rest.iter().enumerate() {
        let distance = point.distance(&target);
        if distance < best.distance {
            best = ClosestPoint {
                index: offset + 1,
                point: *point,
                distance,
            };
        }
    }

    Ok(best)
}

/// How one detection relates to the guides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProximityResult {
    pub detection: Detection,
    pub closest_point: Point,
    pub point_index: usize,
    pub box_center: Point,
    pub distance: f64,
}

/// Scores a single detection against the guide points.
pub fn score_detection(
    points: &[Point],
    detection: &Detection,
) -> Result<ProximityResult, ComposureError> {
    if !detection.bbox.is_finite() {
        return Err(ComposureError::NonFiniteDetection {
            label: detection.label.clone(),
        });
    }

    let box_center = detection.bbox.center();
    let closest = closest_point(points, box_center)?;

    Ok(ProximityResult {
        detection: detection.clone(),
        closest_point: closest.point,
        point_index: closest.index,
        box_center,
        distance: closest.distance,
    })
}

/// Scores every detection independently; one result per detection, in input order.
pub fn score_detections(
    points: &[Point],
    detections: &[Detection],
) -> Result<Vec<ProximityResult>, ComposureError> {
    if points.is_empty() {
        return Err(ComposureError::EmptyGuideSet);
    }

    detections
        .iter()
        .map(|detection| {
            let result = score_detection(points, detection)?;
            debug!(
                label = %detection.label,
                point_index = result.point_index,
                distance = result.distance,
                "scored detection"
            );
            Ok(result)
        })
        .collect()
}
