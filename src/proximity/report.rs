//! Composition report: guide metadata plus one proximity result per subject.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use super::ProximityResult;
use crate::guides::{GuideKind, ThirdsLayout};

/// Everything `rot` and `spiral` report for one image.
#[derive(Clone, Debug, Serialize)]
pub struct CompositionReport {
    pub image: PathBuf,
    pub width: u32,
    pub height: u32,
    pub guide_kind: GuideKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<ThirdsLayout>,
    pub guide_points: usize,
    pub results: Vec<ProximityResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotated_image: Option<PathBuf>,
}

impl CompositionReport {
    /// The subject whose center lies closest to a guide, if any.
    pub fn best(&self) -> Option<&ProximityResult> {
        self.results
            .iter()
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    /// Mean center-to-guide distance over all subjects.
    pub fn mean_distance(&self) -> Option<f64> {
        if self.results.is_empty() {
            return None;
        }
        let total: f64 = self.results.iter().map(|r| r.distance).sum();
        Some(total / self.results.len() as f64)
    }
}

impl fmt::Display for CompositionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guide = match (self.guide_kind, self.layout) {
            (GuideKind::ThirdsGrid, Some(layout)) => format!(
                "thirds grid {:?}/{}",
                layout.orientation(),
                layout.grid_size()
            )
            .to_lowercase(),
            (GuideKind::ThirdsGrid, None) => "thirds grid".to_string(),
            (GuideKind::Spiral, _) => "golden spiral".to_string(),
        };

        writeln!(
            f,
            "Composition of {} ({}x{}, {}, {} guide points):",
            self.image.display(),
            self.width,
            self.height,
            guide,
            self.guide_points
        )?;

        if self.results.is_empty() {
            writeln!(f, "  no detections")?;
        }

        for result in &self.results {
            writeln!(
                f,
                "  {} ({:.3}): center {} -> point #{} {}, distance {:.2}",
                result.detection.label,
                result.detection.confidence,
                result.box_center,
                result.point_index,
                result.closest_point,
                result.distance
            )?;
        }

        if let Some(best) = self.best() {
            writeln!(
                f,
                "  best placed: {} (distance {:.2})",
                best.detection.label, best.distance
            )?;
        }
        if let Some(mean) = self.mean_distance() {
            writeln!(f, "  mean distance: {:.2}", mean)?;
        }

        if let Some(path) = &self.annotated_image {
            writeln!(f, "  annotated image: {}", path.display())?;
        }

        Ok(())
    }
}
