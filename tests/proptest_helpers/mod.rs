#![allow(dead_code)]

use composure::geometry::{BBoxXYXY, Detection, Pixel, Point};
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(128);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

pub fn arb_dimensions() -> BoxedStrategy<(u32, u32)> {
    (1u32..=4096, 1u32..=4096).boxed()
}

pub fn arb_point_within(width: u32, height: u32) -> BoxedStrategy<Point> {
    (0.0..=width as f64, 0.0..=height as f64)
        .prop_map(|(x, y)| Point::new(x, y))
        .boxed()
}

pub fn arb_detection_within(width: u32, height: u32) -> BoxedStrategy<Detection> {
    (
        "[a-z]{1,12}",
        0.0f64..=1.0,
        arb_point_within(width, height),
        arb_point_within(width, height),
    )
        .prop_map(|(label, confidence, a, b)| {
            let bbox = BBoxXYXY::<Pixel>::from_xyxy(
                a.x.min(b.x),
                a.y.min(b.y),
                a.x.max(b.x),
                a.y.max(b.y),
            );
            Detection::new(label, confidence, bbox)
        })
        .boxed()
}

/// Index of the nearest point by exhaustive search; first wins on ties.
pub fn brute_force_nearest(points: &[Point], target: Point) -> Option<(usize, f64)> {
    let distances: Vec<f64> = points.iter().map(|p| p.distance(&target)).collect();
    let min = distances.iter().copied().fold(f64::INFINITY, f64::min);
    let idx = distances.iter().position(|&d| d == min)?;
    Some((idx, min))
}
