use composure::geometry::Point;
use composure::guides::{GuideSet, SpiralConfig, ThirdsLayout};
use composure::proximity::{closest_point, score_detections};
use proptest::prelude::*;

mod proptest_helpers;

fn arb_fixture() -> impl Strategy<Value = (Vec<Point>, Point)> {
    proptest_helpers::arb_dimensions().prop_flat_map(|(w, h)| {
        (
            proptest::collection::vec(proptest_helpers::arb_point_within(w, h), 1..64),
            proptest_helpers::arb_point_within(w, h),
        )
    })
}

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn closest_point_matches_brute_force((points, target) in arb_fixture()) {
        let found = closest_point(&points, target).expect("non-empty points");
        let (idx, distance) = proptest_helpers::brute_force_nearest(&points, target).expect("non-empty");

        prop_assert_eq!(found.index, idx);
        prop_assert_eq!(found.point, points[idx]);
        prop_assert_eq!(found.distance, distance);
    }

    #[test]
    fn duplicated_points_resolve_to_the_first(
        (mut points, target) in arb_fixture()
    ) {
        let copy = points.clone();
        points.extend(copy);
        let found = closest_point(&points, target).expect("non-empty points");
        prop_assert!(found.index < points.len() / 2);
    }

    #[test]
    fn every_detection_gets_a_true_minimum(
        (w, h, detections) in proptest_helpers::arb_dimensions().prop_flat_map(|(w, h)| {
            (
                Just(w),
                Just(h),
                proptest::collection::vec(proptest_helpers::arb_detection_within(w, h), 0..8),
            )
        })
    ) {
        let spiral = GuideSet::golden_spiral(w, h, &SpiralConfig { resolution: 200, ..SpiralConfig::default() })
            .expect("spiral");
        let grid = GuideSet::thirds_grid(w.min(256), h.min(256), ThirdsLayout::Blocks9).expect("grid");

        for guides in [spiral, grid] {
            let results = score_detections(&guides.points, &detections).expect("score");
            prop_assert_eq!(results.len(), detections.len());

            for (result, detection) in results.iter().zip(&detections) {
                prop_assert_eq!(&result.detection, detection);
                prop_assert_eq!(result.box_center, detection.bbox.center());
                let (idx, distance) =
                    proptest_helpers::brute_force_nearest(&guides.points, result.box_center).expect("non-empty");
                prop_assert_eq!(result.point_index, idx);
                prop_assert_eq!(result.distance, distance);
                prop_assert!(guides.points.iter().all(|p| p.distance(&result.box_center) >= result.distance));
            }
        }
    }
}
