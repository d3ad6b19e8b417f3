//! Annotated output images: guides, subject boxes and center-to-guide links.

use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use tracing::info;

use crate::error::ComposureError;
use crate::geometry::Point;
use crate::guides::{GuideKind, GuideSet, Segment};
use crate::proximity::ProximityResult;

const GUIDE_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const BOX_COLOR: Rgb<u8> = Rgb([255, 255, 0]);
const CENTER_COLOR: Rgb<u8> = Rgb([0, 0, 255]);

const GUIDE_RADIUS: i64 = 1;
const BOX_RADIUS: i64 = 1;
const CENTER_RADIUS: i64 = 3;

/// Suffix appended to the input stem for the annotated copy.
pub const ANNOTATED_SUFFIX: &str = "-bounded";

/// `dir/photo.jpg` -> `dir/photo-bounded.jpg`; unknown extensions become PNG.
pub fn annotated_path(image: &Path) -> PathBuf {
    let stem = image
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let ext = image
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| ["jpg", "jpeg", "png"].iter().any(|k| e.eq_ignore_ascii_case(k)))
        .unwrap_or("png");
    image.with_file_name(format!("{stem}{ANNOTATED_SUFFIX}.{ext}"))
}

/// Draws the guides and scoring results over a copy of `image` and saves it to `out`.
pub fn render_annotated(
    image: &Path,
    guides: &GuideSet,
    results: &[ProximityResult],
    out: &Path,
) -> Result<(), ComposureError> {
    let mut canvas = image::open(image)
        .map_err(|source| ComposureError::ImageDecode {
            path: image.to_path_buf(),
            source,
        })?
        .into_rgb8();

    draw_guides(&mut canvas, guides);
    for result in results {
        draw_result(&mut canvas, result);
    }

    canvas
        .save(out)
        .map_err(|source| ComposureError::ImageWrite {
            path: out.to_path_buf(),
            source,
        })?;
    info!(path = %out.display(), "saved annotated image");
    Ok(())
}

/// Spiral samples are joined into a curve; grid points are dense enough to stamp.
pub fn draw_guides(canvas: &mut RgbImage, guides: &GuideSet) {
    match guides.kind {
        GuideKind::Spiral => {
            for pair in guides.points.windows(2) {
                draw_segment(canvas, Segment::new(pair[0], pair[1]), GUIDE_RADIUS, GUIDE_COLOR);
            }
        }
        GuideKind::ThirdsGrid => {
            for point in &guides.points {
                stamp(canvas, *point, GUIDE_RADIUS, GUIDE_COLOR);
            }
        }
    }
}

pub fn draw_result(canvas: &mut RgbImage, result: &ProximityResult) {
    let bbox = &result.detection.bbox;
    let corners = [
        Point::new(bbox.xmin(), bbox.ymin()),
        Point::new(bbox.xmax(), bbox.ymin()),
        Point::new(bbox.xmax(), bbox.ymax()),
        Point::new(bbox.xmin(), bbox.ymax()),
    ];
    for i in 0..corners.len() {
        let edge = Segment::new(corners[i], corners[(i + 1) % corners.len()]);
        draw_segment(canvas, edge, BOX_RADIUS, BOX_COLOR);
    }

    draw_segment(
        canvas,
        Segment::new(result.box_center, result.closest_point),
        BOX_RADIUS,
        BOX_COLOR,
    );
    stamp(canvas, result.box_center, CENTER_RADIUS, CENTER_COLOR);
}

/// Only the part of `segment` within brush reach of the canvas is rasterized.
fn draw_segment(canvas: &mut RgbImage, segment: Segment, radius: i64, color: Rgb<u8>) {
    let Some(visible) = clip_to_canvas(segment, canvas, radius) else {
        return;
    };
    stamp(canvas, visible.start, radius, color);
    for point in visible.rasterize() {
        stamp(canvas, point, radius, color);
    }
    stamp(canvas, visible.end, radius, color);
}

/// Liang-Barsky clip against the canvas grown by `margin` on every side.
///
/// `None` when the segment misses that rectangle or is not finite.
fn clip_to_canvas(segment: Segment, canvas: &RgbImage, margin: i64) -> Option<Segment> {
    if !(segment.start.is_finite() && segment.end.is_finite()) {
        return None;
    }
    let margin = margin as f64 + 1.0;
    let (xmin, ymin) = (-margin, -margin);
    let xmax = canvas.width() as f64 - 1.0 + margin;
    let ymax = canvas.height() as f64 - 1.0 + margin;

    let (x0, y0) = (segment.start.x, segment.start.y);
    let (dx, dy) = (segment.end.x - x0, segment.end.y - y0);
    let mut t0: f64 = 0.0;
    let mut t1: f64 = 1.0;

    for (p, q) in [
        (-dx, x0 - xmin),
        (dx, xmax - x0),
        (-dy, y0 - ymin),
        (dy, ymax - y0),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }

    Some(Segment::new(
        segment.start.lerp(&segment.end, t0),
        segment.start.lerp(&segment.end, t1),
    ))
}

/// Fills a square brush around `point`, clipped to the canvas.
fn stamp(canvas: &mut RgbImage, point: Point, radius: i64, color: Rgb<u8>) {
    if !point.is_finite() {
        return;
    }
    let (w, h) = (canvas.width() as i64, canvas.height() as i64);
    let (cx, cy) = (point.x.round() as i64, point.y.round() as i64);

    for y in (cy - radius).max(0)..=(cy + radius).min(h - 1) {
        for x in (cx - radius).max(0)..=(cx + radius).min(w - 1) {
            canvas.put_pixel(x as u32, y as u32, color);
        }
    }
}
