//! ORB-style extractor: FAST-9 corners, intensity-centroid orientation and
//! a 256-bit BRIEF descriptor steered by that orientation.

use image::{imageops, GrayImage};
use rand::{rngs::StdRng, RngExt, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Descriptor, DescriptorSet, FeatureExtractor, DESCRIPTOR_BYTES};

/// Radius of the disk BRIEF pairs and the orientation moments are taken from.
const PATCH_RADIUS: i32 = 15;

/// Keypoints must sit at least this far from every image edge.
const EDGE: i32 = PATCH_RADIUS + 1;

/// Contiguous circle pixels required by the segment test.
const FAST_ARC: usize = 9;

/// Bresenham circle of radius 3 around the candidate, clockwise from 12 o'clock.
const FAST_CIRCLE: [(i32, i32); 16] = [
    (0, -3),
    (1, -3),
    (2, -2),
    (3, -1),
    (3, 0),
    (3, 1),
    (2, 2),
    (1, 3),
    (0, 3),
    (-1, 3),
    (-2, 2),
    (-3, 1),
    (-3, 0),
    (-3, -1),
    (-2, -2),
    (-1, -3),
];

const PATTERN_SEED: u64 = 0x0B5E_55ED_B41E_F256;

const BLUR_SIGMA: f32 = 2.0;

/// Extractor settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbConfig {
    /// Keep at most this many keypoints, strongest first.
    pub max_features: usize,
    /// Intensity difference for a circle pixel to count as brighter/darker.
    pub fast_threshold: u8,
    /// Steer the sampling pattern by keypoint orientation.
    pub oriented: bool,
}

impl Default for OrbConfig {
    fn default() -> Self {
        Self {
            max_features: 500,
            fast_threshold: 20,
            oriented: true,
        }
    }
}

/// A detected corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keypoint {
    pub x: i32,
    pub y: i32,
    pub response: u32,
    /// Orientation in radians; zero when the extractor is upright.
    pub angle: f32,
}

#[derive(Clone, Copy, Debug)]
struct PatternPair {
    p: (f32, f32),
    q: (f32, f32),
}

/// FAST + BRIEF feature extractor.
#[derive(Clone, Debug)]
pub struct OrbExtractor {
    config: OrbConfig,
    pattern: Vec<PatternPair>,
}

impl Default for OrbExtractor {
    fn default() -> Self {
        Self::new(OrbConfig::default())
    }
}

impl OrbExtractor {
    pub fn new(config: OrbConfig) -> Self {
        Self {
            config,
            pattern: sampling_pattern(),
        }
    }

    /// Upright variant: BRIEF without orientation steering.
    pub fn upright(config: OrbConfig) -> Self {
        Self::new(OrbConfig {
            oriented: false,
            ..config
        })
    }

    pub fn config(&self) -> &OrbConfig {
        &self.config
    }

    /// Detects, suppresses and ranks FAST corners, then assigns orientation.
    pub fn detect(&self, image: &GrayImage, smoothed: &GrayImage) -> Vec<Keypoint> {
        let (w, h) = (image.width() as i32, image.height() as i32);
        if w <= 2 * EDGE || h <= 2 * EDGE {
            return Vec::new();
        }

        let responses = fast_responses(image, self.config.fast_threshold);
        let mut keypoints = Vec::new();
        for y in EDGE..h - EDGE {
            for x in EDGE..w - EDGE {
                let response = responses[(y * w + x) as usize];
                if response > 0 && is_local_max(&responses, w, x, y, response) {
                    keypoints.push(Keypoint {
                        x,
                        y,
                        response,
                        angle: 0.0,
                    });
                }
            }
        }

        // Stable sort keeps raster order among equal responses.
        keypoints.sort_by(|a, b| b.response.cmp(&a.response));
        keypoints.truncate(self.config.max_features);

        if self.config.oriented {
            for kp in &mut keypoints {
                kp.angle = intensity_centroid_angle(smoothed, kp.x, kp.y);
            }
        }

        keypoints
    }

    /// Builds one descriptor per keypoint from the smoothed image.
    pub fn describe(&self, smoothed: &GrayImage, keypoints: &[Keypoint]) -> DescriptorSet {
        keypoints
            .iter()
            .map(|kp| {
                let (sin, cos) = kp.angle.sin_cos();
                let mut descriptor = Descriptor::ZERO;
                for (bit, pair) in self.pattern.iter().enumerate() {
                    let a = sample_rotated(smoothed, kp, pair.p, sin, cos);
                    let b = sample_rotated(smoothed, kp, pair.q, sin, cos);
                    if a < b {
                        descriptor.set_bit(bit);
                    }
                }
                descriptor
            })
            .collect()
    }
}

impl FeatureExtractor for OrbExtractor {
    fn name(&self) -> &'static str {
        if self.config.oriented {
            "orb"
        } else {
            "brief"
        }
    }

    fn extract(&self, image: &GrayImage) -> DescriptorSet {
        let smoothed = imageops::blur(image, BLUR_SIGMA);
        let keypoints = self.detect(image, &smoothed);
        let descriptors = self.describe(&smoothed, &keypoints);
        debug!(
            extractor = self.name(),
            width = image.width(),
            height = image.height(),
            keypoints = keypoints.len(),
            "extracted descriptors"
        );
        descriptors
    }
}

/// Fixed BRIEF test pairs, uniformly drawn from the patch disk.
///
/// Keeping every point inside the disk means rotated pairs never leave it.
fn sampling_pattern() -> Vec<PatternPair> {
    let mut rng = StdRng::seed_from_u64(PATTERN_SEED);
    let mut point = || loop {
        let x = rng.random_range(-PATCH_RADIUS..=PATCH_RADIUS);
        let y = rng.random_range(-PATCH_RADIUS..=PATCH_RADIUS);
        if x * x + y * y <= PATCH_RADIUS * PATCH_RADIUS {
            return (x as f32, y as f32);
        }
    };

    (0..DESCRIPTOR_BYTES * 8)
        .map(|_| PatternPair {
            p: point(),
            q: point(),
        })
        .collect()
}

/// Segment-test response per pixel; zero where the pixel is not a corner.
///
/// The response is the summed excess contrast of the circle over the threshold.
fn fast_responses(image: &GrayImage, threshold: u8) -> Vec<u32> {
    let (w, h) = (image.width() as i32, image.height() as i32);
    let data = image.as_raw();
    let mut responses = vec![0u32; (w * h) as usize];
    let t = threshold as i32;

    for y in 3..h - 3 {
        for x in 3..w - 3 {
            let center = data[(y * w + x) as usize] as i32;
            let mut ring = [0i32; 16];
            for (slot, (dx, dy)) in ring.iter_mut().zip(FAST_CIRCLE.iter()) {
                *slot = data[((y + dy) * w + (x + dx)) as usize] as i32;
            }

            let brighter = longest_arc(&ring, |v| v > center + t);
            let darker = longest_arc(&ring, |v| v < center - t);
            if brighter >= FAST_ARC || darker >= FAST_ARC {
                responses[(y * w + x) as usize] = ring
                    .iter()
                    .map(|&v| ((v - center).abs() - t).max(0) as u32)
                    .sum::<u32>()
                    .max(1);
            }
        }
    }

    responses
}

/// Longest run of ring pixels satisfying `pred`, wrapping around.
fn longest_arc(ring: &[i32; 16], pred: impl Fn(i32) -> bool) -> usize {
    let mut best = 0;
    let mut run = 0;
    for i in 0..32 {
        if pred(ring[i % 16]) {
            run += 1;
            best = best.max(run);
        } else {
            run = 0;
        }
    }
    best.min(16)
}

/// 3x3 non-maximum suppression; plateaus keep their first pixel in raster order.
fn is_local_max(responses: &[u32], w: i32, x: i32, y: i32, response: u32) -> bool {
    for dy in -1..=1 {
        for dx in -1..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let neighbour = responses[((y + dy) * w + (x + dx)) as usize];
            let earlier = dy < 0 || (dy == 0 && dx < 0);
            if neighbour > response || (earlier && neighbour == response) {
                return false;
            }
        }
    }
    true
}

fn intensity_centroid_angle(image: &GrayImage, cx: i32, cy: i32) -> f32 {
    let w = image.width() as i32;
    let data = image.as_raw();
    let (mut m10, mut m01) = (0i64, 0i64);

    for dy in -PATCH_RADIUS..=PATCH_RADIUS {
        for dx in -PATCH_RADIUS..=PATCH_RADIUS {
            if dx * dx + dy * dy > PATCH_RADIUS * PATCH_RADIUS {
                continue;
            }
            let v = data[((cy + dy) * w + (cx + dx)) as usize] as i64;
            m10 += dx as i64 * v;
            m01 += dy as i64 * v;
        }
    }

    (m01 as f32).atan2(m10 as f32)
}

fn sample_rotated(image: &GrayImage, kp: &Keypoint, offset: (f32, f32), sin: f32, cos: f32) -> u8 {
    let (ox, oy) = offset;
    let rx = (cos * ox - sin * oy).round() as i32;
    let ry = (sin * ox + cos * oy).round() as i32;
    let x = (kp.x + rx).clamp(0, image.width() as i32 - 1);
    let y = (kp.y + ry).clamp(0, image.height() as i32 - 1);
    image.as_raw()[(y * image.width() as i32 + x) as usize]
}
