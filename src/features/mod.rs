//! Binary keypoint descriptors and image-to-image comparison.
//!
//! Any detector that yields fixed-length binary descriptors compared by
//! Hamming distance can plug in through [`FeatureExtractor`]; the crate ships
//! an ORB-style extractor in [`orb`].

pub mod matcher;
pub mod orb;

use std::path::Path;

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::error::ComposureError;

pub use matcher::{
    compare_descriptors, compare_images, cross_check_matches, Comparison, DescriptorMatch,
    MatchConfig,
};
pub use orb::{OrbConfig, OrbExtractor};

/// Descriptor length in bytes (256 bits).
pub const DESCRIPTOR_BYTES: usize = 32;

/// A 256-bit binary feature descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Descriptor(pub [u8; DESCRIPTOR_BYTES]);

impl Descriptor {
    pub const ZERO: Descriptor = Descriptor([0; DESCRIPTOR_BYTES]);

    /// Number of differing bits.
    #[inline]
    pub fn hamming(&self, other: &Descriptor) -> u32 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a ^ b).count_ones())
            .sum()
    }

    #[inline]
    pub(crate) fn set_bit(&mut self, bit: usize) {
        self.0[bit / 8] |= 1 << (bit % 8);
    }
}

/// The descriptors extracted from one image; may be empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptorSet {
    pub descriptors: Vec<Descriptor>,
}

impl DescriptorSet {
    pub fn new(descriptors: Vec<Descriptor>) -> Self {
        Self { descriptors }
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Descriptor> {
        self.descriptors.iter()
    }
}

impl FromIterator<Descriptor> for DescriptorSet {
    fn from_iter<I: IntoIterator<Item = Descriptor>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Detects salient points in a grayscale image and describes each one.
///
/// Implementations must be deterministic: the same image always yields the
/// same descriptor set.
pub trait FeatureExtractor: Send + Sync {
    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    fn extract(&self, image: &GrayImage) -> DescriptorSet;
}

/// Decodes an image file into 8-bit grayscale.
pub fn load_grayscale(path: &Path) -> Result<GrayImage, ComposureError> {
    let image = image::open(path).map_err(|source| ComposureError::ImageDecode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(image.into_luma8())
}

/// Loads an image and extracts its descriptors.
pub fn extract_from_path(
    path: &Path,
    extractor: &dyn FeatureExtractor,
) -> Result<DescriptorSet, ComposureError> {
    tracing::info!(path = %path.display(), extractor = extractor.name(), "extracting features");
    let gray = load_grayscale(path)?;
    Ok(extractor.extract(&gray))
}

/// Fuzz-only entrypoint: runs the default ORB extractor over raw pixels.
#[cfg(feature = "fuzzing")]
pub fn fuzz_extract(width: u32, height: u32, pixels: &[u8]) -> usize {
    let Some(image) = GrayImage::from_raw(width, height, pixels.to_vec()) else {
        return 0;
    };
    OrbExtractor::default().extract(&image).len()
}
