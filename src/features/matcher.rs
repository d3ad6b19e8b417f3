//! Brute-force Hamming matching with a cross-check, reduced to a [0, 1] score.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{extract_from_path, Descriptor, DescriptorSet, FeatureExtractor};
use crate::error::ComposureError;

/// Scoring parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// How many of the closest matches are averaged.
    pub top_k: usize,
    /// Mean distance that maps to a score of zero.
    pub max_distance: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            top_k: 10,
            max_distance: 100.0,
        }
    }
}

impl MatchConfig {
    pub fn validate(&self) -> Result<(), ComposureError> {
        if self.top_k == 0 {
            return Err(ComposureError::invalid_config("top_k must be at least 1"));
        }
        if !(self.max_distance.is_finite() && self.max_distance > 0.0) {
            return Err(ComposureError::invalid_config(format!(
                "max_distance must be a positive number, got {}",
                self.max_distance
            )));
        }
        Ok(())
    }
}

/// A mutual nearest-neighbour pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptorMatch {
    /// Index into the first set.
    pub query: usize,
    /// Index into the second set.
    pub train: usize,
    pub distance: u32,
}

/// Outcome of comparing two descriptor sets.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Comparison {
    Scored {
        score: f64,
        matches: usize,
        mean_distance: f64,
    },
    /// One or both images produced no descriptors.
    NoDescriptors,
    /// Descriptors exist but no pair survived the cross-check.
    NoMutualMatches,
}

impl Comparison {
    /// Similarity in [0, 1]; the degenerate outcomes score zero.
    pub fn score(&self) -> f64 {
        match *self {
            Comparison::Scored { score, .. } => score,
            Comparison::NoDescriptors | Comparison::NoMutualMatches => 0.0,
        }
    }
}

/// Index and distance of the closest descriptor in `set`; ties keep the first.
fn nearest(descriptor: &Descriptor, set: &DescriptorSet) -> Option<(usize, u32)> {
    let mut best: Option<(usize, u32)> = None;
    for (idx, candidate) in set.iter().enumerate() {
        let distance = descriptor.hamming(candidate);
        match best {
            Some((_, d)) if distance >= d => {}
            _ => best = Some((idx, distance)),
        }
    }
    best
}

/// Matches each descriptor of `a` to its nearest in `b`, keeping only pairs
/// where the descriptor of `b` also picks that descriptor of `a` back.
///
/// Matches come out in `a` order.
pub fn cross_check_matches(a: &DescriptorSet, b: &DescriptorSet) -> Vec<DescriptorMatch> {
    let back: Vec<Option<usize>> = b
        .iter()
        .map(|descriptor| nearest(descriptor, a).map(|(idx, _)| idx))
        .collect();

    a.iter()
        .enumerate()
        .filter_map(|(query, descriptor)| {
            let (train, distance) = nearest(descriptor, b)?;
            (back[train] == Some(query)).then_some(DescriptorMatch {
                query,
                train,
                distance,
            })
        })
        .collect()
}

/// Scores two descriptor sets.
///
/// The `top_k` smallest match distances are averaged and mapped through
/// `1 - mean / max_distance`, clamped to [0, 1].
///
/// # Errors
/// [`ComposureError::InvalidConfiguration`] when `config` fails
/// [`MatchConfig::validate`].
pub fn compare_descriptors(
    a: &DescriptorSet,
    b: &DescriptorSet,
    config: &MatchConfig,
) -> Result<Comparison, ComposureError> {
    config.validate()?;
    Ok(score_descriptors(a, b, config))
}

/// [`compare_descriptors`] for an already validated `config`.
pub(crate) fn score_descriptors(
    a: &DescriptorSet,
    b: &DescriptorSet,
    config: &MatchConfig,
) -> Comparison {
    if a.is_empty() || b.is_empty() {
        return Comparison::NoDescriptors;
    }

    let mut matches = cross_check_matches(a, b);
    if matches.is_empty() {
        return Comparison::NoMutualMatches;
    }

    matches.sort_by_key(|m| m.distance);
    let top = &matches[..config.top_k.min(matches.len())];
    let mean_distance = top.iter().map(|m| m.distance as f64).sum::<f64>() / top.len() as f64;
    let score = (1.0 - mean_distance / config.max_distance).clamp(0.0, 1.0);

    Comparison::Scored {
        score,
        matches: matches.len(),
        mean_distance,
    }
}

/// Loads both images, extracts descriptors and scores them.
///
/// Degenerate comparisons are logged and score zero; unreadable images and
/// an invalid `config` are errors.
pub fn compare_images(
    first: &Path,
    second: &Path,
    extractor: &dyn FeatureExtractor,
    config: &MatchConfig,
) -> Result<Comparison, ComposureError> {
    config.validate()?;
    let a = extract_from_path(first, extractor)?;
    let b = extract_from_path(second, extractor)?;

    info!(first = %first.display(), second = %second.display(), "comparing images");
    let comparison = score_descriptors(&a, &b, config);
    log_degenerate(&comparison, second);
    Ok(comparison)
}

pub(crate) fn log_degenerate(comparison: &Comparison, path: &Path) {
    match comparison {
        Comparison::NoDescriptors => {
            warn!(path = %path.display(), "no descriptors found in one or both images")
        }
        Comparison::NoMutualMatches => {
            warn!(path = %path.display(), "no matches found between the two images")
        }
        Comparison::Scored { .. } => {}
    }
}
