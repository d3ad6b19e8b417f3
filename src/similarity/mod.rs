//! Ranking a corpus folder by visual similarity to a query image.
//!
//! The query is described once; every corpus image is then described and
//! scored independently. Comparisons run on the rayon pool and the results
//! are re-sorted afterwards, so the ranking never depends on completion order.

mod report;

pub use report::RankingReport;

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::ComposureError;
use crate::features::matcher::{log_degenerate, score_descriptors};
use crate::features::{extract_from_path, DescriptorSet, FeatureExtractor, MatchConfig};

/// File extensions considered part of a corpus (case-insensitive).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Similarity of one corpus image to the query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityScore {
    pub image_path: PathBuf,
    /// Always within [0, 1].
    pub score: f64,
}

/// Lists the images directly inside `folder`, sorted by file name.
///
/// The folder is created when it does not exist yet.
pub fn list_corpus(folder: &Path) -> Result<Vec<PathBuf>, ComposureError> {
    if !folder.exists() {
        info!(folder = %folder.display(), "corpus folder missing, creating it");
    }
    fs::create_dir_all(folder)?;

    let mut files = Vec::new();
    for entry in WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(folder = %folder.display(), error = %err, "skipping unreadable corpus entry");
                continue;
            }
        };

        if entry.file_type().is_file() && has_image_extension(entry.path()) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

fn has_image_extension(path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };

    IMAGE_EXTENSIONS
        .iter()
        .any(|allowed| ext.eq_ignore_ascii_case(allowed))
}

/// Sorts by score, highest first; equal scores keep enumeration order.
pub fn sort_scores(mut indexed: Vec<(usize, SimilarityScore)>) -> Vec<SimilarityScore> {
    indexed.sort_by(|(ia, a), (ib, b)| b.score.total_cmp(&a.score).then(ia.cmp(ib)));
    indexed.into_iter().map(|(_, score)| score).collect()
}

/// Ranks corpus images against a query with a given extractor.
pub struct SimilarityRanker<'a> {
    extractor: &'a dyn FeatureExtractor,
    config: MatchConfig,
}

impl<'a> SimilarityRanker<'a> {
    pub fn new(extractor: &'a dyn FeatureExtractor, config: MatchConfig) -> Self {
        Self { extractor, config }
    }

    /// Scores every image in `folder` against `query`, best match first.
    ///
    /// # Errors
    /// An unreadable query image is [`ComposureError::InvalidInput`]. Unreadable
    /// corpus images are skipped with a warning and listed in the report.
    pub fn rank(&self, query: &Path, folder: &Path) -> Result<RankingReport, ComposureError> {
        self.config.validate()?;
        info!(query = %query.display(), folder = %folder.display(), "starting image similarity search");

        let query_set = extract_from_path(query, self.extractor).map_err(|err| {
            ComposureError::InvalidInput {
                path: query.to_path_buf(),
                message: format!("cannot read query image: {err}"),
            }
        })?;
        if query_set.is_empty() {
            warn!(query = %query.display(), "query image has no descriptors; every score will be 0");
        }

        let entries = list_corpus(folder)?;
        let (scores, skipped) = self.rank_entries(&query_set, &entries)?;

        Ok(RankingReport {
            query: query.to_path_buf(),
            folder: folder.to_path_buf(),
            extractor: self.extractor.name().to_string(),
            scores,
            skipped,
        })
    }

    /// Scores the given corpus files against already-extracted query descriptors.
    ///
    /// Returns the ranked scores and the files that could not be read.
    pub fn rank_entries(
        &self,
        query: &DescriptorSet,
        entries: &[PathBuf],
    ) -> Result<(Vec<SimilarityScore>, Vec<PathBuf>), ComposureError> {
        self.config.validate()?;
        let outcomes: Vec<(usize, Result<SimilarityScore, PathBuf>)> = entries
            .par_iter()
            .enumerate()
            .map(|(idx, path)| (idx, self.score_entry(query, path)))
            .collect();

        let mut scored = Vec::with_capacity(outcomes.len());
        let mut skipped = Vec::new();
        for (idx, outcome) in outcomes {
            match outcome {
                Ok(score) => scored.push((idx, score)),
                Err(path) => skipped.push(path),
            }
        }

        Ok((sort_scores(scored), skipped))
    }

    fn score_entry(&self, query: &DescriptorSet, path: &Path) -> Result<SimilarityScore, PathBuf> {
        let candidate = match extract_from_path(path, self.extractor) {
            Ok(set) => set,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping unreadable corpus image");
                return Err(path.to_path_buf());
            }
        };

        let comparison = score_descriptors(query, &candidate, &self.config);
        log_degenerate(&comparison, path);
        debug!(path = %path.display(), ?comparison, "compared corpus image");

        Ok(SimilarityScore {
            image_path: path.to_path_buf(),
            score: comparison.score(),
        })
    }
}
