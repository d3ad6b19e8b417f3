use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use super::SimilarityScore;

/// The ranked outcome of one similarity search.
#[derive(Clone, Debug, Serialize)]
pub struct RankingReport {
    pub query: PathBuf,
    pub folder: PathBuf,
    pub extractor: String,
    /// Best match first.
    pub scores: Vec<SimilarityScore>,
    /// Corpus files that could not be decoded.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<PathBuf>,
}

impl RankingReport {
    /// The highest-scoring corpus image, if any.
    pub fn best(&self) -> Option<&SimilarityScore> {
        self.scores.first()
    }
}

impl fmt::Display for RankingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Most similar images to {}:", self.query.display())?;
        writeln!(f)?;

        if self.scores.is_empty() {
            writeln!(f, "  no images found in {}", self.folder.display())?;
        }

        for entry in &self.scores {
            writeln!(
                f,
                "Image: {}, Similarity Score: {:.2}",
                entry.image_path.display(),
                entry.score
            )?;
        }

        if let Some(best) = self.best() {
            writeln!(f)?;
            writeln!(
                f,
                "Best match: {} ({:.2})",
                best.image_path.display(),
                best.score
            )?;
        }

        if !self.skipped.is_empty() {
            writeln!(f)?;
            writeln!(f, "Skipped {} unreadable image(s):", self.skipped.len())?;
            for path in &self.skipped {
                writeln!(f, "  {}", path.display())?;
            }
        }

        Ok(())
    }
}
