//! Settings file support.
//!
//! A YAML file can supply defaults for every tunable; command-line flags
//! still take precedence. Missing sections and keys fall back to built-in
//! defaults.
//!
//! ```yaml
//! spiral:
//!   resolution: 10000
//!   offset_x: 0.72
//!   offset_y: 0.3
//! matching:
//!   top_k: 10
//!   max_distance: 100.0
//! extractor:
//!   max_features: 500
//!   fast_threshold: 20
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ComposureError;
use crate::features::{MatchConfig, OrbConfig};
use crate::guides::SpiralConfig;

/// All tunables, grouped by pipeline.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub spiral: SpiralConfig,
    pub matching: MatchConfig,
    pub extractor: OrbConfig,
}

impl Settings {
    /// Reads settings from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ComposureError> {
        let file = File::open(path).map_err(ComposureError::Io)?;
        let reader = BufReader::new(file);

        let settings: Settings =
            serde_yaml::from_reader(reader).map_err(|source| ComposureError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads settings from `path` when given, otherwise returns defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ComposureError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn validate(&self) -> Result<(), ComposureError> {
        self.spiral.validate()?;
        self.matching.validate()?;
        if self.extractor.max_features == 0 {
            return Err(ComposureError::invalid_config(
                "extractor.max_features must be at least 1",
            ));
        }
        Ok(())
    }
}
