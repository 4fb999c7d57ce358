// ⚙️ Rollup Configuration - Thresholds and vocabulary extensions as data

use crate::error::{Error, Result};
use crate::vocabulary::VocabularyOverrides;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default appearance ceiling: a "witness" at more hearings than this is
/// taken to be a mislabeled presiding officer
pub const DEFAULT_MAX_APPEARANCES: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RollupConfig {
    /// Fixed appearance ceiling
    pub max_appearances: usize,

    /// Optional ceiling as a fraction of the corpus's distinct hearings.
    /// When set, the lower of the two ceilings applies.
    pub max_appearance_ratio: Option<f64>,

    /// Extra titles, suffixes, places, and non-name fragments
    pub vocabulary: VocabularyOverrides,
}

impl Default for RollupConfig {
    fn default() -> Self {
        RollupConfig {
            max_appearances: DEFAULT_MAX_APPEARANCES,
            max_appearance_ratio: None,
            vocabulary: VocabularyOverrides::default(),
        }
    }
}

impl RollupConfig {
    /// Load config from a JSON file (missing fields take defaults)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: RollupConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_appearances == 0 {
            return Err(Error::Config(
                "max_appearances must be at least 1".to_string(),
            ));
        }

        if let Some(ratio) = self.max_appearance_ratio {
            if !(ratio > 0.0 && ratio <= 1.0) {
                return Err(Error::Config(format!(
                    "max_appearance_ratio must be in (0, 1], got {}",
                    ratio
                )));
            }
        }

        Ok(())
    }

    /// Ceiling to apply for a corpus of `total_hearings` distinct hearings
    pub fn effective_ceiling(&self, total_hearings: usize) -> usize {
        match self.max_appearance_ratio {
            Some(ratio) => {
                let scaled = (ratio * total_hearings as f64).ceil() as usize;
                self.max_appearances.min(scaled.max(1))
            }
            None => self.max_appearances,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
