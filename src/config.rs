// WHY: One validated configuration shared by every file in a run
// Layered as defaults -> optional JSON file -> CLI overrides

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{Result, SplitError};

/// Default paragraph threshold in words
pub const DEFAULT_MAX_WORDS: usize = 10;

/// Settings consumed by the paragraph splitter and the archive processor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SplitConfig {
    /// Paragraphs with more words than this are split by sentences
    pub max_words_per_paragraph: usize,
    /// Merge adjacent equally-styled paragraphs before splitting
    pub merge_before_splitting: bool,
    /// Copy the original archive to `<path>.bak` before rewriting it
    pub backup: bool,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            max_words_per_paragraph: DEFAULT_MAX_WORDS,
            merge_before_splitting: false,
            backup: false,
        }
    }
}

/// Optional overrides, typically from the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub max_words_per_paragraph: Option<usize>,
    pub merge_before_splitting: Option<bool>,
    pub backup: Option<bool>,
}

impl SplitConfig {
    /// Reject values that would make splitting meaningless
    pub fn validate(&self) -> Result<()> {
        if self.max_words_per_paragraph == 0 {
            return Err(SplitError::InvalidConfiguration(
                "max_words_per_paragraph must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }

    /// Read a JSON config file; missing fields take their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| SplitError::io(path, e))?;
        let config: SplitConfig = serde_json::from_str(&content).map_err(|e| {
            SplitError::InvalidConfiguration(format!("{}: {}", path.display(), e))
        })?;
        debug!(?config, "Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Self {
        if let Some(max_words) = overrides.max_words_per_paragraph {
            self.max_words_per_paragraph = max_words;
        }
        if let Some(merge) = overrides.merge_before_splitting {
            self.merge_before_splitting = merge;
        }
        if let Some(backup) = overrides.backup {
            self.backup = backup;
        }
        self
    }

    /// Resolve defaults, optional file, and overrides into a validated config
    pub fn resolve(file: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        let base = match file {
            Some(path) => Self::from_json_file(path)?,
            None => Self::default(),
        };
        let config = base.with_overrides(overrides);
        config.validate()?;
        info!(
            max_words = config.max_words_per_paragraph,
            merge = config.merge_before_splitting,
            backup = config.backup,
            "Configuration resolved"
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = SplitConfig::default();
        assert_eq!(config.max_words_per_paragraph, 10);
        assert!(!config.merge_before_splitting);
        assert!(!config.backup);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_threshold_is_rejected() {
        let config = SplitConfig {
            max_words_per_paragraph: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(SplitError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_json_file_with_partial_fields() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("parasplit.json");
        std::fs::write(&path, r#"{"merge_before_splitting": true}"#).unwrap();

        let config = SplitConfig::from_json_file(&path).unwrap();
        assert_eq!(config.max_words_per_paragraph, DEFAULT_MAX_WORDS);
        assert!(config.merge_before_splitting);
    }

    #[test]
    fn test_non_integer_threshold_in_file_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.json");
        std::fs::write(&path, r#"{"max_words_per_paragraph": 2.5}"#).unwrap();
        assert!(matches!(
            SplitConfig::from_json_file(&path),
            Err(SplitError::InvalidConfiguration(_))
        ));

        std::fs::write(&path, r#"{"max_words_per_paragraph": -3}"#).unwrap();
        assert!(SplitConfig::from_json_file(&path).is_err());
    }

    #[test]
    fn test_overrides_win_over_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("parasplit.json");
        std::fs::write(&path, r#"{"max_words_per_paragraph": 40, "backup": true}"#).unwrap();

        let overrides = ConfigOverrides {
            max_words_per_paragraph: Some(25),
            ..Default::default()
        };
        let config = SplitConfig::resolve(Some(&path), &overrides).unwrap();
        assert_eq!(config.max_words_per_paragraph, 25);
        assert!(config.backup);
    }

    #[test]
    fn test_resolve_validates_after_overrides() {
        let overrides = ConfigOverrides {
            max_words_per_paragraph: Some(0),
            ..Default::default()
        };
        assert!(SplitConfig::resolve(None, &overrides).is_err());
    }
}
