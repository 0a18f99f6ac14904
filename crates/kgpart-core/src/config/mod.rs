//! Configuration management for kgpart.
//!
//! Configuration is loaded from multiple sources with the following priority:
//! 1. Environment variables (highest priority)
//! 2. Project-local `kgpart.toml` file
//! 3. User config `~/.config/kgpart/config.toml`
//! 4. Built-in defaults (lowest priority)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

mod defaults;

pub use defaults::*;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// On-disk workspace layout.
    pub workspace: WorkspaceConfig,

    /// Coverage validation configuration.
    pub validation: ValidationConfig,

    /// Similarity check configuration.
    pub similarity: SimilarityConfig,

    /// Master ontology merge configuration.
    pub merge: MergeConfig,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Searches for config in order:
    /// 1. `./kgpart.toml` (project local)
    /// 2. `~/.config/kgpart/config.toml` (user config)
    /// 3. Falls back to defaults
    pub fn load() -> Result<Self, ConfigError> {
        if Path::new(LOCAL_CONFIG_FILE).exists() {
            return Self::from_file(LOCAL_CONFIG_FILE);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("kgpart").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("KGPART_DATA_DIR") {
            self.workspace.data_dir = dir;
        }
        if let Ok(dir) = std::env::var("KGPART_PARTITIONS_DIR") {
            self.workspace.partitions_dir = dir;
        }
        if let Ok(dir) = std::env::var("KGPART_ONTOLOGIES_DIR") {
            self.workspace.ontologies_dir = dir;
        }
        if let Ok(threshold) = std::env::var("KGPART_SIMILARITY_THRESHOLD") {
            if let Ok(n) = threshold.parse() {
                self.similarity.threshold = n;
            }
        }
    }

    /// Reject values the core cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.similarity.validate()?;
        if self.merge.initial_version.parse::<crate::ontology::Version>().is_err() {
            return Err(ConfigError::Invalid(format!(
                "merge.initial_version '{}' is not MAJOR.MINOR.PATCH",
                self.merge.initial_version
            )));
        }
        Ok(())
    }

    /// Create a default config file content as a string.
    pub fn default_config_string() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Workspace layout configuration.
///
/// Every directory is resolved relative to the workspace root passed to
/// [`WorkspaceConfig::data_path`] and friends.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Directory containing one subdirectory per data source.
    pub data_dir: String,

    /// Directory containing partition documents, grouped by data source.
    pub partitions_dir: String,

    /// Directory containing master ontologies, grouped by data source.
    pub ontologies_dir: String,

    /// Version control metadata directories skipped when walking data.
    pub vcs_dirs: Vec<String>,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            data_dir: DEFAULT_DATA_DIR.to_string(),
            partitions_dir: DEFAULT_PARTITIONS_DIR.to_string(),
            ontologies_dir: DEFAULT_ONTOLOGIES_DIR.to_string(),
            vcs_dirs: DEFAULT_VCS_DIRS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl WorkspaceConfig {
    /// Get the full path to the data directory.
    pub fn data_path(&self, root: &Path) -> PathBuf {
        root.join(&self.data_dir)
    }

    /// Get the full path to a data source's partition directory.
    pub fn partitions_path(&self, root: &Path, data_source: &str) -> PathBuf {
        root.join(&self.partitions_dir).join(data_source)
    }

    /// Get the full path to a data source's ontology directory.
    pub fn ontologies_path(&self, root: &Path, data_source: &str) -> PathBuf {
        root.join(&self.ontologies_dir).join(data_source)
    }
}

/// Coverage validation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Missing files listed in the agent feedback before truncation.
    pub feedback_preview_limit: usize,

    /// Missing files listed in the printed summary before truncation.
    pub summary_preview_limit: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            feedback_preview_limit: DEFAULT_FEEDBACK_PREVIEW_LIMIT,
            summary_preview_limit: DEFAULT_SUMMARY_PREVIEW_LIMIT,
        }
    }
}

/// Similarity check configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    /// Minimum combined score for a candidate to be reported (inclusive).
    pub threshold: f64,

    /// Combined score above which reuse is recommended without review.
    pub strong_match: f64,

    /// Weight of the type-name score in the combined score.
    pub type_weight: f64,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_SIMILARITY_THRESHOLD,
            strong_match: DEFAULT_STRONG_MATCH,
            type_weight: DEFAULT_TYPE_WEIGHT,
        }
    }
}

impl SimilarityConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("similarity.threshold", self.threshold),
            ("similarity.strong_match", self.strong_match),
            ("similarity.type_weight", self.type_weight),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Master ontology merge configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Separator placed between description fragments.
    pub description_separator: String,

    /// Version assigned to a freshly created master ontology.
    pub initial_version: String,

    /// Save and bump the version even when a merge changes nothing.
    pub bump_unchanged: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            description_separator: DEFAULT_DESCRIPTION_SEPARATOR.to_string(),
            initial_version: DEFAULT_INITIAL_VERSION.to_string(),
            bump_unchanged: true,
        }
    }
}
