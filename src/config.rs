//! Configuration for graph sessions and import runs.
//!
//! [`GraphConfig`] names the database explicitly; there is no implicit
//! default location. [`ImportConfig`] can be loaded from a TOML file, with
//! every key optional:
//!
//! ```toml
//! language = "en"
//! default_confidence = 0.97
//! row_limit = 10000
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::store::DEFAULT_PAGE_SIZE;

/// Result type for configuration loading.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Confidence attached to every fact imported from a tabular dump.
pub const DEFAULT_CONFIDENCE: f64 = 0.97;

/// Language whose labels, descriptions and aliases are imported.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Where a graph session stores its triples.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    /// Path to the redb database file.
    pub db_path: PathBuf,
    /// Rows fetched per cursor page.
    pub page_size: usize,
}

impl GraphConfig {
    /// Configuration for the database at `db_path` with the default page size.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Settings for one import run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Language code for entity labels, descriptions and aliases.
    pub language: String,
    /// Confidence stored with each imported fact.
    pub default_confidence: f64,
    /// Stop after this many fact rows. `None` imports everything.
    pub row_limit: Option<usize>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            default_confidence: DEFAULT_CONFIDENCE,
            row_limit: None,
        }
    }
}

impl ImportConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let config = Self::from_toml(&content).map_err(|message| ConfigError::Parse {
            path: path.display().to_string(),
            message,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no import can honor.
    pub fn validate(&self) -> ConfigResult<()> {
        if !(0.0..=1.0).contains(&self.default_confidence) {
            return Err(ConfigError::Invalid {
                key: "default_confidence",
                message: format!("{} is outside 0.0..=1.0", self.default_confidence),
            });
        }
        Ok(())
    }

    fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }
}
