//! Migration settings
//!
//! Host-supplied configuration for a migration run: the target schema
//! version, the deferred-classification threshold and the worker pool
//! size. Loaded from YAML the same way model files are, with defaults
//! matching the built-in comment migration set.

use serde::{Deserialize, Serialize};

use crate::migrations::MIN_DEFERRED_VERSION;
use crate::migrations::comment::LATEST_COMMENT_VERSION;
use crate::models::SchemaVersion;

/// Error loading migration settings
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct MigrationSettings {
    /// Version every successfully migrated document ends up at.
    pub target_version: SchemaVersion,
    /// Registrations at or above this version run deferred.
    pub min_deferred_version: SchemaVersion,
    /// Worker pool size for the batch coordinator; 0 means one worker per
    /// logical CPU.
    pub worker_threads: usize,
}

impl Default for MigrationSettings {
    fn default() -> Self {
        Self {
            target_version: LATEST_COMMENT_VERSION,
            min_deferred_version: MIN_DEFERRED_VERSION,
            worker_threads: 0,
        }
    }
}

impl MigrationSettings {
    /// Parse settings from a YAML string.
    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Load settings from a YAML file.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&raw)
    }
}
