//! Engine configuration
//!
//! Loaded from a JSON file. Every field has a default, so `{}` is a valid
//! configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::Io { .. } => "DQ_CONFIG_IO",
            ConfigError::Parse(_) => "DQ_CONFIG_PARSE",
            ConfigError::Invalid(_) => "DQ_CONFIG_INVALID",
        }
    }

    pub fn class(&self) -> crate::error::ErrorClass {
        crate::error::ErrorClass::Configuration
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Limits and policies shared by the key generator and the accumulators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum document nesting walked during key generation (default: 180)
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Maximum encoded size of one index key (default: 1024)
    #[serde(default = "default_max_key_bytes")]
    pub max_key_bytes: usize,

    /// Memory ceiling for `$push`/`$addToSet` state (default: 100 MiB)
    #[serde(default = "default_accumulator_max_memory")]
    pub accumulator_max_memory_bytes: usize,

    /// Whether `$push`/`$addToSet` record a missing input as null (default: false)
    #[serde(default)]
    pub record_missing: bool,
}

fn default_max_depth() -> usize {
    180
}

fn default_max_key_bytes() -> usize {
    1024
}

fn default_accumulator_max_memory() -> usize {
    100 * 1024 * 1024
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_key_bytes: default_max_key_bytes(),
            accumulator_max_memory_bytes: default_accumulator_max_memory(),
            record_missing: false,
        }
    }
}

impl EngineConfig {
    /// Loads and validates a config file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: EngineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects limits that would make every operation fail
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid("max_depth must be positive".into()));
        }
        if self.max_key_bytes == 0 {
            return Err(ConfigError::Invalid("max_key_bytes must be positive".into()));
        }
        if self.accumulator_max_memory_bytes == 0 {
            return Err(ConfigError::Invalid(
                "accumulator_max_memory_bytes must be positive".into(),
            ));
        }
        Ok(())
    }
}
