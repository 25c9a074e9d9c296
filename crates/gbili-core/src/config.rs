//! GBILI configuration.
//!
//! Provides configuration file support via `gbili.toml`, environment
//! variables, and runtime overrides.
//!
//! # Priority (highest to lowest)
//!
//! 1. Runtime overrides (CLI flags)
//! 2. Environment variables (`GBILI_*`, sections separated by `__`,
//!    e.g. `GBILI_GRAPH__K1=5`)
//! 3. Configuration file (`gbili.toml`)
//! 4. Default values

use crate::index::{IndexKind, DEFAULT_LEAF_SIZE};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to parse configuration.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue {
        /// Configuration key that failed validation.
        key: String,
        /// Validation error message.
        message: String,
    },
}

/// Graph construction parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Nearest neighbors considered per object for mutual-kNN candidacy.
    pub k1: usize,
    /// Maximum edges kept per object after informativeness ranking.
    pub k2: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self { k1: 3, k2: 3 }
    }
}

/// Parallel execution parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Number of partitions (one worker thread each).
    pub workers: usize,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self { workers: 4 }
    }
}

/// Nearest-neighbor index parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Index backend.
    pub kind: IndexKind,
    /// k-d tree leaf bucket size.
    pub leaf_size: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            kind: IndexKind::KdTree,
            leaf_size: DEFAULT_LEAF_SIZE,
        }
    }
}

/// Edge list serialization format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// `source target weight` per line, no header.
    #[default]
    Text,
    /// One JSON object per line.
    Jsonl,
}

/// Output configuration section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Edge list format.
    pub format: OutputFormat,
}

/// Logging configuration section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Main GBILI configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GbiliConfig {
    /// Graph parameters.
    pub graph: GraphConfig,
    /// Execution parameters.
    pub execution: ExecutionConfig,
    /// Index parameters.
    pub index: IndexConfig,
    /// Output parameters.
    pub output: OutputConfig,
    /// Logging parameters.
    pub logging: LoggingConfig,
}

impl GbiliConfig {
    /// Loads configuration from default sources.
    ///
    /// Priority: defaults < `gbili.toml` < environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration parsing fails.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("gbili.toml")
    }

    /// Loads configuration from a specific file path.
    ///
    /// A missing file is not an error; defaults and environment still apply.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration parsing fails.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("GBILI_").split("__"));

        figment
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Creates a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::string(toml_str));

        figment
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Validates value ranges that do not depend on the dataset.
    ///
    /// Dataset-dependent checks (workers ≤ N, k1 < N) happen in the
    /// pipeline pre-flight.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("graph.k1", self.graph.k1),
            ("graph.k2", self.graph.k2),
            ("execution.workers", self.execution.workers),
            ("index.leaf_size", self.index.leaf_size),
        ];
        for (key, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: "value must be >= 1".to_string(),
                });
            }
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "logging.level".to_string(),
                message: format!(
                    "value '{}' is invalid, expected one of: {:?}",
                    self.logging.level, valid_levels
                ),
            });
        }

        Ok(())
    }

    /// Serializes the configuration to TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}
