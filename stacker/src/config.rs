//! Stacker configuration file support.
//!
//! This module provides the stacking thresholds and batch settings, and reads
//! them from TOML configuration files. Every field has a default, so a file
//! only needs the values it changes.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::domain::Band;
use crate::core::error::{StackError, StackResult};

/// Full configuration from file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StackerConfig {
    #[serde(default)]
    pub stacking: StackConfig,
    #[serde(default)]
    pub batch: BatchConfig,
}

/// Thresholds and bin width used by the stacking pipeline.
///
/// Uncertainty limits are in µJy, the stack width in days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackConfig {
    #[serde(default = "default_stack_width")]
    pub stack_width: u32,
    #[serde(default = "default_global_error_limit")]
    pub global_error_limit: f64,
    #[serde(default = "default_cyan_error_limit")]
    pub cyan_error_limit: f64,
    #[serde(default = "default_orange_error_limit")]
    pub orange_error_limit: f64,
}

/// Settings for processing a directory of light curves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    #[serde(default = "default_extension")]
    pub extension: String,
    #[serde(default = "default_unread_report")]
    pub unread_report: String,
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

fn default_stack_width() -> u32 {
    7
}

fn default_global_error_limit() -> f64 {
    45.0
}

fn default_cyan_error_limit() -> f64 {
    35.0
}

fn default_orange_error_limit() -> f64 {
    50.0
}

fn default_extension() -> String {
    "lc".to_string()
}

fn default_unread_report() -> String {
    "unread.txt".to_string()
}

fn default_parallel() -> bool {
    true
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            stack_width: default_stack_width(),
            global_error_limit: default_global_error_limit(),
            cyan_error_limit: default_cyan_error_limit(),
            orange_error_limit: default_orange_error_limit(),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            extension: default_extension(),
            unread_report: default_unread_report(),
            parallel: default_parallel(),
        }
    }
}

impl StackConfig {
    /// Uncertainty limit applied to stacked points of `band`.
    pub fn band_limit(&self, band: Band) -> f64 {
        match band {
            Band::Cyan => self.cyan_error_limit,
            Band::Orange => self.orange_error_limit,
        }
    }

    /// Check that the width is positive and every limit is a positive number.
    pub fn validate(&self) -> StackResult<()> {
        if self.stack_width == 0 {
            return Err(StackError::Config(
                "'stacking.stack_width' must be at least 1".to_string(),
            ));
        }

        let limits = [
            ("global_error_limit", self.global_error_limit),
            ("cyan_error_limit", self.cyan_error_limit),
            ("orange_error_limit", self.orange_error_limit),
        ];
        for (name, value) in limits {
            if !value.is_finite() || value <= 0.0 {
                return Err(StackError::Config(format!(
                    "'stacking.{}' must be a positive number, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}

impl StackerConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(StackerConfig)` if successful
    /// * `Err(StackError::Config)` if the file cannot be read, parsed or validated
    pub fn from_file<P: AsRef<Path>>(path: P) -> StackResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            StackError::Config(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> StackResult<Self> {
        let config: StackerConfig = toml::from_str(content)
            .map_err(|e| StackError::Config(format!("Failed to parse config file: {}", e)))?;

        config.stacking.validate()?;
        Ok(config)
    }
}
