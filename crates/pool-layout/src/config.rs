// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Conversion settings loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! output_path = "legacy_config.csv"
//! env_var = "HPC_CONFIGURATION_FILE"
//! pad_reservation = true
//! ```

use crate::{LayoutError, CONFIGURATION_FILE_ENV};
use std::path::{Path, PathBuf};

/// Settings for converting a pool layout to the legacy format.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ConversionConfig {
    /// Where the legacy CSV file is written.
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
    /// Environment variable reported for the legacy file path.
    #[serde(default = "default_env_var")]
    pub env_var: String,
    /// Whether reported page counts get one spare page per size.
    #[serde(default = "default_true")]
    pub pad_reservation: bool,
}

fn default_output_path() -> PathBuf {
    PathBuf::from("legacy_config.csv")
}

fn default_env_var() -> String {
    CONFIGURATION_FILE_ENV.to_string()
}

fn default_true() -> bool {
    true
}

impl ConversionConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, LayoutError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            LayoutError::Config(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, LayoutError> {
        toml::from_str(toml_str)
            .map_err(|e| LayoutError::Config(format!("TOML parse error: {e}")))
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, LayoutError> {
        toml::to_string_pretty(self)
            .map_err(|e| LayoutError::Config(format!("TOML serialise error: {e}")))
    }
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
            env_var: default_env_var(),
            pad_reservation: true,
        }
    }
}
