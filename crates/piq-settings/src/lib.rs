//! # piq-settings
//!
//! **Tier 0 (Pure Settings)**
//!
//! Clap-free settings for extraction and output. The CLI layers its flags on
//! top of these; library consumers can build them directly or load them from
//! a `piq.toml` file.
//!
//! ## What belongs here
//! * Pure data types with Serde derive
//! * Defaults and TOML loading
//!
//! ## What does NOT belong here
//! * Clap parsing (use piq-config)
//! * Extraction or diff logic

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name prefix of the default vulnerability pillar factors.
pub const DEFAULT_PILLAR_PREFIX: &str = "Product_Factor CWE-";

/// File name looked up in the user configuration directory.
pub const CONFIG_FILE_NAME: &str = "piq.toml";

/// Errors from loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse settings TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Root settings document (`piq.toml`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub extract: ExtractSettings,
    pub output: OutputSettings,
}

impl Settings {
    /// Parse settings from a TOML string.
    pub fn from_toml(s: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(s)?)
    }

    /// Load settings from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

/// Settings for the extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractSettings {
    /// Product factors whose name starts with one of these prefixes are
    /// vulnerability pillars: their measures are collected at any depth.
    pub pillar_prefixes: Vec<String>,
}

impl Default for ExtractSettings {
    fn default() -> Self {
        Self {
            pillar_prefixes: vec![DEFAULT_PILLAR_PREFIX.to_string()],
        }
    }
}

impl ExtractSettings {
    pub fn is_pillar(&self, factor_name: &str) -> bool {
        self.pillar_prefixes
            .iter()
            .any(|prefix| !prefix.is_empty() && factor_name.starts_with(prefix.as_str()))
    }
}

/// Settings for emitted JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Pretty-print JSON output.
    pub pretty: bool,
}
