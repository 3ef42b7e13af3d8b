//! Persisted converter settings.
//!
//! This is the key/value store an admin edits. It is read by the host, never
//! by the pipeline: [`ConverterSettings::to_config`] resolves it into a
//! [`ConversionConfig`] once per call site.

use crate::config::default_allowed_source_mime_types;
use crate::{ConversionConfig, ConvertError, Quality, Result, TargetFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File names searched in the working directory when no path is given.
pub const CONFIG_CANDIDATES: [&str; 3] = [".uic.toml", "uic.toml", ".config/uic.toml"];

/// Settings as stored, with fallback defaults for unset keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterSettings {
    /// Convert uploads at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Target format
    #[serde(default = "default_target_format")]
    pub target_format: TargetFormat,

    /// Quality, 1-100
    #[serde(default = "default_quality")]
    pub quality: u32,

    /// Delete the original after a successful conversion
    #[serde(default = "default_true")]
    pub delete_original: bool,

    /// MIME types eligible for conversion
    #[serde(default = "default_source_formats")]
    pub source_formats: Vec<String>,
}

impl Default for ConverterSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            target_format: default_target_format(),
            quality: default_quality(),
            delete_original: true,
            source_formats: default_source_formats(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_target_format() -> TargetFormat {
    TargetFormat::WebP
}

fn default_quality() -> u32 {
    85
}

fn default_source_formats() -> Vec<String> {
    default_allowed_source_mime_types().into_iter().collect()
}

impl ConverterSettings {
    /// Load settings from `path`, or from the first candidate file found in
    /// the working directory, or fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        let config_path = path.map(Path::to_path_buf).or_else(find_config_file);

        let settings = match config_path {
            Some(ref p) => load_config_file(p)?,
            None => Self::default(),
        };

        Ok((settings, config_path))
    }

    /// Parse settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| ConvertError::Config(format!("Failed to parse settings: {}", e)))
    }

    /// Validate and resolve into a pipeline config.
    pub fn to_config(&self) -> Result<ConversionConfig> {
        let quality = u8::try_from(self.quality)
            .map_err(|_| {
                ConvertError::Config(format!(
                    "quality must be between 1 and 100, got {}",
                    self.quality
                ))
            })
            .and_then(Quality::new)?;

        Ok(ConversionConfig {
            target_format: self.target_format,
            quality,
            delete_original: self.delete_original,
            ..ConversionConfig::default()
        }
        .with_allowed(&self.source_formats))
    }
}

/// Find a settings file in standard locations
fn find_config_file() -> Option<PathBuf> {
    CONFIG_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|candidate| candidate.exists())
}

/// Load and parse a TOML settings file
fn load_config_file(path: &Path) -> Result<ConverterSettings> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ConvertError::Config(format!(
            "Failed to read settings file {}: {}",
            path.display(),
            e
        ))
    })?;

    toml::from_str(&content).map_err(|e| {
        ConvertError::Config(format!(
            "Failed to parse settings file {}: {}",
            path.display(),
            e
        ))
    })
}
