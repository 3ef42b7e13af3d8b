//! Resolved conversion configuration.
//!
//! A [`ConversionConfig`] is built once by the caller (see
//! [`crate::settings`]) and passed into the pipeline by reference. The
//! pipeline never reads settings on its own.

use crate::format::normalize_mime;
use crate::{ConvertError, Result, TargetFormat};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Encoder quality on a 1-100 scale.
///
/// Each target format interprets the value differently; see
/// [`crate::encode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Quality(u8);

impl Quality {
    /// Lowest accepted quality.
    pub const MIN: u8 = 1;
    /// Highest accepted quality.
    pub const MAX: u8 = 100;

    /// Create a quality value, rejecting anything outside 1-100.
    pub fn new(value: u8) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ConvertError::Config(format!(
                "quality must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                value
            )))
        }
    }

    /// Raw 1-100 value.
    pub fn get(&self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(85)
    }
}

impl TryFrom<u8> for Quality {
    type Error = ConvertError;

    fn try_from(value: u8) -> Result<Self> {
        Quality::new(value)
    }
}

impl From<Quality> for u8 {
    fn from(quality: Quality) -> Self {
        quality.0
    }
}

/// Configuration for a single conversion call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// MIME types eligible for conversion, matched case-insensitively
    pub allowed_source_mime_types: BTreeSet<String>,
    /// Format every eligible upload is converted to
    pub target_format: TargetFormat,
    /// Encoder quality
    pub quality: Quality,
    /// Remove the source file after a successful conversion
    pub delete_original: bool,
    /// MIME type stamped on converted files, per target format
    pub mime_type_by_format: BTreeMap<TargetFormat, String>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            allowed_source_mime_types: default_allowed_source_mime_types(),
            target_format: TargetFormat::WebP,
            quality: Quality::default(),
            delete_original: true,
            mime_type_by_format: default_mime_type_by_format(),
        }
    }
}

impl ConversionConfig {
    /// Create a config for `target_format` with every other field defaulted.
    pub fn new(target_format: TargetFormat) -> Self {
        Self {
            target_format,
            ..Self::default()
        }
    }

    /// Replace the allow-list. Entries are normalized to lower case.
    pub fn with_allowed<I, S>(mut self, mime_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_source_mime_types = mime_types
            .into_iter()
            .map(|mime| normalize_mime(mime.as_ref()))
            .collect();
        self
    }

    /// Set the encoder quality.
    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    /// Set whether the original is removed after conversion.
    pub fn with_delete_original(mut self, delete_original: bool) -> Self {
        self.delete_original = delete_original;
        self
    }

    /// Whether `mime` is on the allow-list (case-insensitive).
    ///
    /// Both sides are normalized, so entries set directly on the field or
    /// deserialized as written still match.
    pub fn is_allowed(&self, mime: &str) -> bool {
        let mime = normalize_mime(mime);
        self.allowed_source_mime_types
            .iter()
            .any(|allowed| normalize_mime(allowed) == mime)
    }

    /// MIME type for a target format, falling back to the canonical one
    /// when the table has no entry.
    pub fn mime_type_for(&self, format: TargetFormat) -> &str {
        self.mime_type_by_format
            .get(&format)
            .map(String::as_str)
            .unwrap_or_else(|| format.mime_type())
    }

    /// MIME type for the configured target format.
    pub fn target_mime_type(&self) -> &str {
        self.mime_type_for(self.target_format)
    }
}

/// Source MIME types converted when nothing else is configured.
pub fn default_allowed_source_mime_types() -> BTreeSet<String> {
    ["image/jpeg", "image/jpg", "image/png", "image/gif", "image/bmp"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Canonical format to MIME type table.
pub fn default_mime_type_by_format() -> BTreeMap<TargetFormat, String> {
    TargetFormat::ALL
        .into_iter()
        .map(|format| (format, format.mime_type().to_string()))
        .collect()
}
