//! Eligibility filter: decides whether an upload is converted at all.
//!
//! Runs before any file I/O. Pure function of its inputs.

use crate::format::normalize_mime;
use crate::ConversionConfig;
use serde::Serialize;

/// Why an upload is passed through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// MIME type is not on the allow-list
    NotAllowed,
    /// Upload is already in the target format
    AlreadyTarget,
}

/// Check an upload's declared MIME type against the config.
pub fn check_eligibility(
    source_mime_type: &str,
    config: &ConversionConfig,
) -> Result<(), SkipReason> {
    if !config.is_allowed(source_mime_type) {
        return Err(SkipReason::NotAllowed);
    }

    if normalize_mime(source_mime_type) == normalize_mime(config.target_mime_type()) {
        return Err(SkipReason::AlreadyTarget);
    }

    Ok(())
}

/// Whether an upload with this MIME type should be converted.
///
/// # Example
/// ```
/// use uic_image::{should_convert, ConversionConfig, TargetFormat};
///
/// let config = ConversionConfig::new(TargetFormat::WebP)
///     .with_allowed(["image/png", "image/webp"]);
/// assert!(should_convert("image/png", &config));
/// assert!(!should_convert("image/webp", &config)); // already WebP
/// assert!(!should_convert("image/tiff", &config)); // not allowed
/// ```
pub fn should_convert(source_mime_type: &str, config: &ConversionConfig) -> bool {
    check_eligibility(source_mime_type, config).is_ok()
}
