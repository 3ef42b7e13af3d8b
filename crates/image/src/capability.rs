//! Runtime capability introspection.
//!
//! WebP encoding is optional: it needs libwebp, which is compiled in only
//! with the `webp-encoder` feature. Decoders are always present.

use crate::{SourceFormat, TargetFormat};
use serde::Serialize;

/// Whether WebP output can be produced by this build.
pub fn webp_encoding_available() -> bool {
    cfg!(feature = "webp-encoder")
}

/// Whether output in `format` can be produced by this build.
pub fn can_encode(format: TargetFormat) -> bool {
    match format {
        TargetFormat::WebP => webp_encoding_available(),
        TargetFormat::Jpeg | TargetFormat::Png | TargetFormat::Gif => true,
    }
}

/// Snapshot of what this build can decode and encode.
#[derive(Debug, Clone, Serialize)]
pub struct Capabilities {
    /// Source formats with a decoder
    pub decoders: Vec<SourceFormat>,
    /// Target formats with an encoder
    pub encoders: Vec<TargetFormat>,
    /// Lossy WebP encoding available
    pub webp_encoding: bool,
}

impl Capabilities {
    /// Inspect the current build.
    pub fn detect() -> Self {
        Self {
            decoders: SourceFormat::ALL.to_vec(),
            encoders: TargetFormat::ALL
                .into_iter()
                .filter(|format| can_encode(*format))
                .collect(),
            webp_encoding: webp_encoding_available(),
        }
    }

    /// Whether `format` is in the encoder list.
    pub fn supports(&self, format: TargetFormat) -> bool {
        self.encoders.contains(&format)
    }
}
