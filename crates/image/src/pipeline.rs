//! Conversion pipeline: eligibility, decode, encode, then cleanup.
//!
//! Every failure is absorbed here. The caller always gets a
//! [`ConversionResult`] it can store, and the original upload survives any
//! failed conversion.

use crate::eligibility::{check_eligibility, SkipReason};
use crate::{
    decode, encode, ConversionConfig, ConvertError, DecodedImage, Quality, Result, TargetFormat,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A completed upload handed to the converter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRequest {
    /// Location of the uploaded file (owned by the caller)
    pub source_path: PathBuf,
    /// MIME type declared for the upload
    pub source_mime_type: String,
}

impl ConversionRequest {
    /// Create a request.
    pub fn new(source_path: impl Into<PathBuf>, source_mime_type: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            source_mime_type: source_mime_type.into(),
        }
    }
}

/// What the caller should record for the upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResult {
    /// New path if converted, else the source path
    pub output_path: PathBuf,
    /// New MIME type if converted, else the declared one
    pub output_mime_type: String,
    /// Whether a converted file was produced
    pub converted: bool,
}

impl ConversionResult {
    /// The request echoed back untouched.
    pub fn unchanged(request: &ConversionRequest) -> Self {
        Self {
            output_path: request.source_path.clone(),
            output_mime_type: request.source_mime_type.clone(),
            converted: false,
        }
    }

    /// Rewrite a stored URL so it points at the converted file.
    ///
    /// Only the last occurrence of `.<source ext>` is swapped for the new
    /// extension, so a URL like `/photo.png/photo.png` becomes
    /// `/photo.png/photo.webp`. Hosts that used to replace every occurrence
    /// will see different results for URLs repeating the extension earlier.
    /// A source without an extension gets the new one appended. Unconverted
    /// results return the URL unchanged.
    ///
    /// # Example
    /// ```
    /// use std::path::Path;
    /// use uic_image::ConversionResult;
    ///
    /// let result = ConversionResult {
    ///     output_path: "/uploads/photo.webp".into(),
    ///     output_mime_type: "image/webp".into(),
    ///     converted: true,
    /// };
    /// let url = result.rewrite_url(
    ///     "https://cdn.test/uploads/photo.png",
    ///     Path::new("/uploads/photo.png"),
    /// );
    /// assert_eq!(url, "https://cdn.test/uploads/photo.webp");
    /// ```
    pub fn rewrite_url(&self, url: &str, source_path: &Path) -> String {
        if !self.converted {
            return url.to_string();
        }
        let Some(new_ext) = self.output_path.extension().and_then(|e| e.to_str()) else {
            return url.to_string();
        };

        match source_path.extension().and_then(|e| e.to_str()) {
            Some(old_ext) => {
                let needle = format!(".{}", old_ext);
                match url.rfind(&needle) {
                    Some(pos) => {
                        format!("{}.{}{}", &url[..pos], new_ext, &url[pos + needle.len()..])
                    }
                    None => url.to_string(),
                }
            }
            None => format!("{}.{}", url, new_ext),
        }
    }
}

/// The original could not be removed after a successful conversion.
///
/// Reported, never escalated: the conversion still counts as a success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteWarning {
    /// File that was left behind
    pub path: PathBuf,
    /// Underlying OS error
    pub message: String,
}

impl fmt::Display for DeleteWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not delete {}: {}", self.path.display(), self.message)
    }
}

/// Result plus everything the pipeline absorbed on the way.
#[derive(Debug)]
pub struct ConversionReport {
    /// What the caller should store
    pub result: ConversionResult,
    /// Why eligibility rejected the upload, if it did
    pub skipped: Option<SkipReason>,
    /// Decode or encode failure that forced a pass-through
    pub failure: Option<ConvertError>,
    /// Original could not be deleted
    pub delete_warning: Option<DeleteWarning>,
}

impl ConversionReport {
    fn passthrough(request: &ConversionRequest) -> Self {
        Self {
            result: ConversionResult::unchanged(request),
            skipped: None,
            failure: None,
            delete_warning: None,
        }
    }

    /// Drop the diagnostics and keep the result.
    pub fn into_result(self) -> ConversionResult {
        self.result
    }
}

/// Decode and encode seam used by the pipeline.
///
/// `Image` is owned by one invocation; dropping it releases its memory.
pub trait Codec {
    /// In-memory raster type.
    type Image;

    /// Decode the file at `path` according to its declared MIME type.
    fn decode(&self, path: &Path, source_mime_type: &str) -> Result<Self::Image>;

    /// Encode `image` to `output_path`.
    fn encode(
        &self,
        image: &mut Self::Image,
        output_path: &Path,
        format: TargetFormat,
        quality: Quality,
    ) -> Result<()>;
}

/// Codec backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCodec;

impl Codec for ImageCodec {
    type Image = DecodedImage;

    fn decode(&self, path: &Path, source_mime_type: &str) -> Result<DecodedImage> {
        decode::decode(path, source_mime_type)
    }

    fn encode(
        &self,
        image: &mut DecodedImage,
        output_path: &Path,
        format: TargetFormat,
        quality: Quality,
    ) -> Result<()> {
        encode::encode(image, output_path, format, quality)
    }
}

/// Path the converted file is written to: same directory and base name,
/// target extension.
pub fn output_path_for(source_path: &Path, format: TargetFormat) -> PathBuf {
    source_path.with_extension(format.extension())
}

/// Convert one upload with the default codec.
pub fn convert(request: &ConversionRequest, config: &ConversionConfig) -> ConversionReport {
    convert_with(&ImageCodec, request, config)
}

/// Convert one upload.
///
/// Never fails: on rejection or any decode/encode error the result is the
/// request unchanged, with the reason recorded in the report.
#[tracing::instrument(
    skip_all,
    fields(
        path = %request.source_path.display(),
        mime = %request.source_mime_type,
        target = %config.target_format
    )
)]
pub fn convert_with<C: Codec>(
    codec: &C,
    request: &ConversionRequest,
    config: &ConversionConfig,
) -> ConversionReport {
    let mut report = ConversionReport::passthrough(request);

    if let Err(reason) = check_eligibility(&request.source_mime_type, config) {
        tracing::debug!(?reason, "Upload not eligible for conversion");
        report.skipped = Some(reason);
        return report;
    }

    let output_path = output_path_for(&request.source_path, config.target_format);
    if output_path == request.source_path {
        // Encoding would overwrite the only copy of the upload.
        tracing::warn!("Output path collides with source, leaving upload as-is");
        report.failure = Some(ConvertError::Encode(format!(
            "output path {} is the source file",
            output_path.display()
        )));
        return report;
    }

    let mut image = match codec.decode(&request.source_path, &request.source_mime_type) {
        Ok(image) => image,
        Err(e) => {
            tracing::warn!(error = %e, "Decode failed, keeping original upload");
            report.failure = Some(e);
            return report;
        }
    };

    let encoded = codec.encode(&mut image, &output_path, config.target_format, config.quality);
    drop(image);

    if let Err(e) = encoded {
        tracing::warn!(error = %e, "Encode failed, keeping original upload");
        report.failure = Some(e);
        return report;
    }

    if config.delete_original {
        if let Err(e) = std::fs::remove_file(&request.source_path) {
            let warning = DeleteWarning {
                path: request.source_path.clone(),
                message: e.to_string(),
            };
            tracing::warn!(%warning, "Original kept after conversion");
            report.delete_warning = Some(warning);
        }
    }

    tracing::info!(output = %output_path.display(), "Upload converted");

    report.result = ConversionResult {
        output_path,
        output_mime_type: config.target_mime_type().to_string(),
        converted: true,
    };
    report
}
