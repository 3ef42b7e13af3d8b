//! Upload-time image format conversion.
//!
//! This crate provides:
//! - An eligibility filter deciding whether an upload is converted
//! - Decoder dispatch over JPEG, PNG, GIF, BMP and WebP sources
//! - Encoder dispatch to WebP, JPEG, PNG or GIF with per-format quality rules
//! - A pipeline that ties them together and never fails the upload
//! - Settings loading and capability introspection for hosts
//!
//! # Example
//!
//! ```rust,no_run
//! use uic_image::{convert, ConversionConfig, ConversionRequest, TargetFormat};
//!
//! let config = ConversionConfig::new(TargetFormat::WebP).with_allowed(["image/png"]);
//! let request = ConversionRequest::new("/uploads/photo.png", "image/png");
//!
//! let result = convert(&request, &config).into_result();
//! if result.converted {
//!     println!("stored as {}", result.output_path.display());
//! }
//! ```

#![warn(missing_docs)]

pub mod alpha;
pub mod capability;
mod config;
pub mod decode;
mod eligibility;
pub mod encode;
mod error;
mod format;
pub mod pipeline;
pub mod settings;

pub use capability::{webp_encoding_available, Capabilities};
pub use config::{ConversionConfig, Quality};
pub use decode::{decode, DecodedImage};
pub use eligibility::{check_eligibility, should_convert, SkipReason};
pub use encode::{encode, png_compression_level};
pub use error::{ConvertError, Result};
pub use format::{mime_from_extension, normalize_mime, SourceFormat, TargetFormat};
pub use pipeline::{
    convert, convert_with, output_path_for, Codec, ConversionReport, ConversionRequest,
    ConversionResult, DeleteWarning, ImageCodec,
};
pub use settings::ConverterSettings;
