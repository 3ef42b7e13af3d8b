//! Encoder dispatch: target format and quality to a written output file.
//!
//! Quality semantics per target:
//! - **webp**: 1-100 passed straight to the lossy encoder
//! - **jpeg**: 1-100 passed straight to the encoder
//! - **png**: inverted onto zlib's 0-9 scale, see [`png_compression_level`]
//! - **gif**: ignored, palette output has no quality knob

use crate::alpha::{prepare_alpha, AlphaMode};
use crate::capability::can_encode;
use crate::{ConvertError, DecodedImage, Quality, Result, TargetFormat};
use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ColorType, DynamicImage, GenericImageView, ImageEncoder};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Map a 1-100 quality onto PNG's inverted 0-9 compression level.
///
/// 0 is the lightest compression (largest file), 9 the heaviest. Higher
/// quality therefore means a *lower* level.
///
/// # Example
/// ```
/// use uic_image::{png_compression_level, Quality};
///
/// assert_eq!(png_compression_level(Quality::new(100).unwrap()), 0);
/// assert_eq!(png_compression_level(Quality::new(85).unwrap()), 1);
/// assert_eq!(png_compression_level(Quality::new(1).unwrap()), 9);
/// ```
pub fn png_compression_level(quality: Quality) -> u8 {
    let scaled = (f64::from(quality.get()) / 100.0 * 9.0).round() as u8;
    9 - scaled.min(9)
}

/// Pick the encoder preset closest to a 0-9 compression level.
pub fn png_compression_type(level: u8) -> CompressionType {
    match level {
        0..=2 => CompressionType::Fast,
        3..=6 => CompressionType::Default,
        _ => CompressionType::Best,
    }
}

/// Encode a decoded upload and write it to `output_path`.
///
/// Alpha is prepared for the target first (kept for png/webp, composited
/// away for jpeg). The bytes go to a temporary file next to `output_path`
/// that is renamed into place only once encoding and flushing succeeded.
/// On any failure the temporary file is removed and whatever already sat at
/// `output_path` is left alone. The source file is never touched.
pub fn encode(
    image: &mut DecodedImage,
    output_path: &Path,
    format: TargetFormat,
    quality: Quality,
) -> Result<()> {
    if !can_encode(format) {
        return Err(ConvertError::CapabilityUnavailable("webp encoding"));
    }

    prepare_alpha(image.image_mut(), AlphaMode::for_target(format));

    let temp = staging_file(output_path).map_err(|e| {
        ConvertError::Encode(format!("cannot create {}: {}", output_path.display(), e))
    })?;

    let mut writer = BufWriter::new(temp);
    encode_to_writer(image.image(), &mut writer, format, quality)?;
    let temp = writer
        .into_inner()
        .map_err(|e| ConvertError::Encode(format!("write failed: {}", e.error())))?;

    temp.persist(output_path).map_err(|e| {
        ConvertError::Encode(format!("cannot write {}: {}", output_path.display(), e.error))
    })?;

    tracing::debug!(path = %output_path.display(), "Output written");
    Ok(())
}

/// Temporary file in the output's directory, removed again when dropped.
fn staging_file(output_path: &Path) -> io::Result<NamedTempFile> {
    let dir = match output_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut builder = tempfile::Builder::new();
    builder.prefix(".uic-").suffix(".part");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o644));
    }
    builder.tempfile_in(dir)
}

/// Encode a prepared raster into `writer`.
pub fn encode_to_writer<W: Write>(
    img: &DynamicImage,
    writer: &mut W,
    format: TargetFormat,
    quality: Quality,
) -> Result<()> {
    match format {
        TargetFormat::WebP => encode_webp(img, writer, quality),
        TargetFormat::Jpeg => encode_jpeg(img, writer, quality),
        TargetFormat::Png => encode_png(img, writer, png_compression_level(quality)),
        TargetFormat::Gif => encode_gif(img, writer),
    }
}

fn encode_jpeg<W: Write>(img: &DynamicImage, writer: &mut W, quality: Quality) -> Result<()> {
    let rgb = img.to_rgb8();
    let mut encoder = JpegEncoder::new_with_quality(writer, quality.get());
    encoder
        .encode(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)
        .map_err(encode_error)
}

fn encode_png<W: Write>(img: &DynamicImage, writer: &mut W, level: u8) -> Result<()> {
    tracing::debug!(level, "Encoding PNG");
    let encoder =
        PngEncoder::new_with_quality(writer, png_compression_type(level), FilterType::Adaptive);
    encoder
        .write_image(img.as_bytes(), img.width(), img.height(), img.color())
        .map_err(encode_error)
}

fn encode_gif<W: Write>(img: &DynamicImage, writer: &mut W) -> Result<()> {
    let rgba = img.to_rgba8();
    let mut encoder = GifEncoder::new(writer);
    encoder
        .encode(rgba.as_raw(), rgba.width(), rgba.height(), ColorType::Rgba8)
        .map_err(encode_error)
}

#[cfg(feature = "webp-encoder")]
#[allow(deprecated)]
fn encode_webp<W: Write>(img: &DynamicImage, writer: &mut W, quality: Quality) -> Result<()> {
    use image::codecs::webp::{WebPEncoder, WebPQuality};

    let encoder = WebPEncoder::new_with_quality(writer, WebPQuality::lossy(quality.get()));
    let written = if img.color().has_alpha() {
        let rgba = img.to_rgba8();
        encoder.encode(rgba.as_raw(), rgba.width(), rgba.height(), ColorType::Rgba8)
    } else {
        let rgb = img.to_rgb8();
        encoder.encode(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)
    };
    written.map_err(encode_error)
}

#[cfg(not(feature = "webp-encoder"))]
fn encode_webp<W: Write>(_img: &DynamicImage, _writer: &mut W, _quality: Quality) -> Result<()> {
    Err(ConvertError::CapabilityUnavailable("webp encoding"))
}

fn encode_error(err: image::ImageError) -> ConvertError {
    ConvertError::Encode(err.to_string())
}
