//! End-to-end conversion scenarios against real files.

use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use tempfile::tempdir;
use uic_image::{
    convert, should_convert, ConversionConfig, ConversionRequest, ConversionResult, ConvertError,
    Quality, SkipReason, TargetFormat,
};

fn write_png(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    let mut img = RgbaImage::from_pixel(8, 8, Rgba([30, 60, 90, 255]));
    img.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
    img.save_with_format(&path, image::ImageFormat::Png).unwrap();
    path
}

fn write_bmp(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    let img = RgbImage::from_fn(8, 8, |x, y| Rgb([(x * 30) as u8, (y * 30) as u8, 128]));
    DynamicImage::ImageRgb8(img)
        .save_with_format(&path, image::ImageFormat::Bmp)
        .unwrap();
    path
}

#[cfg(feature = "webp-encoder")]
#[test]
fn png_upload_becomes_webp() {
    let dir = tempdir().unwrap();
    let source = write_png(dir.path(), "photo.png");
    let config = ConversionConfig::new(TargetFormat::WebP)
        .with_allowed(["image/png"])
        .with_quality(Quality::new(85).unwrap())
        .with_delete_original(true);

    let request = ConversionRequest::new(&source, "image/png");
    let result = convert(&request, &config).into_result();

    assert!(result.converted);
    assert_eq!(result.output_path, dir.path().join("photo.webp"));
    assert_eq!(result.output_mime_type, "image/webp");
    assert!(result.output_path.exists());
    assert!(!source.exists());

    let reloaded = image::open(&result.output_path).unwrap();
    assert_eq!((reloaded.width(), reloaded.height()), (8, 8));
}

#[cfg(not(feature = "webp-encoder"))]
#[test]
fn webp_target_without_encoder_keeps_upload() {
    let dir = tempdir().unwrap();
    let source = write_png(dir.path(), "photo.png");
    let config = ConversionConfig::new(TargetFormat::WebP).with_allowed(["image/png"]);

    let request = ConversionRequest::new(&source, "image/png");
    let report = convert(&request, &config);

    assert_eq!(report.result, ConversionResult::unchanged(&request));
    assert!(matches!(report.failure, Some(ConvertError::CapabilityUnavailable(_))));
    assert!(source.exists());
    assert!(!dir.path().join("photo.webp").exists());
}

#[test]
fn webp_upload_is_left_alone() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("photo.webp");
    let config =
        ConversionConfig::new(TargetFormat::WebP).with_allowed(["image/png", "image/webp"]);

    let request = ConversionRequest::new(&source, "image/webp");
    assert!(!should_convert(&request.source_mime_type, &config));

    // The file does not even exist: nothing may be read.
    let report = convert(&request, &config);
    assert_eq!(report.skipped, Some(SkipReason::AlreadyTarget));
    assert_eq!(report.result, ConversionResult::unchanged(&request));
}

#[test]
fn tiff_upload_is_not_decoded() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("scan.tiff");
    std::fs::write(&source, b"II*\0not really").unwrap();
    let config = ConversionConfig::new(TargetFormat::WebP).with_allowed(["image/png"]);

    let request = ConversionRequest::new(&source, "image/tiff");
    let report = convert(&request, &config);

    assert_eq!(report.skipped, Some(SkipReason::NotAllowed));
    assert!(report.failure.is_none());
    assert_eq!(report.result, ConversionResult::unchanged(&request));
    assert!(source.exists());
}

#[test]
fn zero_byte_jpeg_is_kept() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("broken.jpg");
    std::fs::write(&source, b"").unwrap();
    let config = ConversionConfig::new(TargetFormat::Png).with_allowed(["image/jpeg"]);

    let request = ConversionRequest::new(&source, "image/jpeg");
    let report = convert(&request, &config);

    assert_eq!(report.result, ConversionResult::unchanged(&request));
    assert!(matches!(report.failure, Some(ConvertError::Decode(_))));
    assert!(source.exists());
    assert!(!dir.path().join("broken.png").exists());
}

#[test]
fn failed_gif_encode_leaves_directory_untouched() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("panorama.png");
    RgbaImage::from_pixel(70_000, 1, Rgba([10, 20, 30, 255]))
        .save_with_format(&source, image::ImageFormat::Png)
        .unwrap();
    let config = ConversionConfig::new(TargetFormat::Gif).with_allowed(["image/png"]);

    let request = ConversionRequest::new(&source, "image/png");
    let report = convert(&request, &config);

    assert_eq!(report.result, ConversionResult::unchanged(&request));
    assert!(matches!(report.failure, Some(ConvertError::Encode(_))));
    let entries: Vec<PathBuf> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(entries, vec![source]);
}

#[test]
fn bmp_upload_becomes_jpeg_and_keeps_original() {
    let dir = tempdir().unwrap();
    let source = write_bmp(dir.path(), "scan.bmp");
    let config = ConversionConfig::new(TargetFormat::Jpeg)
        .with_allowed(["image/bmp"])
        .with_delete_original(false);

    let request = ConversionRequest::new(&source, "image/bmp");
    let report = convert(&request, &config);

    assert!(report.failure.is_none());
    assert!(report.result.converted);
    assert_eq!(report.result.output_path, dir.path().join("scan.jpeg"));
    assert_eq!(report.result.output_mime_type, "image/jpeg");
    assert!(source.exists());

    let bytes = std::fs::read(&report.result.output_path).unwrap();
    assert!(bytes.starts_with(&[0xFF, 0xD8, 0xFF]));
}

#[test]
fn png_upload_becomes_gif_with_transparency() {
    let dir = tempdir().unwrap();
    let source = write_png(dir.path(), "icon.png");
    let config = ConversionConfig::new(TargetFormat::Gif).with_allowed(["image/png"]);

    let request = ConversionRequest::new(&source, "IMAGE/PNG");
    let result = convert(&request, &config).into_result();

    assert!(result.converted);
    assert_eq!(result.output_mime_type, "image/gif");
    assert!(!source.exists());

    let reloaded = image::open(&result.output_path).unwrap().to_rgba8();
    assert_eq!(reloaded.get_pixel(0, 0)[3], 0);
    assert_eq!(reloaded.get_pixel(4, 4)[3], 255);
}

#[test]
fn jpeg_upload_becomes_png() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("photo.jpg");
    DynamicImage::ImageRgb8(RgbImage::from_pixel(6, 4, Rgb([120, 140, 160])))
        .save_with_format(&source, image::ImageFormat::Jpeg)
        .unwrap();

    let config = ConversionConfig::new(TargetFormat::Png)
        .with_allowed(["image/jpeg", "image/jpg"])
        .with_quality(Quality::new(1).unwrap());

    let request = ConversionRequest::new(&source, "image/jpg");
    let result = convert(&request, &config).into_result();

    assert!(result.converted);
    assert_eq!(result.output_path, dir.path().join("photo.png"));
    let reloaded = image::open(&result.output_path).unwrap();
    assert_eq!((reloaded.width(), reloaded.height()), (6, 4));
}
