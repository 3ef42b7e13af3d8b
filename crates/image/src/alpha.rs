//! Alpha channel handling ahead of encoding.

use crate::TargetFormat;
use image::{DynamicImage, GenericImageView, ImageBuffer, Rgb, Rgba};

/// What happens to per-pixel transparency before encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlphaMode {
    /// Keep the alpha channel untouched; never composite
    Preserve,
    /// Composite over a solid background and drop the channel (RGB)
    Flatten([u8; 3]),
}

impl AlphaMode {
    /// Background used when a format cannot store transparency.
    pub const WHITE: [u8; 3] = [255, 255, 255];

    /// Alpha handling for a target format.
    pub fn for_target(format: TargetFormat) -> Self {
        match format {
            TargetFormat::WebP | TargetFormat::Png | TargetFormat::Gif => AlphaMode::Preserve,
            TargetFormat::Jpeg => AlphaMode::Flatten(Self::WHITE),
        }
    }
}

/// Prepare a raster for encoding in place.
///
/// With [`AlphaMode::Preserve`] alpha sources are normalized to 8-bit RGBA so
/// transparency reaches the encoder intact. With [`AlphaMode::Flatten`] the
/// result is always 8-bit RGB.
pub fn prepare_alpha(img: &mut DynamicImage, mode: AlphaMode) {
    match mode {
        AlphaMode::Preserve => {
            if has_alpha_channel(img) && !matches!(img, DynamicImage::ImageRgba8(_)) {
                *img = DynamicImage::ImageRgba8(img.to_rgba8());
            }
        }
        AlphaMode::Flatten(background) => {
            *img = if has_alpha_channel(img) {
                remove_alpha_channel(img, background)
            } else {
                DynamicImage::ImageRgb8(img.to_rgb8())
            };
        }
    }
}

/// Remove alpha channel from an image by compositing over a solid background
pub fn remove_alpha_channel(img: &DynamicImage, background_color: [u8; 3]) -> DynamicImage {
    let (width, height) = img.dimensions();
    let rgba_img = img.to_rgba8();

    let mut output = ImageBuffer::new(width, height);

    for (x, y, pixel) in rgba_img.enumerate_pixels() {
        let Rgba([r, g, b, a]) = *pixel;

        let alpha = a as f32 / 255.0;
        let inv_alpha = 1.0 - alpha;

        let blend = |c: u8, bg: u8| ((c as f32 * alpha) + (bg as f32 * inv_alpha)).round() as u8;

        output.put_pixel(
            x,
            y,
            Rgb([
                blend(r, background_color[0]),
                blend(g, background_color[1]),
                blend(b, background_color[2]),
            ]),
        );
    }

    DynamicImage::ImageRgb8(output)
}

/// Check if an image has an alpha channel
pub fn has_alpha_channel(img: &DynamicImage) -> bool {
    img.color().has_alpha()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{LumaA, RgbaImage};

    fn sample() -> DynamicImage {
        let mut img = RgbaImage::new(2, 2);
        img.put_pixel(0, 0, Rgba([255, 0, 0, 255])); // Opaque red
        img.put_pixel(0, 1, Rgba([0, 255, 0, 128])); // Semi-transparent green
        img.put_pixel(1, 0, Rgba([0, 0, 255, 0])); // Fully transparent blue
        img.put_pixel(1, 1, Rgba([255, 255, 0, 255])); // Opaque yellow
        DynamicImage::ImageRgba8(img)
    }

    #[test]
    fn test_remove_alpha_white_background() {
        let result = remove_alpha_channel(&sample(), AlphaMode::WHITE);
        let rgb = result.as_rgb8().unwrap();

        assert_eq!(rgb.get_pixel(0, 0), &Rgb([255, 0, 0]));
        assert_eq!(rgb.get_pixel(1, 0), &Rgb([255, 255, 255]));
        assert_eq!(rgb.get_pixel(1, 1), &Rgb([255, 255, 0]));

        // Half-transparent green lands halfway towards white.
        let Rgb([r, g, _]) = *rgb.get_pixel(0, 1);
        assert!((126..=128).contains(&r));
        assert_eq!(g, 255);
    }

    #[test]
    fn test_preserve_keeps_transparency() {
        let mut img = sample();
        prepare_alpha(&mut img, AlphaMode::for_target(TargetFormat::Png));
        let rgba = img.as_rgba8().unwrap();
        assert_eq!(rgba.get_pixel(1, 0), &Rgba([0, 0, 255, 0]));
        assert_eq!(rgba.get_pixel(0, 1)[3], 128);
    }

    #[test]
    fn test_preserve_normalizes_luma_alpha() {
        let mut img =
            DynamicImage::ImageLumaA8(image::ImageBuffer::from_pixel(1, 1, LumaA([90, 7])));
        prepare_alpha(&mut img, AlphaMode::Preserve);
        assert_eq!(img.as_rgba8().unwrap().get_pixel(0, 0), &Rgba([90, 90, 90, 7]));
    }

    #[test]
    fn test_flatten_for_jpeg() {
        let mut img = sample();
        prepare_alpha(&mut img, AlphaMode::for_target(TargetFormat::Jpeg));
        assert!(!has_alpha_channel(&img));
        assert!(img.as_rgb8().is_some());
    }

    #[test]
    fn test_has_alpha_channel() {
        let rgba_img = DynamicImage::ImageRgba8(RgbaImage::new(1, 1));
        assert!(has_alpha_channel(&rgba_img));

        let rgb_img = DynamicImage::ImageRgb8(image::RgbImage::new(1, 1));
        assert!(!has_alpha_channel(&rgb_img));
    }
}
