//! Decoder dispatch: declared MIME type to an in-memory raster.

use crate::{ConvertError, Result, SourceFormat};
use image::{DynamicImage, GenericImageView};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// An in-memory raster owned by one pipeline invocation.
///
/// The pixel buffer is freed when the value is dropped, so every exit path
/// releases it exactly once.
#[derive(Debug)]
pub struct DecodedImage {
    image: DynamicImage,
    source: SourceFormat,
}

impl DecodedImage {
    /// Wrap an already decoded image.
    pub fn new(image: DynamicImage, source: SourceFormat) -> Self {
        Self { image, source }
    }

    /// Format the image was decoded from.
    pub fn source_format(&self) -> SourceFormat {
        self.source
    }

    /// Width and height in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Borrow the raster.
    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// Mutably borrow the raster.
    pub fn image_mut(&mut self) -> &mut DynamicImage {
        &mut self.image
    }
}

/// Decode `path` according to its declared MIME type.
///
/// An unrecognized MIME type fails with [`ConvertError::UnsupportedFormat`]
/// before the file is touched. Any read or decode failure is reported as
/// [`ConvertError::Decode`]. The source file is only read, never modified.
pub fn decode(path: &Path, source_mime_type: &str) -> Result<DecodedImage> {
    let format = SourceFormat::from_mime(source_mime_type)
        .ok_or_else(|| ConvertError::UnsupportedFormat(source_mime_type.to_string()))?;

    decode_as(path, format)
}

/// Decode `path` as a known source format.
pub fn decode_as(path: &Path, format: SourceFormat) -> Result<DecodedImage> {
    let file = File::open(path)
        .map_err(|e| ConvertError::Decode(format!("cannot open {}: {}", path.display(), e)))?;

    let image = image::load(BufReader::new(file), format.codec())
        .map_err(|e| ConvertError::Decode(format!("{}: {}", path.display(), e)))?;

    Ok(DecodedImage::new(image, format))
}
