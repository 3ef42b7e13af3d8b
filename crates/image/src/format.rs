//! Source and target format enumerations.

use crate::ConvertError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Formats an upload can be decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// JPEG image
    Jpeg,
    /// PNG image
    Png,
    /// GIF image
    Gif,
    /// BMP image
    Bmp,
    /// WebP image
    WebP,
}

impl SourceFormat {
    /// Every decodable source format.
    pub const ALL: [SourceFormat; 5] = [
        SourceFormat::Jpeg,
        SourceFormat::Png,
        SourceFormat::Gif,
        SourceFormat::Bmp,
        SourceFormat::WebP,
    ];

    /// Map a declared MIME type onto a source format.
    ///
    /// The MIME type is lower-cased first. `image/jpg` is accepted as a
    /// legacy alias for JPEG.
    ///
    /// # Example
    /// ```
    /// use uic_image::SourceFormat;
    ///
    /// assert_eq!(SourceFormat::from_mime("IMAGE/PNG"), Some(SourceFormat::Png));
    /// assert_eq!(SourceFormat::from_mime("image/jpg"), Some(SourceFormat::Jpeg));
    /// assert_eq!(SourceFormat::from_mime("image/tiff"), None);
    /// ```
    pub fn from_mime(mime: &str) -> Option<Self> {
        match normalize_mime(mime).as_str() {
            "image/jpeg" | "image/jpg" => Some(SourceFormat::Jpeg),
            "image/png" => Some(SourceFormat::Png),
            "image/gif" => Some(SourceFormat::Gif),
            "image/bmp" => Some(SourceFormat::Bmp),
            "image/webp" => Some(SourceFormat::WebP),
            _ => None,
        }
    }

    /// Get the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            SourceFormat::Jpeg => "image/jpeg",
            SourceFormat::Png => "image/png",
            SourceFormat::Gif => "image/gif",
            SourceFormat::Bmp => "image/bmp",
            SourceFormat::WebP => "image/webp",
        }
    }

    /// Get common file extensions for this format.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            SourceFormat::Jpeg => &["jpg", "jpeg", "jpe"],
            SourceFormat::Png => &["png"],
            SourceFormat::Gif => &["gif"],
            SourceFormat::Bmp => &["bmp"],
            SourceFormat::WebP => &["webp"],
        }
    }

    pub(crate) fn codec(&self) -> image::ImageFormat {
        match self {
            SourceFormat::Jpeg => image::ImageFormat::Jpeg,
            SourceFormat::Png => image::ImageFormat::Png,
            SourceFormat::Gif => image::ImageFormat::Gif,
            SourceFormat::Bmp => image::ImageFormat::Bmp,
            SourceFormat::WebP => image::ImageFormat::WebP,
        }
    }
}

/// Formats an upload can be converted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    /// WebP image (lossy)
    WebP,
    /// JPEG image
    #[serde(alias = "jpg")]
    Jpeg,
    /// PNG image
    Png,
    /// GIF image
    Gif,
}

impl TargetFormat {
    /// Every supported target format.
    pub const ALL: [TargetFormat; 4] = [
        TargetFormat::WebP,
        TargetFormat::Jpeg,
        TargetFormat::Png,
        TargetFormat::Gif,
    ];

    /// Format identifier, also used as the output file extension.
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetFormat::WebP => "webp",
            TargetFormat::Jpeg => "jpeg",
            TargetFormat::Png => "png",
            TargetFormat::Gif => "gif",
        }
    }

    /// Canonical file extension written for converted files.
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }

    /// Canonical MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            TargetFormat::WebP => "image/webp",
            TargetFormat::Jpeg => "image/jpeg",
            TargetFormat::Png => "image/png",
            TargetFormat::Gif => "image/gif",
        }
    }

    /// Whether the encoded output keeps an alpha channel.
    pub fn supports_alpha(&self) -> bool {
        matches!(self, TargetFormat::WebP | TargetFormat::Png)
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetFormat {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "webp" => Ok(TargetFormat::WebP),
            "jpeg" | "jpg" => Ok(TargetFormat::Jpeg),
            "png" => Ok(TargetFormat::Png),
            "gif" => Ok(TargetFormat::Gif),
            other => Err(ConvertError::UnsupportedFormat(format!(
                "unknown target format '{}'",
                other
            ))),
        }
    }
}

/// Lower-case and trim a MIME type for comparison.
pub fn normalize_mime(mime: &str) -> String {
    mime.trim().to_ascii_lowercase()
}

/// Derive a declared MIME type from a file extension.
///
/// This mirrors what an upload host does before handing the file over; the
/// result is trusted as-is, the file bytes are never sniffed.
pub fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    SourceFormat::ALL
        .iter()
        .find(|format| format.extensions().contains(&ext.as_str()))
        .map(|format| format.mime_type())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_from_mime() {
        assert_eq!(SourceFormat::from_mime("image/jpeg"), Some(SourceFormat::Jpeg));
        assert_eq!(SourceFormat::from_mime("image/bmp"), Some(SourceFormat::Bmp));
        assert_eq!(SourceFormat::from_mime(" Image/WebP "), Some(SourceFormat::WebP));
        assert_eq!(SourceFormat::from_mime("application/pdf"), None);
    }

    #[test]
    fn test_target_from_str() {
        assert_eq!("webp".parse::<TargetFormat>().unwrap(), TargetFormat::WebP);
        assert_eq!("JPG".parse::<TargetFormat>().unwrap(), TargetFormat::Jpeg);
        assert!("tiff".parse::<TargetFormat>().is_err());
    }

    #[test]
    fn test_target_serde_names() {
        let json = serde_json::to_string(&TargetFormat::WebP).unwrap();
        assert_eq!(json, "\"webp\"");
        let parsed: TargetFormat = serde_json::from_str("\"jpg\"").unwrap();
        assert_eq!(parsed, TargetFormat::Jpeg);
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(TargetFormat::Jpeg.mime_type(), "image/jpeg");
        assert_eq!(TargetFormat::Png.mime_type(), "image/png");
        assert_eq!(TargetFormat::WebP.mime_type(), "image/webp");
        assert_eq!(TargetFormat::Jpeg.extension(), "jpeg");
    }

    #[test]
    fn test_mime_from_extension() {
        assert_eq!(mime_from_extension(Path::new("a/photo.JPG")), Some("image/jpeg"));
        assert_eq!(mime_from_extension(Path::new("scan.bmp")), Some("image/bmp"));
        assert_eq!(mime_from_extension(Path::new("doc.pdf")), None);
        assert_eq!(mime_from_extension(Path::new("noext")), None);
    }
}
