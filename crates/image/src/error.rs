//! Error types for the image conversion crate.

use thiserror::Error;

/// Result type alias for conversion operations.
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Errors that can occur while converting an upload.
///
/// None of these abort the surrounding upload: the pipeline absorbs every
/// variant and hands the original file back unchanged.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Source or target format is not recognized
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Source bytes could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Target encoder is not available in this build
    #[error("Capability unavailable: {0}")]
    CapabilityUnavailable(&'static str),

    /// Encoding or writing the output failed
    #[error("Encode error: {0}")]
    Encode(String),

    /// Invalid converter configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConvertError {
    /// Short machine-readable kind, used in logs and JSON reports.
    pub fn kind(&self) -> &'static str {
        match self {
            ConvertError::UnsupportedFormat(_) => "unsupported_format",
            ConvertError::Decode(_) => "decode_error",
            ConvertError::CapabilityUnavailable(_) => "capability_unavailable",
            ConvertError::Encode(_) => "encode_error",
            ConvertError::Config(_) => "config_error",
            ConvertError::Io(_) => "io_error",
        }
    }
}
