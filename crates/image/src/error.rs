//! Error types for the image crate.

use thiserror::Error;

/// Result type alias for image operations.
pub type Result<T> = std::result::Result<T, ImageError>;

/// Errors that can occur during image operations.
#[derive(Debug, Error)]
pub enum ImageError {
    /// Unknown image format
    #[error("Unknown image format")]
    UnknownFormat,

    /// Invalid image data
    #[error("Invalid image data: {0}")]
    InvalidData(String),

    /// A tool parameter was outside its accepted range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The output surface for a crop could not be allocated
    #[error("Output surface unavailable ({width}x{height}): {reason}")]
    SurfaceUnavailable {
        /// Requested surface width
        width: u64,
        /// Requested surface height
        height: u64,
        /// Why allocation was refused
        reason: String,
    },

    /// The requested output format has no encoder
    #[error("Unsupported output format: {0}")]
    UnsupportedOutput(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Image processing error
    #[error("Image processing error: {0}")]
    ProcessingError(#[from] image::ImageError),
}

impl ImageError {
    pub(crate) fn surface(width: u64, height: u64, reason: impl Into<String>) -> Self {
        ImageError::SurfaceUnavailable {
            width,
            height,
            reason: reason.into(),
        }
    }

    /// Whether retrying the same call could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, ImageError::SurfaceUnavailable { .. } | ImageError::IoError(_))
    }
}
