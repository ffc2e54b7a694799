//! Image metadata extraction.

use crate::{detect_format, ImageFormat, Result};
use image::io::Reader;
use serde::{Deserialize, Serialize};
use std::io::Cursor;

/// Image metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageMetadata {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Detected format
    pub format: ImageFormat,
    /// File size in bytes
    pub size_bytes: usize,
}

/// Which edge of an image is longer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Wider than tall
    Landscape,
    /// Taller than wide
    Portrait,
    /// Equal edges
    Square,
}

impl ImageMetadata {
    /// Calculate aspect ratio (width / height).
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    /// Orientation from the pixel dimensions.
    pub fn orientation(&self) -> Orientation {
        use std::cmp::Ordering;
        match self.width.cmp(&self.height) {
            Ordering::Greater => Orientation::Landscape,
            Ordering::Less => Orientation::Portrait,
            Ordering::Equal => Orientation::Square,
        }
    }
}

/// Read format and dimensions from the file header without decoding pixels.
pub fn extract_metadata(data: &[u8]) -> Result<ImageMetadata> {
    let format = detect_format(data)?;
    let (width, height) = Reader::new(Cursor::new(data))
        .with_guessed_format()?
        .into_dimensions()?;

    Ok(ImageMetadata {
        width,
        height,
        format,
        size_bytes: data.len(),
    })
}
