//! Decoding user-supplied files.

use crate::{detect_format, ImageFormat, Result};
use image::DynamicImage;
use std::path::Path;
use tracing::debug;

/// Decode image bytes, checking the magic number first so unsupported
/// files fail with a format error rather than a decoder error.
pub fn load_image(data: &[u8]) -> Result<(DynamicImage, ImageFormat)> {
    let format = detect_format(data)?;
    let img = image::load_from_memory(data)?;
    debug!(%format, width = img.width(), height = img.height(), "Image decoded");
    Ok((img, format))
}

/// Read and decode an image file.
pub fn open_image(path: &Path) -> Result<(DynamicImage, ImageFormat)> {
    let data = std::fs::read(path)?;
    load_image(&data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ImageError;

    #[test]
    fn test_load_rejects_unknown_bytes() {
        assert!(matches!(load_image(b"\x00\x01\x02\x03\x04"), Err(ImageError::UnknownFormat)));
    }

    #[test]
    fn test_load_reports_corrupt_data() {
        // Valid PNG signature, truncated body
        let data = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00];
        assert!(matches!(load_image(&data), Err(ImageError::ProcessingError(_))));
    }

    #[test]
    fn test_open_missing_file() {
        let err = open_image(Path::new("/nonexistent/input.png")).unwrap_err();
        assert!(matches!(err, ImageError::IoError(_)));
    }
}
