//! Re-encode an image as JPEG at a chosen quality.

use crate::encode::{encode_image, EncodedImage};
use crate::load::load_image;
use crate::{ImageError, ImageFormat, Result};
use serde::Serialize;
use std::ops::RangeInclusive;
use tracing::info;

/// Accepted quality settings.
pub const QUALITY_RANGE: RangeInclusive<u8> = 10..=100;

/// Default compression quality.
pub const DEFAULT_QUALITY: u8 = 80;

/// Result of a compression run.
#[derive(Debug, Clone)]
pub struct Compressed {
    /// Encoded output
    pub image: EncodedImage,
    /// Size of the input file
    pub original_size: usize,
}

/// Size summary suitable for JSON output.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CompressionStats {
    /// Input size in bytes
    pub original_size: usize,
    /// Output size in bytes
    pub compressed_size: usize,
    /// Percentage saved; negative when the output grew
    pub saved_percent: f64,
}

impl Compressed {
    /// Input and output sizes.
    pub fn stats(&self) -> CompressionStats {
        let compressed_size = self.image.size_bytes();
        let saved_percent = if self.original_size == 0 {
            0.0
        } else {
            (1.0 - compressed_size as f64 / self.original_size as f64) * 100.0
        };
        CompressionStats {
            original_size: self.original_size,
            compressed_size,
            saved_percent,
        }
    }
}

/// Compress `data` to JPEG at `quality` (10-100), keeping its dimensions.
pub fn compress_image(data: &[u8], quality: u8) -> Result<Compressed> {
    if !QUALITY_RANGE.contains(&quality) {
        return Err(ImageError::InvalidParameter(format!(
            "quality must be between {} and {}, got {}",
            QUALITY_RANGE.start(),
            QUALITY_RANGE.end(),
            quality
        )));
    }

    let (img, _) = load_image(data)?;
    let image = encode_image(&img, ImageFormat::Jpeg, quality)?;
    let compressed = Compressed {
        image,
        original_size: data.len(),
    };

    let stats = compressed.stats();
    info!(
        quality,
        original = stats.original_size,
        compressed = stats.compressed_size,
        "Image compressed"
    );
    Ok(compressed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn noisy_png() -> Vec<u8> {
        let img = RgbImage::from_fn(64, 64, |x, y| Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x ^ y) % 256) as u8]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img).write_to(&mut buf, ImageOutputFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_compress_keeps_dimensions() {
        let out = compress_image(&noisy_png(), DEFAULT_QUALITY).unwrap();
        assert_eq!((out.image.width, out.image.height), (64, 64));
        assert_eq!(out.image.format, ImageFormat::Jpeg);
    }

    #[test]
    fn test_lower_quality_is_smaller() {
        let data = noisy_png();
        let low = compress_image(&data, 10).unwrap();
        let high = compress_image(&data, 100).unwrap();
        assert!(low.image.size_bytes() < high.image.size_bytes());
    }

    #[test]
    fn test_quality_range() {
        assert!(matches!(compress_image(&noisy_png(), 5), Err(ImageError::InvalidParameter(_))));
    }

    #[test]
    fn test_stats() {
        let compressed = Compressed {
            image: EncodedImage {
                bytes: vec![0; 25],
                format: ImageFormat::Jpeg,
                width: 1,
                height: 1,
            },
            original_size: 100,
        };
        let stats = compressed.stats();
        assert_eq!(stats.compressed_size, 25);
        assert!((stats.saved_percent - 75.0).abs() < 1e-9);
    }
}
