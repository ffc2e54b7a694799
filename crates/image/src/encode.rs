//! Encoding pixel buffers into downloadable files.

use crate::{ImageError, ImageFormat, Result};
use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use std::io::Cursor;

/// Highest JPEG quality the encoder accepts.
pub const MAX_QUALITY: u8 = 100;

/// Background used when a lossy format cannot carry transparency.
pub const FLATTEN_BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// Export format for committed crops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// PNG, bit-exact
    #[default]
    Lossless,
    /// JPEG at maximum quality
    #[serde(rename = "lossy")]
    MaxQualityLossy,
}

impl OutputFormat {
    /// File format written for this choice.
    pub fn image_format(&self) -> ImageFormat {
        match self {
            OutputFormat::Lossless => ImageFormat::Png,
            OutputFormat::MaxQualityLossy => ImageFormat::Jpeg,
        }
    }

    /// Encoder quality. Lossless ignores it.
    pub fn quality(&self) -> u8 {
        MAX_QUALITY
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lossless" | "png" => Ok(OutputFormat::Lossless),
            "lossy" | "jpeg" | "jpg" => Ok(OutputFormat::MaxQualityLossy),
            other => Err(format!("unknown output format '{}', expected lossless or lossy", other)),
        }
    }
}

/// Encoded image bytes plus what a download needs to know about them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// File contents
    pub bytes: Vec<u8>,
    /// Container format of `bytes`
    pub format: ImageFormat,
    /// Pixel width
    pub width: u32,
    /// Pixel height
    pub height: u32,
}

impl EncodedImage {
    /// MIME type for `bytes`.
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// Size of the encoded file.
    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }

    /// Suggested download name, `<stem>.<ext>`.
    pub fn file_name(&self, stem: &str) -> String {
        format!("{}.{}", stem, self.format.extension())
    }
}

/// Encode a DynamicImage to bytes.
///
/// JPEG output is composited over white first since the format has no alpha.
pub fn encode_image(img: &DynamicImage, format: ImageFormat, quality: u8) -> Result<EncodedImage> {
    let mut buffer = Cursor::new(Vec::new());

    match format {
        ImageFormat::Jpeg => {
            if quality == 0 || quality > MAX_QUALITY {
                return Err(ImageError::InvalidParameter(format!(
                    "JPEG quality must be between 1 and {}, got {}",
                    MAX_QUALITY, quality
                )));
            }
            let flat = DynamicImage::ImageRgb8(flatten_alpha(img, FLATTEN_BACKGROUND));
            flat.write_to(&mut buffer, ImageOutputFormat::Jpeg(quality))?;
        }
        ImageFormat::Png => img.write_to(&mut buffer, ImageOutputFormat::Png)?,
        ImageFormat::Gif => img.write_to(&mut buffer, ImageOutputFormat::Gif)?,
        ImageFormat::WebP => return Err(ImageError::UnsupportedOutput(format.to_string())),
    }

    Ok(EncodedImage {
        bytes: buffer.into_inner(),
        format,
        width: img.width(),
        height: img.height(),
    })
}

/// Composite every pixel over `background` and drop the alpha channel.
pub fn flatten_alpha(img: &DynamicImage, background: Rgb<u8>) -> RgbImage {
    if !has_alpha_channel(img) {
        return img.to_rgb8();
    }

    let rgba = img.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let a = u32::from(a);
        let blend = |fg: u8, bg: u8| ((u32::from(fg) * a + u32::from(bg) * (255 - a) + 127) / 255) as u8;
        Rgb([
            blend(r, background[0]),
            blend(g, background[1]),
            blend(b, background[2]),
        ])
    })
}

/// Check if an image has an alpha channel.
pub fn has_alpha_channel(img: &DynamicImage) -> bool {
    img.color().has_alpha()
}
