//! Image resizing with the image crate.

use crate::encode::{encode_image, EncodedImage};
use crate::load::load_image;
use crate::{ImageError, ImageFormat, Result};
use image::imageops::FilterType;
use std::ops::RangeInclusive;
use tracing::info;

/// Accepted output edge lengths, in pixels.
pub const DIMENSION_RANGE: RangeInclusive<u32> = 100..=2000;

/// Common social-media and screen presets as `(label, width, height)`.
pub const PRESETS: [(&str, u32, u32); 4] = [
    ("instagram", 1080, 1080),
    ("facebook", 1200, 630),
    ("twitter", 1200, 675),
    ("hd", 1920, 1080),
];

/// Options for image resizing.
#[derive(Debug, Clone)]
pub struct ResizeOptions {
    /// Target width
    pub width: u32,
    /// Target height (ignored when `keep_aspect` is set)
    pub height: u32,
    /// Derive the height from the width and the source aspect ratio
    pub keep_aspect: bool,
    /// JPEG quality (1-100)
    pub quality: u8,
    /// Output format
    pub format: ImageFormat,
}

impl Default for ResizeOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            keep_aspect: false,
            quality: 90,
            format: ImageFormat::Jpeg,
        }
    }
}

impl ResizeOptions {
    /// Options for a named preset, if it exists.
    pub fn preset(name: &str) -> Option<Self> {
        PRESETS
            .iter()
            .find(|(label, _, _)| label.eq_ignore_ascii_case(name))
            .map(|&(_, width, height)| Self {
                width,
                height,
                ..Self::default()
            })
    }

    fn validate(&self) -> Result<()> {
        let mut dims = vec![("width", self.width)];
        if !self.keep_aspect {
            dims.push(("height", self.height));
        }
        for (name, value) in dims {
            if !DIMENSION_RANGE.contains(&value) {
                return Err(ImageError::InvalidParameter(format!(
                    "{} must be between {} and {}, got {}",
                    name,
                    DIMENSION_RANGE.start(),
                    DIMENSION_RANGE.end(),
                    value
                )));
            }
        }
        Ok(())
    }
}

/// Resize an image to exact dimensions and encode it.
pub fn resize_image(data: &[u8], options: &ResizeOptions) -> Result<EncodedImage> {
    options.validate()?;
    let (img, _) = load_image(data)?;

    let (width, height) = if options.keep_aspect {
        calculate_dimensions(img.width(), img.height(), options.width)
    } else {
        (options.width, options.height)
    };

    let resized = img.resize_exact(width, height, FilterType::Lanczos3);
    let encoded = encode_image(&resized, options.format, options.quality)?;

    info!(
        from_width = img.width(),
        from_height = img.height(),
        width,
        height,
        bytes = encoded.size_bytes(),
        "Image resized"
    );
    Ok(encoded)
}

/// Height matching `target_width` at the source aspect ratio.
///
/// # Example
/// ```
/// use imgkit_image::resize::calculate_dimensions;
///
/// assert_eq!(calculate_dimensions(4000, 3000, 800), (800, 600));
/// ```
pub fn calculate_dimensions(current_width: u32, current_height: u32, target_width: u32) -> (u32, u32) {
    if current_width == 0 {
        return (target_width, current_height.max(1));
    }
    let ratio = f64::from(target_width) / f64::from(current_width);
    let new_height = (f64::from(current_height) * ratio).round() as u32;
    (target_width, new_height.max(1))
}

/// Download name used by the resize tool.
pub fn output_stem(width: u32, height: u32) -> String {
    format!("resized-image-{}x{}", width, height)
}
