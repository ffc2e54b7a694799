//! Full-resolution crop export.
//!
//! The crop rectangle is chosen on a scaled-down preview, but the exported
//! file is cut from the original pixels so the preview size never limits
//! output quality.

use crate::encode::{encode_image, EncodedImage, OutputFormat};
use crate::geometry::{CropRect, DisplayGeometry, NaturalGeometry};
use crate::{ImageError, Result};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use tracing::{info, warn};

/// Default cap on output surface area (16384 x 16384).
pub const DEFAULT_MAX_OUTPUT_PIXELS: u64 = 16_384 * 16_384;

/// Cut `rect` (display units) out of `source` at native resolution and encode it.
///
/// The display→natural scale is derived here on every call. The output keeps
/// the source's color type, so 16-bit sources stay 16-bit under lossless
/// export. `source` is only read, so repeated calls with the same inputs
/// give the same bytes.
pub fn export_crop(
    source: &DynamicImage,
    rect: CropRect,
    display: DisplayGeometry,
    format: OutputFormat,
    max_output_pixels: u64,
) -> Result<EncodedImage> {
    if !display.is_usable() {
        return Err(ImageError::InvalidParameter(format!(
            "display size {}x{} cannot be mapped onto the source",
            display.width, display.height
        )));
    }

    let natural = NaturalGeometry::new(source.width(), source.height());
    let source_rect = rect.to_source(display, natural);
    let (out_w, out_h) = source_rect.output_size();
    let bytes_per_pixel = u64::from(source.color().bytes_per_pixel());

    let (out_w, out_h) = match reserve_surface(out_w, out_h, bytes_per_pixel, max_output_pixels) {
        Ok(size) => size,
        Err(e) => {
            warn!(width = out_w, height = out_h, error = %e, "Crop surface unavailable");
            return Err(e);
        }
    };

    let (x, y, w, h) = source_rect.pixel_window(natural);
    if w == 0 || h == 0 {
        return Err(ImageError::InvalidParameter(format!(
            "crop region {:?} lies outside the {}x{} source",
            source_rect, natural.width, natural.height
        )));
    }

    let region = source.crop_imm(x, y, w, h);
    let output = if region.dimensions() == (out_w, out_h) {
        region
    } else {
        // Rounding left the window a pixel off the target size; resample to fit.
        region.resize_exact(out_w, out_h, FilterType::Lanczos3)
    };

    let encoded = encode_image(&output, format.image_format(), format.quality())?;

    info!(
        source_width = natural.width,
        source_height = natural.height,
        crop_x = x,
        crop_y = y,
        width = encoded.width,
        height = encoded.height,
        bytes = encoded.size_bytes(),
        mime = encoded.mime_type(),
        color = ?output.color(),
        "Crop exported"
    );

    Ok(encoded)
}

/// Check that an output surface of this size can be backed, refusing empty,
/// oversized or unallocatable surfaces.
fn reserve_surface(width: u64, height: u64, bytes_per_pixel: u64, max_pixels: u64) -> Result<(u32, u32)> {
    if width == 0 || height == 0 {
        return Err(ImageError::surface(width, height, "empty surface"));
    }
    let (w, h) = match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) => (w, h),
        _ => return Err(ImageError::surface(width, height, "edge exceeds u32 range")),
    };
    let area = width
        .checked_mul(height)
        .ok_or_else(|| ImageError::surface(width, height, "area overflows"))?;
    if area > max_pixels {
        return Err(ImageError::surface(
            width,
            height,
            format!("{} pixels exceeds the {} pixel budget", area, max_pixels),
        ));
    }
    let len = area
        .checked_mul(bytes_per_pixel)
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| ImageError::surface(width, height, "buffer length overflows"))?;

    let mut buf: Vec<u8> = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|e| ImageError::surface(width, height, e.to_string()))?;

    Ok((w, h))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ImageFormat;
    use image::{ColorType, ImageBuffer, Rgb, Rgba, RgbaImage};

    fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
        }))
    }

    #[test]
    fn test_export_at_native_resolution() {
        let source = gradient(2000, 2000);
        let out = export_crop(
            &source,
            CropRect::new(100.0, 100.0, 100.0, 100.0),
            DisplayGeometry::new(500.0, 500.0),
            OutputFormat::Lossless,
            DEFAULT_MAX_OUTPUT_PIXELS,
        )
        .unwrap();

        assert_eq!((out.width, out.height), (400, 400));
        assert_eq!(out.format, ImageFormat::Png);

        let decoded = image::load_from_memory(&out.bytes).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (400, 400));
        assert_eq!(decoded.get_pixel(0, 0), &Rgba([144, 144, 32, 255]));
    }

    #[test]
    fn test_export_is_repeatable() {
        let source = gradient(300, 200);
        let rect = CropRect::new(10.0, 20.0, 60.0, 55.0);
        let display = DisplayGeometry::new(150.0, 100.0);

        let first = export_crop(&source, rect, display, OutputFormat::Lossless, DEFAULT_MAX_OUTPUT_PIXELS).unwrap();
        let second = export_crop(&source, rect, display, OutputFormat::Lossless, DEFAULT_MAX_OUTPUT_PIXELS).unwrap();
        assert_eq!(first.bytes, second.bytes);
    }

    #[test]
    fn test_export_lossy() {
        let source = gradient(100, 100);
        let out = export_crop(
            &source,
            CropRect::new(0.0, 0.0, 50.0, 50.0),
            DisplayGeometry::new(100.0, 100.0),
            OutputFormat::MaxQualityLossy,
            DEFAULT_MAX_OUTPUT_PIXELS,
        )
        .unwrap();
        assert_eq!(out.mime_type(), "image/jpeg");
        assert_eq!((out.width, out.height), (50, 50));
    }

    #[test]
    fn test_surface_budget() {
        let source = gradient(400, 400);
        let err = export_crop(
            &source,
            CropRect::new(0.0, 0.0, 100.0, 100.0),
            DisplayGeometry::new(100.0, 100.0),
            OutputFormat::Lossless,
            1000,
        )
        .unwrap_err();
        assert!(matches!(err, ImageError::SurfaceUnavailable { width: 400, height: 400, .. }));
        assert!(err.is_transient());
    }

    #[test]
    fn test_unusable_display() {
        let source = gradient(10, 10);
        let err = export_crop(
            &source,
            CropRect::new(0.0, 0.0, 5.0, 5.0),
            DisplayGeometry::new(0.0, 10.0),
            OutputFormat::Lossless,
            DEFAULT_MAX_OUTPUT_PIXELS,
        )
        .unwrap_err();
        assert!(matches!(err, ImageError::InvalidParameter(_)));
    }

    #[test]
    fn test_lossless_keeps_16_bit_samples() {
        let source = DynamicImage::ImageRgb16(ImageBuffer::from_fn(100, 100, |x, y| {
            Rgb([x as u16 * 601, y as u16 * 603, 40_001])
        }));
        let out = export_crop(
            &source,
            CropRect::new(1.0, 1.0, 50.0, 50.0),
            DisplayGeometry::new(100.0, 100.0),
            OutputFormat::Lossless,
            DEFAULT_MAX_OUTPUT_PIXELS,
        )
        .unwrap();

        let decoded = image::load_from_memory(&out.bytes).unwrap();
        assert_eq!(decoded.color(), ColorType::Rgb16);
        assert_eq!(decoded.dimensions(), (50, 50));
        let decoded = decoded.to_rgb16();
        assert_eq!(decoded.get_pixel(0, 0), &Rgb([601, 603, 40_001]));
        assert_eq!(decoded.get_pixel(49, 49), &Rgb([50 * 601, 50 * 603, 40_001]));
    }

    #[test]
    fn test_reserve_surface() {
        assert!(reserve_surface(0, 10, 4, DEFAULT_MAX_OUTPUT_PIXELS).is_err());
        assert!(reserve_surface(u64::from(u32::MAX) + 1, 1, 4, u64::MAX).is_err());
        assert_eq!(reserve_surface(3, 2, 6, DEFAULT_MAX_OUTPUT_PIXELS).unwrap(), (3, 2));
    }
}
