//! Black-and-white conversion by channel averaging.

use crate::encode::{encode_image, EncodedImage};
use crate::load::load_image;
use crate::{ImageFormat, Result};
use image::{DynamicImage, Rgba, RgbaImage};
use tracing::info;

/// Replace each pixel's color with the plain mean of its RGB channels.
///
/// Unlike luma weighting this treats red, green and blue equally. Alpha is
/// carried over unchanged.
pub fn to_grayscale(img: &DynamicImage) -> DynamicImage {
    let rgba = img.to_rgba8();
    let out = RgbaImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let avg = ((u16::from(r) + u16::from(g) + u16::from(b)) / 3) as u8;
        Rgba([avg, avg, avg, a])
    });
    DynamicImage::ImageRgba8(out)
}

/// Decode, convert to grayscale, and encode.
pub fn grayscale_image(data: &[u8], format: ImageFormat, quality: u8) -> Result<EncodedImage> {
    let (img, _) = load_image(data)?;
    let encoded = encode_image(&to_grayscale(&img), format, quality)?;
    info!(width = encoded.width, height = encoded.height, "Converted to grayscale");
    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_not_luma() {
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 0, Rgba([10, 20, 31, 77]));

        let gray = to_grayscale(&DynamicImage::ImageRgba8(img)).to_rgba8();
        assert_eq!(gray.get_pixel(0, 0), &Rgba([85, 85, 85, 255]));
        assert_eq!(gray.get_pixel(1, 0), &Rgba([20, 20, 20, 77]));
    }

    #[test]
    fn test_grayscale_roundtrip_png() {
        use image::ImageOutputFormat;
        use std::io::Cursor;

        let src = RgbaImage::from_pixel(3, 3, Rgba([90, 30, 0, 255]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(src).write_to(&mut buf, ImageOutputFormat::Png).unwrap();

        let out = grayscale_image(&buf.into_inner(), ImageFormat::Png, 90).unwrap();
        let decoded = image::load_from_memory(&out.bytes).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(1, 1), &Rgba([40, 40, 40, 255]));
    }
}
