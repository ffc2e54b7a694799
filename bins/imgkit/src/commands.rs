//! Subcommand implementations.

use anyhow::Context;
use imgkit_cli::output::{format_change, format_dimensions, format_size, Status};
use imgkit_cli::progress;
use imgkit_core::config::{Config, OutputFormatSetting};
use imgkit_core::{Error, ErrorCode};
use imgkit_image::{
    detect_format, export_crop, extract_metadata, open_image, parse_events, replay, resize_image, CropRect,
    CropSession, DisplayGeometry, EncodedImage, FitBox, FixedSize, ImageError, ImageFormat, LayoutSurface,
    NaturalGeometry, OutputFormat, ResizeOptions, SessionConfig,
};
use imgkit_image::compress::compress_image;
use imgkit_image::grayscale::grayscale_image;
use imgkit_image::resize::output_stem;
use imgkit_telemetry::Timer;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Map a library error onto a coded CLI error.
pub fn image_error(err: ImageError) -> Error {
    let message = err.to_string();
    match err {
        ImageError::UnknownFormat => Error::unsupported_format(message),
        ImageError::InvalidData(_) => Error::new(ErrorCode::DecodeFailed, message),
        ImageError::InvalidParameter(_) => Error::invalid_input(message),
        ImageError::SurfaceUnavailable { .. } => Error::surface_unavailable(message),
        ImageError::UnsupportedOutput(_) => Error::new(ErrorCode::EncodeFailed, message),
        ImageError::IoError(e) => Error::from(e),
        ImageError::ProcessingError(e) => Error::new(ErrorCode::DecodeFailed, message).with_source(e),
    }
}

/// How the crop command lays the image out.
enum Surface {
    Fixed(FixedSize),
    Fit(FitBox),
    Natural,
}

impl Surface {
    fn resized(&self, width: f64, height: f64) -> Surface {
        match self {
            Surface::Fit(fit) => Surface::Fit(FitBox { width, height, ..*fit }),
            Surface::Fixed(_) | Surface::Natural => {
                Surface::Fixed(FixedSize(DisplayGeometry::new(width, height)))
            }
        }
    }
}

impl LayoutSurface for Surface {
    fn display_size(&self, natural: NaturalGeometry) -> DisplayGeometry {
        match self {
            Surface::Fixed(fixed) => fixed.display_size(natural),
            Surface::Fit(fit) => fit.display_size(natural),
            Surface::Natural => DisplayGeometry::new(f64::from(natural.width), f64::from(natural.height)),
        }
    }
}

pub struct CropArgs {
    pub input: PathBuf,
    pub display: Option<(f64, f64)>,
    pub fit: Option<(f64, f64)>,
    pub rect: Option<CropRect>,
    pub events: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub output: Option<PathBuf>,
    pub json: bool,
}

pub fn crop(args: CropArgs, config: &Config) -> anyhow::Result<()> {
    let timer = Timer::start("crop");
    let crop_config = &config.schema.crop;
    let format = args.format.unwrap_or(match crop_config.format {
        OutputFormatSetting::Lossless => OutputFormat::Lossless,
        OutputFormatSetting::Lossy => OutputFormat::MaxQualityLossy,
    });

    let surface = match (args.display, args.fit) {
        (Some((w, h)), _) => Surface::Fixed(FixedSize(DisplayGeometry::new(w, h))),
        (None, Some((w, h))) => Surface::Fit(FitBox::new(w, h)),
        (None, None) => Surface::Natural,
    };

    let mut session = CropSession::new(SessionConfig {
        min_size: crop_config.min_size,
        initial_fraction: crop_config.initial_fraction,
        max_output_pixels: crop_config.max_output_pixels,
    });

    let (pixels, _) = open_image(&args.input)
        .map_err(image_error)
        .with_context(|| format!("Loading {}", args.input.display()))?;
    let placement = session.on_image_loaded(pixels, &surface).map_err(image_error)?;
    debug!(?placement, "Crop session ready");

    if let Some(path) = &args.events {
        let script = std::fs::read_to_string(path)
            .map_err(Error::from)
            .with_context(|| format!("Reading {}", path.display()))?;
        let events = parse_events(&script).map_err(image_error)?;
        let rect = replay(&mut session, &events, |w, h| surface.resized(w, h));
        if !args.json {
            Status::info(&format!(
                "Replayed {} events, selection {:.0},{:.0} {:.0}×{:.0}",
                events.len(),
                rect.x,
                rect.y,
                rect.width,
                rect.height
            ));
        }
    }

    let display = session
        .display()
        .ok_or_else(|| Error::new(ErrorCode::Internal, "crop session lost its image"))?;
    let rect = match args.rect {
        Some(rect) => rect.normalized(display, session.config().min_size),
        None => session.rect(),
    };

    let pb = if args.json { progress::hidden() } else { progress::spinner("Cropping...") };
    let result = match (args.rect, session.source()) {
        (Some(_), Some(source)) => {
            export_crop(source, rect, display, format, session.config().max_output_pixels).map(Some)
        }
        _ => session.commit(format),
    };
    let encoded = match result {
        Ok(Some(encoded)) => {
            progress::finish_success(&pb, "Cropped");
            encoded
        }
        Ok(None) => {
            progress::finish_error(&pb, "No image loaded");
            return Err(Error::new(ErrorCode::Internal, "nothing to crop").into());
        }
        Err(e) => {
            progress::finish_error(&pb, "Crop failed");
            return Err(image_error(e).into());
        }
    };

    let path = args.output.unwrap_or_else(|| PathBuf::from(encoded.file_name("cropped-image")));
    write_output(&path, &encoded)?;
    let elapsed = timer.stop();

    if args.json {
        let report = serde_json::json!({
            "output": path.to_string_lossy(),
            "mime": encoded.mime_type(),
            "width": encoded.width,
            "height": encoded.height,
            "size_bytes": encoded.size_bytes(),
            "display": display,
            "rect": rect,
            "elapsed_ms": elapsed.as_millis() as u64,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        Status::success(&format!("Saved {}", path.display()));
        Status::field("Selection", format!(
            "{:.0},{:.0} {:.0}×{:.0} on {:.0}×{:.0}",
            rect.x, rect.y, rect.width, rect.height, display.width, display.height
        ));
        Status::field("Output", format_dimensions(encoded.width, encoded.height));
        Status::field("Format", encoded.mime_type());
        Status::field("Size", format_size(encoded.size_bytes() as u64));
    }
    Ok(())
}

pub struct ResizeArgs {
    pub input: PathBuf,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub preset: Option<String>,
    pub keep_aspect: bool,
    pub quality: Option<u8>,
    pub output: Option<PathBuf>,
}

pub fn resize(args: ResizeArgs, config: &Config) -> anyhow::Result<()> {
    let resize_config = &config.schema.resize;
    let mut options = match &args.preset {
        Some(name) => ResizeOptions::preset(name).ok_or_else(|| {
            Error::invalid_input(format!("unknown preset '{}'", name))
                .with_suggestion("Use one of: instagram, facebook, twitter, hd")
        })?,
        None => ResizeOptions {
            width: args.width.unwrap_or(resize_config.width),
            height: args.height.unwrap_or(resize_config.height),
            ..ResizeOptions::default()
        },
    };
    options.keep_aspect = args.keep_aspect;
    options.quality = args.quality.unwrap_or(resize_config.quality);
    options.format = output_format(args.output.as_deref());

    let data = read_input(&args.input)?;
    let encoded = resize_image(&data, &options).map_err(image_error)?;

    let stem = output_stem(encoded.width, encoded.height);
    let path = args.output.unwrap_or_else(|| PathBuf::from(encoded.file_name(&stem)));
    write_output(&path, &encoded)?;

    Status::success(&format!(
        "Resized to {} → {}",
        format_dimensions(encoded.width, encoded.height),
        path.display()
    ));
    Ok(())
}

pub fn compress(
    input: &Path,
    quality: Option<u8>,
    output: Option<PathBuf>,
    json: bool,
    config: &Config,
) -> anyhow::Result<()> {
    let quality = quality.unwrap_or(config.schema.compress.quality);
    let data = read_input(input)?;
    let compressed = compress_image(&data, quality).map_err(image_error)?;

    let path = output.unwrap_or_else(|| PathBuf::from(compressed.image.file_name("compressed-image")));
    write_output(&path, &compressed.image)?;

    let stats = compressed.stats();
    if json {
        println!("{}", serde_json::to_string_pretty(&serde_json::json!({
            "output": path.to_string_lossy(),
            "quality": quality,
            "stats": stats,
        }))?);
    } else {
        Status::success(&format!("Saved {}", path.display()));
        Status::field("Original", format_size(stats.original_size as u64));
        Status::field("Compressed", format_size(stats.compressed_size as u64));
        Status::field(
            "Change",
            format_change(stats.original_size as u64, stats.compressed_size as u64),
        );
        if stats.compressed_size > stats.original_size {
            Status::warning("Output is larger than the input; try a lower quality");
        }
    }
    Ok(())
}

pub fn grayscale(input: &Path, output: Option<PathBuf>, config: &Config) -> anyhow::Result<()> {
    let format = output_format(output.as_deref());
    let data = read_input(input)?;
    let encoded = grayscale_image(&data, format, config.schema.grayscale.quality)
        .map_err(image_error)?;

    let path = output.unwrap_or_else(|| PathBuf::from(encoded.file_name("black-white-image")));
    write_output(&path, &encoded)?;
    Status::success(&format!("Saved {}", path.display()));
    Ok(())
}

pub fn detect(input: &Path) -> anyhow::Result<()> {
    let data = read_input(input)?;
    let format = detect_format(&data).map_err(image_error)?;
    Status::header(&input.display().to_string());
    Status::field("Format", format);
    Status::field("MIME", format.mime_type());
    Status::field("Extensions", format.extensions().join(", "));
    Ok(())
}

pub fn info(input: &Path, json: bool) -> anyhow::Result<()> {
    let data = read_input(input)?;
    let meta = extract_metadata(&data).map_err(image_error)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&meta)?);
    } else {
        Status::header(&input.display().to_string());
        Status::field("Format", meta.format);
        Status::field("Dimensions", format_dimensions(meta.width, meta.height));
        Status::field("Aspect Ratio", format!("{:.2}", meta.aspect_ratio()));
        Status::field("Orientation", format!("{:?}", meta.orientation()));
        Status::field("Size", format_size(meta.size_bytes as u64));
    }
    Ok(())
}

/// Output format implied by the output file's extension; JPEG otherwise.
fn output_format(output: Option<&Path>) -> ImageFormat {
    output
        .and_then(|p| p.extension())
        .and_then(|ext| ext.to_str())
        .and_then(ImageFormat::from_extension)
        .unwrap_or(ImageFormat::Jpeg)
}

fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    if !path.exists() {
        return Err(Error::file_not_found(path).into());
    }
    std::fs::read(path)
        .map_err(Error::from)
        .with_context(|| format!("Reading {}", path.display()))
}

fn write_output(path: &Path, encoded: &EncodedImage) -> anyhow::Result<()> {
    std::fs::write(path, &encoded.bytes)
        .map_err(Error::from)
        .with_context(|| format!("Writing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_from_extension() {
        assert_eq!(output_format(Some(Path::new("out.PNG"))), ImageFormat::Png);
        assert_eq!(output_format(Some(Path::new("out"))), ImageFormat::Jpeg);
        assert_eq!(output_format(None), ImageFormat::Jpeg);
    }

    #[test]
    fn test_image_error_codes() {
        assert_eq!(image_error(ImageError::UnknownFormat).code, ErrorCode::UnsupportedFormat);
        let surface = ImageError::SurfaceUnavailable { width: 1, height: 1, reason: "budget".into() };
        assert_eq!(image_error(surface).code, ErrorCode::SurfaceUnavailable);
        assert_eq!(
            image_error(ImageError::InvalidParameter("q".into())).code,
            ErrorCode::InvalidInput
        );
    }

    #[test]
    fn test_viewport_keeps_layout_kind() {
        let fit = Surface::Fit(FitBox::shrink_only(100.0, 100.0));
        match fit.resized(50.0, 40.0) {
            Surface::Fit(b) => assert!(!b.upscale && b.width == 50.0),
            _ => panic!("fit surface changed kind"),
        }
        assert!(matches!(Surface::Natural.resized(10.0, 10.0), Surface::Fixed(_)));
    }
}
