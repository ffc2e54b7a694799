//! imgkit: crop, resize, compress and convert images from the command line.

mod commands;

use clap::{Parser, Subcommand};
use imgkit_core::config::Config;
use imgkit_core::exit_codes;
use imgkit_image::{CropRect, OutputFormat};
use imgkit_telemetry::TelemetryConfig;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "imgkit")]
#[command(about = "Crop, resize, compress and convert images")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to ./imgkit.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crop a region at full source resolution
    Crop {
        /// Path to image file
        input: PathBuf,
        /// Render the image at exactly this size, e.g. 500x400
        #[arg(long, value_parser = parse_size, conflicts_with = "fit")]
        display: Option<(f64, f64)>,
        /// Fit the image inside this box, keeping its aspect ratio
        #[arg(long, value_parser = parse_size)]
        fit: Option<(f64, f64)>,
        /// Crop rectangle in display units: x,y,width,height
        #[arg(long, value_parser = parse_rect, conflicts_with = "events")]
        rect: Option<CropRect>,
        /// JSON file of recorded pointer events to replay
        #[arg(long)]
        events: Option<PathBuf>,
        /// lossless (PNG) or lossy (maximum-quality JPEG)
        #[arg(long)]
        format: Option<OutputFormat>,
        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Resize to exact dimensions
    Resize {
        /// Path to image file
        input: PathBuf,
        #[arg(long)]
        width: Option<u32>,
        #[arg(long)]
        height: Option<u32>,
        /// instagram, facebook, twitter or hd
        #[arg(long, conflicts_with_all = ["width", "height"])]
        preset: Option<String>,
        /// Derive the height from the width
        #[arg(long)]
        keep_aspect: bool,
        /// JPEG quality (1-100)
        #[arg(long)]
        quality: Option<u8>,
        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Re-encode as JPEG at a lower quality
    Compress {
        /// Path to image file
        input: PathBuf,
        /// JPEG quality (10-100)
        #[arg(long)]
        quality: Option<u8>,
        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Convert to black and white
    Grayscale {
        /// Path to image file
        input: PathBuf,
        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Detect image format from file
    Detect {
        /// Path to image file
        input: PathBuf,
    },
    /// Show dimensions, format and size
    Info {
        /// Path to image file
        input: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            imgkit_cli::output::Status::error(&e.to_string());
            return ExitCode::from(e.code.exit_code() as u8);
        }
    };

    let logging = &config.schema.logging;
    let mut telemetry = TelemetryConfig::from_level(logging.level.clone(), cli.verbose);
    telemetry.show_target = logging.show_target;
    if let Err(e) = imgkit_telemetry::init_with_config(telemetry) {
        eprintln!("{}", e);
    }

    match run(cli.command, &config) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(e) => {
            imgkit_cli::output::Status::error(&format!("{:#}", e));
            let code = e
                .downcast_ref::<imgkit_core::Error>()
                .map_or(exit_codes::FAILURE, |err| err.code.exit_code());
            ExitCode::from(code as u8)
        }
    }
}

fn run(command: Commands, config: &Config) -> anyhow::Result<()> {
    match command {
        Commands::Crop { input, display, fit, rect, events, format, output, json } => {
            commands::crop(
                commands::CropArgs { input, display, fit, rect, events, format, output, json },
                config,
            )
        }
        Commands::Resize { input, width, height, preset, keep_aspect, quality, output } => {
            commands::resize(
                commands::ResizeArgs { input, width, height, preset, keep_aspect, quality, output },
                config,
            )
        }
        Commands::Compress { input, quality, output, json } => {
            commands::compress(&input, quality, output, json, config)
        }
        Commands::Grayscale { input, output } => commands::grayscale(&input, output, config),
        Commands::Detect { input } => commands::detect(&input),
        Commands::Info { input, json } => commands::info(&input, json),
    }
}

/// Parse `WIDTHxHEIGHT`.
fn parse_size(s: &str) -> Result<(f64, f64), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
    let w: f64 = w.trim().parse().map_err(|e| format!("bad width '{}': {}", w, e))?;
    let h: f64 = h.trim().parse().map_err(|e| format!("bad height '{}': {}", h, e))?;
    if !(w > 0.0 && h > 0.0 && w.is_finite() && h.is_finite()) {
        return Err(format!("size must be positive, got '{}'", s));
    }
    Ok((w, h))
}

/// Parse `x,y,width,height`.
fn parse_rect(s: &str) -> Result<CropRect, String> {
    let parts: Vec<f64> = s
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("bad rectangle '{}': {}", s, e))?;
    match parts.as_slice() {
        [x, y, w, h] => Ok(CropRect::new(*x, *y, *w, *h)),
        _ => Err(format!("expected x,y,width,height, got '{}'", s)),
    }
}
