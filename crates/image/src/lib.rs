//! Image tools for imgkit.
//!
//! This crate provides:
//! - An interactive crop session with move/resize gestures and
//!   full-resolution export
//! - Resizing, JPEG compression and grayscale conversion
//! - Format detection from magic bytes
//! - Metadata extraction
//!
//! # Example
//!
//! ```
//! use image::{DynamicImage, RgbImage};
//! use imgkit_image::{CropSession, FitBox, Handle, OutputFormat, Point};
//!
//! let mut session = CropSession::default();
//! let placed = session
//!     .on_image_loaded(DynamicImage::ImageRgb8(RgbImage::new(2000, 1000)), &FitBox::new(500.0, 500.0))
//!     .unwrap();
//! assert_eq!(placed.display.width, 500.0);
//!
//! session.begin_drag(Point::new(0.0, 0.0), Some(Handle::Se));
//! session.continue_drag(Point::new(20.0, 10.0));
//! session.end_drag();
//!
//! let out = session.commit(OutputFormat::Lossless).unwrap().unwrap();
//! assert_eq!(out.mime_type(), "image/png");
//! ```

#![warn(missing_docs)]

mod detect;
mod error;
mod metadata;

pub mod compress;
pub mod encode;
pub mod events;
pub mod export;
pub mod geometry;
pub mod grayscale;
pub mod layout;
pub mod load;
pub mod resize;
pub mod session;

pub use detect::{detect_format, ImageFormat};
pub use encode::{encode_image, EncodedImage, OutputFormat};
pub use error::{ImageError, Result};
pub use events::{parse_events, replay, PointerEvent};
pub use export::export_crop;
pub use geometry::{CropRect, DisplayGeometry, Handle, NaturalGeometry, Point, MIN_SIZE};
pub use layout::{FitBox, FixedSize, LayoutSurface};
pub use load::{load_image, open_image};
pub use metadata::{extract_metadata, ImageMetadata, Orientation};
pub use resize::{resize_image, ResizeOptions};
pub use session::{CropSession, DragState, Placement, SessionConfig};
