//! Interactive crop session.
//!
//! Holds the loaded image, its on-screen geometry, the crop rectangle and
//! the pointer gesture in progress. Every mutation goes through one of the
//! transition methods so the whole state machine can be driven without a
//! rendering surface.

use crate::encode::{EncodedImage, OutputFormat};
use crate::export::{export_crop, DEFAULT_MAX_OUTPUT_PIXELS};
use crate::geometry::{CropRect, DisplayGeometry, Handle, NaturalGeometry, Point, INITIAL_FRACTION, MIN_SIZE};
use crate::layout::LayoutSurface;
use crate::{ImageError, Result};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Tunables for a crop session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Minimum crop edge in display units
    pub min_size: f64,
    /// Share of the shorter display edge used for the initial square
    pub initial_fraction: f64,
    /// Largest output surface, in pixels, a commit may allocate
    pub max_output_pixels: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            min_size: MIN_SIZE,
            initial_fraction: INITIAL_FRACTION,
            max_output_pixels: DEFAULT_MAX_OUTPUT_PIXELS,
        }
    }
}

/// Pointer gesture in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    /// No active gesture
    Idle,
    /// Translating the whole rectangle
    Moving {
        /// Pointer position of the previous event
        anchor: Point,
    },
    /// Dragging a corner handle
    Resizing {
        /// Corner being dragged
        handle: Handle,
        /// Pointer position of the previous event
        anchor: Point,
    },
}

impl DragState {
    /// Whether a gesture is in progress.
    pub fn is_active(&self) -> bool {
        !matches!(self, DragState::Idle)
    }
}

/// Geometry produced when an image is placed on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Rendered size
    pub display: DisplayGeometry,
    /// Decoded size
    pub natural: NaturalGeometry,
    /// Initial crop rectangle
    pub rect: CropRect,
}

#[derive(Debug)]
struct LoadedImage {
    pixels: DynamicImage,
    natural: NaturalGeometry,
    display: DisplayGeometry,
}

/// Crop state for one image.
#[derive(Debug)]
pub struct CropSession {
    config: SessionConfig,
    image: Option<LoadedImage>,
    rect: CropRect,
    drag: DragState,
}

impl Default for CropSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl CropSession {
    /// Create an empty session.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            image: None,
            rect: CropRect::default(),
            drag: DragState::Idle,
        }
    }

    /// Session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Whether an image has been loaded and laid out.
    pub fn is_ready(&self) -> bool {
        self.image.is_some()
    }

    /// Current crop rectangle, in display units.
    pub fn rect(&self) -> CropRect {
        self.rect
    }

    /// Current gesture.
    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    /// Rendered size of the loaded image.
    pub fn display(&self) -> Option<DisplayGeometry> {
        self.image.as_ref().map(|img| img.display)
    }

    /// Decoded size of the loaded image.
    pub fn natural(&self) -> Option<NaturalGeometry> {
        self.image.as_ref().map(|img| img.natural)
    }

    /// The loaded source pixels.
    pub fn source(&self) -> Option<&DynamicImage> {
        self.image.as_ref().map(|img| &img.pixels)
    }

    /// Take ownership of a freshly decoded image and place the initial crop.
    ///
    /// Any previous image, rectangle and gesture are discarded first, so a
    /// failed layout leaves the session empty rather than half-updated.
    pub fn on_image_loaded(&mut self, pixels: DynamicImage, layout: &impl LayoutSurface) -> Result<Placement> {
        self.image = None;
        self.drag = DragState::Idle;
        self.rect = CropRect::default();

        let natural = NaturalGeometry::new(pixels.width(), pixels.height());
        let display = layout.display_size(natural);
        if !display.is_usable() {
            return Err(ImageError::InvalidData(format!(
                "image {}x{} laid out at unusable size {}x{}",
                natural.width, natural.height, display.width, display.height
            )));
        }

        self.image = Some(LoadedImage {
            pixels,
            natural,
            display,
        });
        self.rect = self.initial_rect(display);

        let (display_width, display_height) = (display.width, display.height);
        debug!(
            natural_width = natural.width,
            natural_height = natural.height,
            display_width,
            display_height,
            "Image placed"
        );

        Ok(Placement {
            display,
            natural,
            rect: self.rect,
        })
    }

    /// Re-derive the display size after the viewport changed and re-center.
    ///
    /// Returns `None` when no image is loaded or the new layout is unusable,
    /// in which case the previous geometry is kept.
    pub fn on_viewport_resized(&mut self, layout: &impl LayoutSurface) -> Option<Placement> {
        let Some(image) = self.image.as_mut() else {
            debug!("Viewport resize ignored, no image loaded");
            return None;
        };

        let display = layout.display_size(image.natural);
        if !display.is_usable() {
            let (width, height) = (display.width, display.height);
            debug!(width, height, "Viewport resize ignored, unusable size");
            return None;
        }

        image.display = display;
        let natural = image.natural;
        self.drag = DragState::Idle;
        self.rect = self.initial_rect(display);

        let (display_width, display_height) = (display.width, display.height);
        debug!(display_width, display_height, "Crop re-centered");

        Some(Placement {
            display,
            natural,
            rect: self.rect,
        })
    }

    /// Start a gesture: moving when `handle` is `None`, resizing otherwise.
    ///
    /// Ignored while another gesture is active or before an image is loaded.
    pub fn begin_drag(&mut self, pointer: Point, handle: Option<Handle>) -> DragState {
        if !self.is_ready() {
            debug!("Drag ignored, no image loaded");
            return self.drag;
        }
        if self.drag.is_active() {
            debug!(state = ?self.drag, "Drag ignored, gesture already active");
            return self.drag;
        }

        self.drag = match handle {
            None => DragState::Moving { anchor: pointer },
            Some(handle) => DragState::Resizing { handle, anchor: pointer },
        };
        self.drag
    }

    /// Apply the pointer movement since the previous event.
    pub fn continue_drag(&mut self, pointer: Point) -> CropRect {
        let Some(display) = self.display() else {
            return self.rect;
        };

        self.drag = match self.drag {
            DragState::Idle => return self.rect,
            DragState::Moving { anchor } => {
                let (dx, dy) = pointer.delta_from(anchor);
                self.rect = self.rect.translated(dx, dy, display);
                DragState::Moving { anchor: pointer }
            }
            DragState::Resizing { handle, anchor } => {
                let (dx, dy) = pointer.delta_from(anchor);
                self.rect = self.rect.resized(handle, dx, dy, display, self.config.min_size);
                DragState::Resizing { handle, anchor: pointer }
            }
        };

        self.rect = self.rect.normalized(display, self.config.min_size);
        self.rect
    }

    /// Finish the gesture. Used for both pointer-up and pointer-leave.
    pub fn end_drag(&mut self) -> DragState {
        self.drag = DragState::Idle;
        self.drag
    }

    /// Export the current selection at the source's native resolution.
    ///
    /// Returns `Ok(None)` when nothing is loaded yet. Session state is never
    /// modified, so a failed commit can simply be retried.
    pub fn commit(&self, format: OutputFormat) -> Result<Option<EncodedImage>> {
        let Some(image) = self.image.as_ref() else {
            debug!("Commit ignored, no image loaded");
            return Ok(None);
        };

        info!(
            x = self.rect.x,
            y = self.rect.y,
            width = self.rect.width,
            height = self.rect.height,
            format = ?format,
            "Committing crop"
        );

        export_crop(&image.pixels, self.rect, image.display, format, self.config.max_output_pixels).map(Some)
    }

    fn initial_rect(&self, display: DisplayGeometry) -> CropRect {
        CropRect::centered_square(display, self.config.initial_fraction, self.config.min_size)
            .normalized(display, self.config.min_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::FixedSize;
    use image::RgbImage;

    fn session_with(display: (f64, f64), natural: (u32, u32)) -> CropSession {
        let mut session = CropSession::default();
        let layout = FixedSize(DisplayGeometry::new(display.0, display.1));
        session
            .on_image_loaded(DynamicImage::ImageRgb8(RgbImage::new(natural.0, natural.1)), &layout)
            .unwrap();
        session
    }

    #[test]
    fn test_load_places_centered_square() {
        let mut session = CropSession::default();
        let placement = session
            .on_image_loaded(
                DynamicImage::ImageRgb8(RgbImage::new(1000, 500)),
                &FixedSize(DisplayGeometry::new(500.0, 250.0)),
            )
            .unwrap();

        assert_eq!(placement.natural, NaturalGeometry::new(1000, 500));
        assert_eq!(placement.rect, CropRect::new(175.0, 50.0, 150.0, 150.0));
        assert_eq!(session.drag_state(), DragState::Idle);
    }

    #[test]
    fn test_unusable_layout_leaves_session_empty() {
        let mut session = session_with((500.0, 500.0), (100, 100));
        let err = session.on_image_loaded(
            DynamicImage::ImageRgb8(RgbImage::new(10, 10)),
            &FixedSize(DisplayGeometry::new(0.0, 0.0)),
        );
        assert!(err.is_err());
        assert!(!session.is_ready());
    }

    #[test]
    fn test_not_ready_is_silent() {
        let mut session = CropSession::default();
        assert_eq!(session.begin_drag(Point::new(1.0, 1.0), None), DragState::Idle);
        assert_eq!(session.continue_drag(Point::new(5.0, 5.0)), CropRect::default());
        assert!(session.commit(OutputFormat::Lossless).unwrap().is_none());
    }

    #[test]
    fn test_moving_accumulates_from_previous_event() {
        let mut session = session_with((500.0, 500.0), (500, 500));
        let start = session.rect();

        session.begin_drag(Point::new(200.0, 200.0), None);
        session.continue_drag(Point::new(210.0, 200.0));
        let rect = session.continue_drag(Point::new(215.0, 205.0));

        assert_eq!(rect.x, start.x + 15.0);
        assert_eq!(rect.y, start.y + 5.0);
        assert_eq!(rect.width, start.width);
    }

    #[test]
    fn test_second_begin_is_ignored() {
        let mut session = session_with((500.0, 500.0), (500, 500));
        session.begin_drag(Point::new(0.0, 0.0), Some(Handle::Se));
        let state = session.begin_drag(Point::new(9.0, 9.0), None);
        assert_eq!(
            state,
            DragState::Resizing {
                handle: Handle::Se,
                anchor: Point::new(0.0, 0.0)
            }
        );
    }

    #[test]
    fn test_idle_move_is_noop() {
        let mut session = session_with((500.0, 500.0), (500, 500));
        let before = session.rect();
        assert_eq!(session.continue_drag(Point::new(50.0, 50.0)), before);
    }

    #[test]
    fn test_viewport_resize_recenters() {
        let mut session = session_with((500.0, 500.0), (1000, 1000));
        session.begin_drag(Point::new(0.0, 0.0), None);
        session.continue_drag(Point::new(-100.0, -100.0));

        let placement = session
            .on_viewport_resized(&FixedSize(DisplayGeometry::new(200.0, 100.0)))
            .unwrap();
        assert_eq!(placement.rect, CropRect::new(70.0, 20.0, 60.0, 60.0));
        assert_eq!(session.display(), Some(DisplayGeometry::new(200.0, 100.0)));
        assert!(!session.drag_state().is_active());
    }

    #[test]
    fn test_viewport_resize_to_unusable_size_keeps_geometry() {
        let mut session = session_with((300.0, 200.0), (600, 400));
        let rect = session.rect();

        assert!(session
            .on_viewport_resized(&FixedSize(DisplayGeometry::new(0.0, 200.0)))
            .is_none());
        assert_eq!(session.display(), Some(DisplayGeometry::new(300.0, 200.0)));
        assert_eq!(session.rect(), rect);
    }

    #[test]
    fn test_viewport_resize_without_image() {
        let mut session = CropSession::default();
        assert!(session
            .on_viewport_resized(&FixedSize(DisplayGeometry::new(100.0, 100.0)))
            .is_none());
    }
}
