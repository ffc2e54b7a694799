//! Recorded pointer and viewport events, and replaying them onto a session.

use crate::geometry::{CropRect, Handle, Point};
use crate::layout::LayoutSurface;
use crate::session::CropSession;
use crate::{ImageError, Result};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// One input event as delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PointerEvent {
    /// Pointer pressed on the rectangle body, or on a handle
    Down {
        /// Pointer x
        x: f64,
        /// Pointer y
        y: f64,
        /// Handle under the pointer
        #[serde(default, skip_serializing_if = "Option::is_none")]
        handle: Option<Handle>,
    },
    /// Pointer moved
    Move {
        /// Pointer x
        x: f64,
        /// Pointer y
        y: f64,
    },
    /// Pointer released
    Up,
    /// Pointer left the tracking area
    Leave,
    /// Viewport changed to a new box size
    Viewport {
        /// New box width
        width: f64,
        /// New box height
        height: f64,
    },
}

/// Parse a JSON array of events.
pub fn parse_events(json: &str) -> Result<Vec<PointerEvent>> {
    serde_json::from_str(json).map_err(|e| ImageError::InvalidData(format!("event script: {}", e)))
}

impl CropSession {
    /// Apply one event and return the resulting rectangle.
    ///
    /// `layout_for` is only called for `viewport` events.
    pub fn apply<L, F>(&mut self, event: PointerEvent, layout_for: F) -> CropRect
    where
        L: LayoutSurface,
        F: FnOnce(f64, f64) -> L,
    {
        match event {
            PointerEvent::Down { x, y, handle } => {
                self.begin_drag(Point::new(x, y), handle);
            }
            PointerEvent::Move { x, y } => {
                self.continue_drag(Point::new(x, y));
            }
            PointerEvent::Up | PointerEvent::Leave => {
                self.end_drag();
            }
            PointerEvent::Viewport { width, height } => {
                self.on_viewport_resized(&layout_for(width, height));
            }
        }
        self.rect()
    }
}

/// Feed `events` to `session` in delivery order.
///
/// `layout_for` builds the surface a `viewport` event resizes to.
pub fn replay<L, F>(session: &mut CropSession, events: &[PointerEvent], mut layout_for: F) -> CropRect
where
    L: LayoutSurface,
    F: FnMut(f64, f64) -> L,
{
    for event in events {
        trace!(?event, "Replaying event");
        session.apply(*event, &mut layout_for);
    }
    session.rect()
}
