//! Display-space and source-space geometry for the crop tool.
//!
//! The crop rectangle lives in *display* units (the size the image is laid
//! out at), while exports happen in *natural* units (decoded pixels).

use serde::{Deserialize, Serialize};

/// Smallest edge length a crop rectangle may shrink to, in display units.
pub const MIN_SIZE: f64 = 50.0;

/// Fraction of the shorter display edge covered by a freshly placed crop square.
pub const INITIAL_FRACTION: f64 = 0.6;

/// A pointer position in display coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position
    pub x: f64,
    /// Vertical position
    pub y: f64,
}

impl Point {
    /// Create a new point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Offset from `origin` to `self`.
    pub fn delta_from(self, origin: Point) -> (f64, f64) {
        (self.x - origin.x, self.y - origin.y)
    }
}

/// Rendered size of the loaded image, in layout pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayGeometry {
    /// Rendered width
    pub width: f64,
    /// Rendered height
    pub height: f64,
}

impl DisplayGeometry {
    /// Create a display geometry.
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Length of the shorter edge.
    pub fn shorter_edge(&self) -> f64 {
        self.width.min(self.height)
    }

    /// Whether both edges are positive and finite.
    pub fn is_usable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Decoded pixel dimensions of the source image. Never changes after decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NaturalGeometry {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl NaturalGeometry {
    /// Create a natural geometry.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Per-axis factors that map display units onto source pixels.
    ///
    /// Computed on demand; display geometry can change under a responsive
    /// layout while this stays fixed, so callers must not keep the result.
    pub fn scale_from(&self, display: DisplayGeometry) -> (f64, f64) {
        (
            f64::from(self.width) / display.width,
            f64::from(self.height) / display.height,
        )
    }
}

/// Crop selection in display units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CropRect {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl CropRect {
    /// Create a rectangle without any clamping.
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Centered square covering `fraction` of the shorter display edge.
    pub fn centered_square(display: DisplayGeometry, fraction: f64, min_size: f64) -> Self {
        let floor = min_size.min(display.shorter_edge());
        let size = (display.shorter_edge() * fraction).max(floor);
        Self {
            x: (display.width - size) / 2.0,
            y: (display.height - size) / 2.0,
            width: size,
            height: size,
        }
    }

    /// Whether the rectangle satisfies containment and minimum-size rules.
    pub fn is_within(&self, display: DisplayGeometry, min_size: f64) -> bool {
        const EPS: f64 = 1e-9;
        let min_w = min_size.min(display.width);
        let min_h = min_size.min(display.height);
        self.x >= -EPS
            && self.y >= -EPS
            && self.width >= min_w - EPS
            && self.height >= min_h - EPS
            && self.right() <= display.width + EPS
            && self.bottom() <= display.height + EPS
    }

    /// Translate by a delta, keeping the whole rectangle inside `display`.
    pub fn translated(&self, dx: f64, dy: f64, display: DisplayGeometry) -> Self {
        Self {
            x: clamp_span(self.x + dx, 0.0, display.width - self.width),
            y: clamp_span(self.y + dy, 0.0, display.height - self.height),
            ..*self
        }
    }

    /// Resize by dragging `handle` by a delta.
    ///
    /// The edge opposite the handle stays put. The dragged edge stops at the
    /// display border and at `min_size` from the fixed edge.
    pub fn resized(
        &self,
        handle: Handle,
        dx: f64,
        dy: f64,
        display: DisplayGeometry,
        min_size: f64,
    ) -> Self {
        let min_w = min_size.min(display.width);
        let min_h = min_size.min(display.height);

        let (x, width) = if handle.moves_left_edge() {
            let right = self.right();
            let x = clamp_span(self.x + dx, 0.0, right - min_w);
            (x, right - x)
        } else {
            let width = clamp_span(self.width + dx, min_w, display.width - self.x);
            (self.x, width)
        };

        let (y, height) = if handle.moves_top_edge() {
            let bottom = self.bottom();
            let y = clamp_span(self.y + dy, 0.0, bottom - min_h);
            (y, bottom - y)
        } else {
            let height = clamp_span(self.height + dy, min_h, display.height - self.y);
            (self.y, height)
        };

        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Pull a rectangle back inside `display`, shrinking rather than moving
    /// where it can, and restoring degenerate edges to the minimum size.
    pub fn normalized(&self, display: DisplayGeometry, min_size: f64) -> Self {
        let min_w = min_size.min(display.width);
        let min_h = min_size.min(display.height);

        let width = if self.width.is_finite() && self.width > 0.0 {
            clamp_span(self.width, min_w, display.width)
        } else {
            min_w
        };
        let height = if self.height.is_finite() && self.height > 0.0 {
            clamp_span(self.height, min_h, display.height)
        } else {
            min_h
        };

        let x = if self.x.is_finite() { self.x } else { 0.0 };
        let y = if self.y.is_finite() { self.y } else { 0.0 };

        Self {
            x: clamp_span(x, 0.0, display.width - width),
            y: clamp_span(y, 0.0, display.height - height),
            width,
            height,
        }
    }

    /// Map into source pixels using the current display→natural scale.
    pub fn to_source(&self, display: DisplayGeometry, natural: NaturalGeometry) -> SourceRect {
        let (scale_x, scale_y) = natural.scale_from(display);
        SourceRect {
            x: self.x * scale_x,
            y: self.y * scale_y,
            width: self.width * scale_x,
            height: self.height * scale_y,
        }
    }
}

/// Crop region in source-pixel units, before rounding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceRect {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl SourceRect {
    /// Output surface size: the region rounded to whole pixels.
    pub fn output_size(&self) -> (u64, u64) {
        (round_px(self.width), round_px(self.height))
    }

    /// Integer pixel window into the source, clipped to `natural`.
    pub fn pixel_window(&self, natural: NaturalGeometry) -> (u32, u32, u32, u32) {
        let x = round_px(self.x).min(u64::from(natural.width)) as u32;
        let y = round_px(self.y).min(u64::from(natural.height)) as u32;
        let w = round_px(self.width).min(u64::from(natural.width - x)) as u32;
        let h = round_px(self.height).min(u64::from(natural.height - y)) as u32;
        (x, y, w, h)
    }
}

/// Corner grip used to resize the crop rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handle {
    /// Top-left
    Nw,
    /// Top-right
    Ne,
    /// Bottom-left
    Sw,
    /// Bottom-right
    Se,
}

impl Handle {
    fn moves_left_edge(self) -> bool {
        matches!(self, Handle::Nw | Handle::Sw)
    }

    fn moves_top_edge(self) -> bool {
        matches!(self, Handle::Nw | Handle::Ne)
    }

    /// Short lowercase name (`nw`, `ne`, `sw`, `se`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Handle::Nw => "nw",
            Handle::Ne => "ne",
            Handle::Sw => "sw",
            Handle::Se => "se",
        }
    }
}

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Handle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nw" => Ok(Handle::Nw),
            "ne" => Ok(Handle::Ne),
            "sw" => Ok(Handle::Sw),
            "se" => Ok(Handle::Se),
            other => Err(format!("unknown handle '{}', expected nw, ne, sw or se", other)),
        }
    }
}

/// Clamp without panicking when `hi < lo`; the lower bound wins.
fn clamp_span(value: f64, lo: f64, hi: f64) -> f64 {
    value.min(hi).max(lo)
}

fn round_px(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}
