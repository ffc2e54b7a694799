//! How a decoded image ends up sized on screen.

use crate::geometry::{DisplayGeometry, NaturalGeometry};

/// Something that lays out an image and reports its rendered size.
///
/// A viewport resize is modelled as asking a new (or changed) surface for
/// the size again.
pub trait LayoutSurface {
    /// Rendered size of an image with the given natural dimensions.
    fn display_size(&self, natural: NaturalGeometry) -> DisplayGeometry;
}

/// Scale the image to fit entirely inside a box, preserving aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitBox {
    /// Box width
    pub width: f64,
    /// Box height
    pub height: f64,
    /// Allow growing images smaller than the box
    pub upscale: bool,
}

impl FitBox {
    /// A box that may scale images both up and down.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            upscale: true,
        }
    }

    /// A box that only ever shrinks images.
    pub fn shrink_only(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            upscale: false,
        }
    }
}

impl LayoutSurface for FitBox {
    fn display_size(&self, natural: NaturalGeometry) -> DisplayGeometry {
        if natural.width == 0 || natural.height == 0 {
            return DisplayGeometry::new(0.0, 0.0);
        }
        let nw = f64::from(natural.width);
        let nh = f64::from(natural.height);
        let mut scale = (self.width / nw).min(self.height / nh);
        if !self.upscale {
            scale = scale.min(1.0);
        }
        DisplayGeometry::new(nw * scale, nh * scale)
    }
}

/// A layout that always renders at one fixed size, whatever the image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedSize(pub DisplayGeometry);

impl LayoutSurface for FixedSize {
    fn display_size(&self, _natural: NaturalGeometry) -> DisplayGeometry {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_box_landscape() {
        let display = FitBox::new(500.0, 500.0).display_size(NaturalGeometry::new(2000, 1000));
        assert_eq!(display, DisplayGeometry::new(500.0, 250.0));
    }

    #[test]
    fn test_fit_box_shrink_only() {
        let natural = NaturalGeometry::new(200, 100);
        assert_eq!(
            FitBox::shrink_only(800.0, 800.0).display_size(natural),
            DisplayGeometry::new(200.0, 100.0)
        );
        assert_eq!(
            FitBox::new(800.0, 800.0).display_size(natural),
            DisplayGeometry::new(800.0, 400.0)
        );
    }

    #[test]
    fn test_fixed_size_ignores_image() {
        let layout = FixedSize(DisplayGeometry::new(320.0, 240.0));
        assert_eq!(
            layout.display_size(NaturalGeometry::new(4000, 3000)),
            DisplayGeometry::new(320.0, 240.0)
        );
    }
}
