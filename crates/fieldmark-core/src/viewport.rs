//! Viewport module for the fixed fit-to-surface transform.

use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};

/// Default maximum surface width in canonical units.
pub const DEFAULT_MAX_SURFACE_WIDTH: f64 = 900.0;

/// Viewport holds the one mapping between the source image and the drawing surface.
///
/// The scale is computed once when an image is loaded and is never recomputed
/// afterwards. Annotations live in the surface ("canonical") space it defines,
/// so there is no second transform that could drift relative to the image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Ratio applied to the image's natural dimensions (never above 1).
    pub scale: f64,
    /// Surface width in pixels (= canonical units).
    pub surface_width: u32,
    /// Surface height in pixels (= canonical units).
    pub surface_height: u32,
}

impl Viewport {
    /// Fit an image of the given natural size into `max_surface_width`.
    ///
    /// Returns `None` for zero-sized images or a non-positive maximum width.
    pub fn fit(natural_width: u32, natural_height: u32, max_surface_width: f64) -> Option<Self> {
        if natural_width == 0 || natural_height == 0 {
            return None;
        }
        if !max_surface_width.is_finite() || max_surface_width <= 0.0 {
            return None;
        }

        let scale = (max_surface_width / natural_width as f64).min(1.0);
        Some(Self {
            scale,
            surface_width: scaled_dimension(natural_width, scale),
            surface_height: scaled_dimension(natural_height, scale),
        })
    }

    /// Surface size in canonical units.
    pub fn surface_size(&self) -> Size {
        Size::new(self.surface_width as f64, self.surface_height as f64)
    }

    /// Convert an element-relative device coordinate to canonical space.
    ///
    /// `displayed` is the size the surface is shown at (e.g. its CSS box),
    /// which may differ from its pixel buffer in responsive layouts. The
    /// fit scale is not involved: it is already baked into the surface size.
    pub fn to_canonical(&self, device: Point, displayed: Size) -> Point {
        let (sx, sy) = self.device_ratio(displayed);
        Point::new(device.x * sx, device.y * sy)
    }

    /// Convert a canonical coordinate back to element-relative device space.
    pub fn to_device(&self, canonical: Point, displayed: Size) -> Point {
        let (sx, sy) = self.device_ratio(displayed);
        Point::new(canonical.x / sx, canonical.y / sy)
    }

    /// Check whether a canonical point lies on the surface.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= 0.0
            && point.y >= 0.0
            && point.x < self.surface_width as f64
            && point.y < self.surface_height as f64
    }

    /// Ratio of surface pixels to displayed units on each axis.
    /// A degenerate displayed size maps one-to-one.
    fn device_ratio(&self, displayed: Size) -> (f64, f64) {
        let ratio = |surface: u32, shown: f64| {
            if shown.is_finite() && shown > 0.0 {
                surface as f64 / shown
            } else {
                1.0
            }
        };
        (
            ratio(self.surface_width, displayed.width),
            ratio(self.surface_height, displayed.height),
        )
    }
}

fn scaled_dimension(natural: u32, scale: f64) -> u32 {
    ((natural as f64 * scale).round() as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_large_image() {
        let viewport = Viewport::fit(1600, 1200, 900.0).unwrap();
        assert!((viewport.scale - 0.5625).abs() < f64::EPSILON);
        assert_eq!(viewport.surface_width, 900);
        assert_eq!(viewport.surface_height, 675);
    }

    #[test]
    fn test_fit_never_upscales() {
        let viewport = Viewport::fit(400, 300, 900.0).unwrap();
        assert!((viewport.scale - 1.0).abs() < f64::EPSILON);
        assert_eq!(viewport.surface_width, 400);
        assert_eq!(viewport.surface_height, 300);
    }

    #[test]
    fn test_fit_rejects_zero_dimensions() {
        assert!(Viewport::fit(0, 100, 900.0).is_none());
        assert!(Viewport::fit(100, 0, 900.0).is_none());
        assert!(Viewport::fit(100, 100, 0.0).is_none());
        assert!(Viewport::fit(100, 100, f64::NAN).is_none());
    }

    #[test]
    fn test_thin_image_keeps_one_pixel() {
        let viewport = Viewport::fit(10000, 1, 900.0).unwrap();
        assert_eq!(viewport.surface_width, 900);
        assert_eq!(viewport.surface_height, 1);
    }

    #[test]
    fn test_to_canonical_identity_when_displayed_at_buffer_size() {
        let viewport = Viewport::fit(1600, 1200, 900.0).unwrap();
        let p = viewport.to_canonical(Point::new(123.0, 456.0), viewport.surface_size());
        assert!((p.x - 123.0).abs() < f64::EPSILON);
        assert!((p.y - 456.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_to_canonical_responsive_layout() {
        // Surface buffer is 900x675 but shown at half size.
        let viewport = Viewport::fit(1600, 1200, 900.0).unwrap();
        let p = viewport.to_canonical(Point::new(100.0, 50.0), Size::new(450.0, 337.5));
        assert!((p.x - 200.0).abs() < 1e-10);
        assert!((p.y - 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_to_canonical_degenerate_display() {
        let viewport = Viewport::fit(800, 600, 900.0).unwrap();
        let p = viewport.to_canonical(Point::new(10.0, 20.0), Size::ZERO);
        assert!((p.x - 10.0).abs() < f64::EPSILON);
        assert!((p.y - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let viewport = Viewport::fit(1600, 1200, 900.0).unwrap();
        let displayed = Size::new(640.0, 480.0);
        let original = Point::new(321.0, 123.0);
        let canonical = viewport.to_canonical(original, displayed);
        let back = viewport.to_device(canonical, displayed);
        assert!((back.x - original.x).abs() < 1e-10);
        assert!((back.y - original.y).abs() < 1e-10);
    }

    #[test]
    fn test_contains() {
        let viewport = Viewport::fit(200, 100, 900.0).unwrap();
        assert!(viewport.contains(Point::new(0.0, 0.0)));
        assert!(viewport.contains(Point::new(199.5, 99.5)));
        assert!(!viewport.contains(Point::new(200.0, 50.0)));
        assert!(!viewport.contains(Point::new(-1.0, 50.0)));
    }
}
