//! Rectangle annotation.

use super::{AnnotationStyle, SerializableColor};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// An outlined rectangle.
///
/// Stored normalized: `(x, y)` is the top-left corner and the extent is
/// non-negative regardless of drag direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub color: SerializableColor,
    pub stroke_width: f64,
}

impl Rectangle {
    /// Smallest accepted side length in canonical units.
    pub const MIN_SIDE: f64 = 3.0;

    /// Create a rectangle from two corner points.
    pub fn from_corners(p1: Point, p2: Point, style: &AnnotationStyle) -> Self {
        let mut rect = Self {
            x: 0.0,
            y: 0.0,
            w: 0.0,
            h: 0.0,
            color: style.color,
            stroke_width: style.stroke_width,
        };
        rect.set_corners(p1, p2);
        rect
    }

    /// Re-span the rectangle between two corners (used while dragging).
    pub fn set_corners(&mut self, p1: Point, p2: Point) {
        self.x = p1.x.min(p2.x);
        self.y = p1.y.min(p2.y);
        self.w = (p2.x - p1.x).abs();
        self.h = (p2.y - p1.y).abs();
    }

    /// Get the rectangle as a kurbo Rect.
    pub fn as_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.w, self.y + self.h)
    }

    pub fn bounds(&self) -> Rect {
        self.as_rect()
    }

    pub fn meets_minimum_size(&self) -> bool {
        self.w.abs() >= Self::MIN_SIDE && self.h.abs() >= Self::MIN_SIDE
    }
}
