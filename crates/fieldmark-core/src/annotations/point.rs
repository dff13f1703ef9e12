//! Point marker.

use super::SerializableColor;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A single marked location on the photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointMark {
    pub x: f64,
    pub y: f64,
    pub color: SerializableColor,
}

impl PointMark {
    pub fn new(position: Point, color: SerializableColor) -> Self {
        Self {
            x: position.x,
            y: position.y,
            color,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Zero-area bounds at the marked location; the renderer adds the marker radius.
    pub fn bounds(&self) -> Rect {
        Rect::from_points(self.position(), self.position())
    }
}
