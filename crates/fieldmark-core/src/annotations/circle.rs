//! Circle annotation.

use super::{AnnotationStyle, SerializableColor};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// An outlined circle centred on `(x, y)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub x: f64,
    pub y: f64,
    pub r: f64,
    pub color: SerializableColor,
    pub stroke_width: f64,
}

impl Circle {
    /// Smallest accepted radius in canonical units.
    pub const MIN_RADIUS: f64 = 3.0;

    pub fn new(center: Point, radius: f64, style: &AnnotationStyle) -> Self {
        Self {
            x: center.x,
            y: center.y,
            r: radius,
            color: style.color,
            stroke_width: style.stroke_width,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Set the radius to the Euclidean distance from the centre to `edge`.
    pub fn set_edge(&mut self, edge: Point) {
        self.r = self.center().distance(edge);
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x - self.r, self.y - self.r, self.x + self.r, self.y + self.r)
    }

    pub fn meets_minimum_size(&self) -> bool {
        self.r >= Self::MIN_RADIUS
    }
}
