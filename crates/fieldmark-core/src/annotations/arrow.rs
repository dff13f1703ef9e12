//! Arrow annotation.

use super::{AnnotationStyle, SerializableColor};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_6;

/// A straight arrow from `(x1, y1)` to `(x2, y2)`; the head sits at the end point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arrow {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub color: SerializableColor,
    pub stroke_width: f64,
}

impl Arrow {
    /// Shortest accepted shaft length in canonical units.
    pub const MIN_LENGTH: f64 = 5.0;
    /// Length of each arrowhead segment.
    pub const HEAD_LENGTH: f64 = 15.0;
    /// Angle between the shaft and each arrowhead segment.
    pub const HEAD_ANGLE: f64 = FRAC_PI_6;

    pub fn new(start: Point, end: Point, style: &AnnotationStyle) -> Self {
        Self {
            x1: start.x,
            y1: start.y,
            x2: end.x,
            y2: end.y,
            color: style.color,
            stroke_width: style.stroke_width,
        }
    }

    pub fn start(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    pub fn end(&self) -> Point {
        Point::new(self.x2, self.y2)
    }

    pub fn set_end(&mut self, end: Point) {
        self.x2 = end.x;
        self.y2 = end.y;
    }

    /// Get the length of the arrow shaft.
    pub fn length(&self) -> f64 {
        self.start().distance(self.end())
    }

    /// Angle of the shaft in radians.
    pub fn angle(&self) -> f64 {
        (self.y2 - self.y1).atan2(self.x2 - self.x1)
    }

    /// Outer ends of the two arrowhead segments (each joined to the end point).
    pub fn head_points(&self) -> [Point; 2] {
        let angle = self.angle();
        let wing = |offset: f64| {
            Point::new(
                self.x2 - Self::HEAD_LENGTH * (angle + offset).cos(),
                self.y2 - Self::HEAD_LENGTH * (angle + offset).sin(),
            )
        };
        [wing(-Self::HEAD_ANGLE), wing(Self::HEAD_ANGLE)]
    }

    /// Bounds of the shaft and arrowhead.
    pub fn bounds(&self) -> Rect {
        let [left, right] = self.head_points();
        Rect::from_points(self.start(), self.end())
            .union_pt(left)
            .union_pt(right)
    }

    pub fn meets_minimum_size(&self) -> bool {
        self.length() >= Self::MIN_LENGTH
    }
}
