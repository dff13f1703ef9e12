//! Annotation definitions for photo markup.
//!
//! Every annotation is stored in canonical surface space, the single
//! coordinate system fixed by the [`Viewport`](crate::viewport::Viewport)
//! at image-load time.

mod arrow;
mod circle;
mod list;
mod point;
mod rectangle;
mod text;

pub use arrow::Arrow;
pub use circle::Circle;
pub use list::AnnotationList;
pub use point::PointMark;
pub use rectangle::Rectangle;
pub use text::{GLYPH_SIZE, LabelFont, MAX_GLYPH_SCALE, TextLabel};

use kurbo::{Point, Rect};
use peniko::Color;
use serde::{Deserialize, Serialize};

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    /// Default markup red.
    pub fn markup_red() -> Self {
        Self::new(255, 59, 48, 255)
    }

    /// Parse `#rrggbb` or `#rrggbbaa` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
        match digits.len() {
            6 => Some(Self::new(channel(0)?, channel(2)?, channel(4)?, 255)),
            8 => Some(Self::new(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    /// Format as `#rrggbbaa`.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Style stamped onto newly created annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationStyle {
    /// Color for strokes, point fills and label text.
    pub color: SerializableColor,
    /// Stroke width for rectangles, circles and arrows.
    pub stroke_width: f64,
    /// Font for text labels.
    pub font: LabelFont,
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        Self {
            color: SerializableColor::markup_red(),
            stroke_width: 3.0,
            font: LabelFont::default(),
        }
    }
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = kurbo::Vec2::new(b.x - a.x, b.y - a.y);
    let pv = kurbo::Vec2::new(point.x - a.x, point.y - a.y);
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * seg.x, a.y + t * seg.y);
    ((point.x - proj.x).powi(2) + (point.y - proj.y).powi(2)).sqrt()
}

fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

fn visible_stroke(width: f64) -> bool {
    width.is_finite() && width > 0.0
}

/// A single committed (or candidate) annotation.
///
/// The set of variants is closed; consumers match on it exhaustively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Annotation {
    Point(PointMark),
    Rectangle(Rectangle),
    Circle(Circle),
    Arrow(Arrow),
    #[serde(rename = "text")]
    TextLabel(TextLabel),
}

impl Annotation {
    /// Geometric bounds in canonical space (excluding stroke width).
    pub fn bounds(&self) -> Rect {
        match self {
            Annotation::Point(p) => p.bounds(),
            Annotation::Rectangle(r) => r.bounds(),
            Annotation::Circle(c) => c.bounds(),
            Annotation::Arrow(a) => a.bounds(),
            Annotation::TextLabel(t) => t.bounds(),
        }
    }

    pub fn color(&self) -> SerializableColor {
        match self {
            Annotation::Point(p) => p.color,
            Annotation::Rectangle(r) => r.color,
            Annotation::Circle(c) => c.color,
            Annotation::Arrow(a) => a.color,
            Annotation::TextLabel(t) => t.color,
        }
    }

    /// Whether the annotation is large enough to be worth keeping.
    ///
    /// Degenerate shapes are dropped instead of stored so that undo always
    /// removes something visible. Coordinates must be finite and stroked
    /// shapes need a positive stroke width.
    pub fn meets_minimum_size(&self) -> bool {
        match self {
            Annotation::Point(p) => all_finite(&[p.x, p.y]),
            Annotation::Rectangle(r) => {
                all_finite(&[r.x, r.y, r.w, r.h])
                    && visible_stroke(r.stroke_width)
                    && r.meets_minimum_size()
            }
            Annotation::Circle(c) => {
                all_finite(&[c.x, c.y, c.r])
                    && visible_stroke(c.stroke_width)
                    && c.meets_minimum_size()
            }
            Annotation::Arrow(a) => {
                all_finite(&[a.x1, a.y1, a.x2, a.y2])
                    && visible_stroke(a.stroke_width)
                    && a.meets_minimum_size()
            }
            Annotation::TextLabel(t) => {
                all_finite(&[t.x, t.y]) && t.font.is_usable() && !t.text.trim().is_empty()
            }
        }
    }

    /// Short name of the variant (for logging).
    pub fn kind_name(&self) -> &'static str {
        match self {
            Annotation::Point(_) => "point",
            Annotation::Rectangle(_) => "rectangle",
            Annotation::Circle(_) => "circle",
            Annotation::Arrow(_) => "arrow",
            Annotation::TextLabel(_) => "text",
        }
    }
}
