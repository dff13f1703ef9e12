//! Text label annotation.

use super::{AnnotationStyle, SerializableColor};
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// Side length of one bitmap glyph cell at glyph scale 1.
pub const GLYPH_SIZE: u32 = 8;

/// Largest glyph multiplier.
pub const MAX_GLYPH_SCALE: u32 = 64;

/// Font selection for text labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelFont {
    /// Family name, kept for documents that re-render labels with real fonts.
    pub family: String,
    /// Font size in canonical units.
    pub size: f64,
}

impl Default for LabelFont {
    fn default() -> Self {
        Self {
            family: "sans-serif".to_string(),
            size: 16.0,
        }
    }
}

impl LabelFont {
    /// Whether the size can be rendered at all.
    pub fn is_usable(&self) -> bool {
        self.size.is_finite() && self.size > 0.0
    }

    /// Integer multiplier applied to the 8x8 glyph cells, in `1..=MAX_GLYPH_SCALE`.
    pub fn glyph_scale(&self) -> u32 {
        if !self.is_usable() {
            return 1;
        }
        let scale = (self.size / f64::from(GLYPH_SIZE)).round();
        scale.clamp(1.0, f64::from(MAX_GLYPH_SCALE)) as u32
    }
}

/// A text label anchored at the left end of its baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLabel {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub font: LabelFont,
    pub color: SerializableColor,
}

impl TextLabel {
    pub fn new(position: Point, text: String, style: &AnnotationStyle) -> Self {
        Self {
            x: position.x,
            y: position.y,
            text,
            font: style.font.clone(),
            color: style.color,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Rendered size of the text (without background padding).
    pub fn text_size(&self) -> Size {
        let cell = f64::from(GLYPH_SIZE) * f64::from(self.font.glyph_scale());
        Size::new(self.text.chars().count() as f64 * cell, cell)
    }

    /// Text box: extends rightwards from `x` and upwards from the baseline.
    pub fn bounds(&self) -> Rect {
        let size = self.text_size();
        Rect::new(self.x, self.y - size.height, self.x + size.width, self.y)
    }
}
