//! Markup configuration.

use crate::annotations::{AnnotationStyle, LabelFont, SerializableColor};
use crate::viewport::DEFAULT_MAX_SURFACE_WIDTH;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Encoded raster format for exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RasterFormat {
    #[default]
    Png,
    Jpeg,
}

impl RasterFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            RasterFormat::Png => "image/png",
            RasterFormat::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            RasterFormat::Png => "png",
            RasterFormat::Jpeg => "jpg",
        }
    }
}

/// Export encoding settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub format: RasterFormat,
    /// JPEG quality (1-100); ignored for PNG.
    pub quality: u8,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            format: RasterFormat::Png,
            quality: 85,
        }
    }
}

/// Settings for one markup session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkupConfig {
    /// Widest surface an image is fitted into, in canonical units.
    pub max_surface_width: f64,
    /// Initial annotation color.
    pub color: SerializableColor,
    /// Initial stroke width.
    pub stroke_width: f64,
    /// Initial label font.
    pub label_font: LabelFont,
    pub export: ExportSettings,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            max_surface_width: DEFAULT_MAX_SURFACE_WIDTH,
            color: SerializableColor::markup_red(),
            stroke_width: 3.0,
            label_font: LabelFont::default(),
            export: ExportSettings::default(),
        }
    }
}

impl MarkupConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
            .map_err(|e| ConfigError::Parse(format!("{}: {}", path.display(), e)))
    }

    /// Style for the first annotations of a session. Unusable stroke widths
    /// and font sizes fall back to the defaults.
    pub fn initial_style(&self) -> AnnotationStyle {
        let defaults = AnnotationStyle::default();
        let stroke_width = if self.stroke_width.is_finite() && self.stroke_width > 0.0 {
            self.stroke_width
        } else {
            log::warn!("Configured stroke width {} is unusable", self.stroke_width);
            defaults.stroke_width
        };
        let mut font = self.label_font.clone();
        if !font.is_usable() {
            log::warn!("Configured label font size {} is unusable", font.size);
            font.size = defaults.font.size;
        }
        AnnotationStyle {
            color: self.color,
            stroke_width,
            font,
        }
    }
}
