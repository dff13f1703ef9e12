//! Renderer trait abstraction.

use fieldmark_core::{Annotation, MarkupSession, SourceImage, Viewport};
use image::RgbaImage;
use peniko::Color;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("No image loaded")]
    NotInitialized,
    #[error("Surface error: {0}")]
    Surface(String),
}

/// Fixed drawing parameters that are not part of an annotation.
#[derive(Debug, Clone, Copy)]
pub struct RenderStyle {
    /// Radius of point marks.
    pub point_radius: f64,
    /// Width of the contrasting ring around point marks.
    pub point_outline_width: f64,
    pub point_outline_color: Color,
    /// Gap between label text and the edge of its plate.
    pub plate_padding: f64,
    /// Backing plate behind label text.
    pub plate_color: Color,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            point_radius: 6.0,
            point_outline_width: 2.0,
            point_outline_color: Color::from_rgba8(255, 255, 255, 255),
            plate_padding: 4.0,
            // Black at 60% opacity.
            plate_color: Color::from_rgba8(0, 0, 0, 153),
        }
    }
}

/// Inputs for a single render pass.
pub struct RenderContext<'a> {
    /// Source photo at natural resolution.
    pub image: &'a SourceImage,
    /// Fit transform; defines the surface size.
    pub viewport: Viewport,
    /// Committed annotations in insertion order.
    pub annotations: &'a [Annotation],
    /// Shape being dragged, drawn on top.
    pub candidate: Option<&'a Annotation>,
    pub style: RenderStyle,
}

impl<'a> RenderContext<'a> {
    /// Create a render context without a candidate.
    pub fn new(image: &'a SourceImage, viewport: Viewport, annotations: &'a [Annotation]) -> Self {
        Self {
            image,
            viewport,
            annotations,
            candidate: None,
            style: RenderStyle::default(),
        }
    }

    /// Snapshot a session, including its live candidate.
    ///
    /// Returns `None` until the session has an image.
    pub fn from_session(session: &'a MarkupSession) -> Option<Self> {
        let image = session.image()?;
        let viewport = *session.viewport()?;
        Some(Self::new(image, viewport, session.annotations().as_slice()).with_candidate(session.candidate()))
    }

    /// Set the in-progress shape.
    pub fn with_candidate(mut self, candidate: Option<&'a Annotation>) -> Self {
        self.candidate = candidate;
        self
    }

    /// Set the fixed drawing parameters.
    pub fn with_style(mut self, style: RenderStyle) -> Self {
        self.style = style;
        self
    }
}

/// Trait for rendering backends.
pub trait Renderer {
    /// Draw one frame and return the finished surface.
    ///
    /// The output depends only on the context: repeated calls with the
    /// same inputs produce identical pixels.
    fn render(&mut self, ctx: &RenderContext<'_>) -> Result<&RgbaImage, RendererError>;

    /// Render a session, or log and skip if it has no image yet.
    fn render_session(&mut self, session: &MarkupSession, style: RenderStyle) -> Result<&RgbaImage, RendererError> {
        let Some(ctx) = RenderContext::from_session(session) else {
            log::warn!("Skipping render: no image loaded");
            return Err(RendererError::NotInitialized);
        };
        self.render(&ctx.with_style(style))
    }
}
