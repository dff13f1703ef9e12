//! CPU raster renderer.

use crate::paint::{self, rgba};
use crate::renderer::{RenderContext, RenderStyle, Renderer, RendererError};
use fieldmark_core::{Annotation, Arrow, Circle, PointMark, Rectangle, SerializableColor, TextLabel};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use kurbo::Point;
use std::sync::Arc;

/// Photo resized to the surface, keyed by the pixels it came from.
struct ScaledBase {
    source: Arc<RgbaImage>,
    pixels: RgbaImage,
}

/// Renders into an in-memory RGBA surface.
///
/// The scaled photo is cached between frames, so a drag only pays for
/// the copy and the annotation pass.
#[derive(Default)]
pub struct RasterRenderer {
    base: Option<ScaledBase>,
    surface: RgbaImage,
}

impl RasterRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last rendered surface.
    pub fn surface(&self) -> &RgbaImage {
        &self.surface
    }
}

/// Photo scaled to the surface, rebuilt only when the photo or size changes.
fn scaled_base<'c>(cache: &'c mut Option<ScaledBase>, ctx: &RenderContext<'_>) -> &'c RgbaImage {
    let (width, height) = (ctx.viewport.surface_width, ctx.viewport.surface_height);
    let source = ctx.image.shared_pixels();
    let stale = cache.as_ref().is_some_and(|base| {
        !Arc::ptr_eq(&base.source, source) || base.pixels.dimensions() != (width, height)
    });
    if stale {
        *cache = None;
    }
    let base = cache.get_or_insert_with(|| {
        log::debug!("Scaling {}x{} photo to {}x{}", source.width(), source.height(), width, height);
        let pixels = if source.dimensions() == (width, height) {
            source.as_ref().clone()
        } else {
            imageops::resize(source.as_ref(), width, height, FilterType::Triangle)
        };
        ScaledBase {
            source: Arc::clone(source),
            pixels,
        }
    });
    &base.pixels
}

impl Renderer for RasterRenderer {
    fn render(&mut self, ctx: &RenderContext<'_>) -> Result<&RgbaImage, RendererError> {
        let (width, height) = (ctx.viewport.surface_width, ctx.viewport.surface_height);
        if width == 0 || height == 0 {
            return Err(RendererError::Surface(format!("empty surface {}x{}", width, height)));
        }

        // Full clear: the surface is rebuilt from the photo every frame.
        let base = scaled_base(&mut self.base, ctx);
        self.surface.clone_from(base);

        for annotation in ctx.annotations {
            draw_annotation(&mut self.surface, annotation, &ctx.style);
        }
        if let Some(candidate) = ctx.candidate {
            draw_annotation(&mut self.surface, candidate, &ctx.style);
        }
        Ok(&self.surface)
    }
}

fn draw_annotation(img: &mut RgbaImage, annotation: &Annotation, style: &RenderStyle) {
    match annotation {
        Annotation::Point(point) => draw_point(img, point, style),
        Annotation::Rectangle(rect) => draw_rectangle(img, rect),
        Annotation::Circle(circle) => draw_circle(img, circle),
        Annotation::Arrow(arrow) => draw_arrow(img, arrow),
        Annotation::TextLabel(label) => draw_label(img, label, style),
    }
}

fn draw_point(img: &mut RgbaImage, point: &PointMark, style: &RenderStyle) {
    let center = point.position();
    paint::fill_disc(
        img,
        center,
        style.point_radius + style.point_outline_width,
        rgba(style.point_outline_color),
    );
    paint::fill_disc(img, center, style.point_radius, color_of(point.color));
}

fn draw_rectangle(img: &mut RgbaImage, rect: &Rectangle) {
    paint::stroke_rect(img, rect.as_rect(), rect.stroke_width, color_of(rect.color));
}

fn draw_circle(img: &mut RgbaImage, circle: &Circle) {
    paint::stroke_ring(img, circle.center(), circle.r, circle.stroke_width, color_of(circle.color));
}

fn draw_arrow(img: &mut RgbaImage, arrow: &Arrow) {
    let end = arrow.end();
    let [left, right] = arrow.head_points();
    paint::stroke_segments(
        img,
        &[(arrow.start(), end), (end, left), (end, right)],
        arrow.stroke_width,
        color_of(arrow.color),
    );
}

fn draw_label(img: &mut RgbaImage, label: &TextLabel, style: &RenderStyle) {
    let bounds = label.bounds();
    let pad = style.plate_padding;
    paint::fill_rect(img, bounds.inflate(pad, pad), rgba(style.plate_color));

    paint::draw_text(
        img,
        Point::new(bounds.x0, bounds.y0),
        &label.text,
        label.font.glyph_scale(),
        color_of(label.color),
    );
}

fn color_of(color: SerializableColor) -> Rgba<u8> {
    Rgba([color.r, color.g, color.b, color.a])
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldmark_core::{AnnotationStyle, MarkupSession, SourceImage};
    use kurbo::Size;

    const GRAY: Rgba<u8> = Rgba([128, 128, 128, 255]);

    fn session(width: u32, height: u32) -> MarkupSession {
        let mut session = MarkupSession::default();
        session.initialize(SourceImage::from_rgba(RgbaImage::from_pixel(width, height, GRAY)));
        session
    }

    fn render(session: &MarkupSession) -> RgbaImage {
        let mut renderer = RasterRenderer::new();
        renderer
            .render_session(session, RenderStyle::default())
            .unwrap()
            .clone()
    }

    fn centroid_of(img: &RgbaImage, color: Rgba<u8>) -> Option<Point> {
        let (mut sx, mut sy, mut n) = (0.0, 0.0, 0.0);
        for (x, y, p) in img.enumerate_pixels() {
            if *p == color {
                sx += x as f64 + 0.5;
                sy += y as f64 + 0.5;
                n += 1.0;
            }
        }
        (n > 0.0).then(|| Point::new(sx / n, sy / n))
    }

    #[test]
    fn test_surface_matches_viewport() {
        let img = render(&session(1600, 1200));
        assert_eq!(img.dimensions(), (900, 675));
    }

    #[test]
    fn test_render_is_idempotent() {
        let mut session = session(640, 480);
        session.pointer_down(Point::new(40.0, 40.0));
        session.set_tool("circle");
        session.pointer_down(Point::new(200.0, 200.0));
        session.pointer_up(Point::new(240.0, 230.0));

        let mut renderer = RasterRenderer::new();
        let first = renderer.render_session(&session, RenderStyle::default()).unwrap().clone();
        let second = renderer.render_session(&session, RenderStyle::default()).unwrap().clone();
        assert_eq!(first, second);
        assert_eq!(first, render(&session));
    }

    #[test]
    fn test_point_round_trip_centroid() {
        let mut session = session(1600, 1200);
        // Displayed at 600 CSS pixels wide.
        let displayed = Size::new(600.0, 450.0);
        let device = Point::new(231.0, 117.0);
        let canonical = session.to_canonical(device, displayed).unwrap();
        session.pointer_down(canonical);

        let img = render(&session);
        let red = color_of(SerializableColor::markup_red());
        let centroid = centroid_of(&img, red).unwrap();
        assert!((centroid - canonical).hypot() <= 1.0, "{:?} vs {:?}", centroid, canonical);

        // The white ring surrounds the fill.
        let white = Rgba([255, 255, 255, 255]);
        let ring = centroid_of(&img, white).unwrap();
        assert!((ring - canonical).hypot() <= 1.0);
    }

    #[test]
    fn test_candidate_drawn_as_preview() {
        let mut session = session(400, 300);
        session.set_tool("rect");
        session.pointer_down(Point::new(50.0, 50.0));
        session.pointer_move(Point::new(150.0, 120.0));

        let img = render(&session);
        let red = color_of(SerializableColor::markup_red());
        assert_eq!(*img.get_pixel(50, 80), red);
        assert_eq!(*img.get_pixel(100, 80), GRAY);
        assert!(session.annotations().is_empty());
    }

    #[test]
    fn test_arrow_has_head() {
        let mut session = session(400, 300);
        session.set_tool("arrow");
        session.pointer_down(Point::new(50.0, 150.0));
        session.pointer_up(Point::new(250.0, 150.0));

        let img = render(&session);
        let red = color_of(SerializableColor::markup_red());
        // Head wings reach 7.5 units above and below the shaft near the tip.
        assert_eq!(*img.get_pixel(237, 143), red);
        assert_eq!(*img.get_pixel(237, 156), red);
        assert_eq!(*img.get_pixel(100, 143), GRAY);
    }

    #[test]
    fn test_label_has_plate() {
        let mut session = session(400, 300).with_text_prompt(|_at: Point| -> Option<String> {
            Some("I".to_string())
        });
        session.set_tool("text");
        session.pointer_down(Point::new(100.0, 100.0));

        let img = render(&session);
        let plate = paint::blend_pixel(GRAY, rgba(RenderStyle::default().plate_color));
        // Padding corner is plate only.
        assert_eq!(*img.get_pixel(97, 81), plate);
        assert_eq!(*img.get_pixel(100, 120), GRAY);
        let red = color_of(SerializableColor::markup_red());
        assert!(img.pixels().any(|p| *p == red));
    }

    #[test]
    fn test_insertion_order() {
        let mut session = session(200, 200);
        let style = AnnotationStyle::default();
        let blue = SerializableColor::new(0, 0, 255, 255);
        session.restore_annotations(vec![
            Annotation::Point(PointMark::new(Point::new(100.0, 100.0), style.color)),
            Annotation::Point(PointMark::new(Point::new(100.0, 100.0), blue)),
        ]);
        let img = render(&session);
        assert_eq!(*img.get_pixel(100, 100), color_of(blue));
    }

    #[test]
    fn test_uninitialized_session_is_skipped() {
        let session = MarkupSession::default();
        let mut renderer = RasterRenderer::new();
        assert!(matches!(
            renderer.render_session(&session, RenderStyle::default()),
            Err(RendererError::NotInitialized)
        ));
    }
}
