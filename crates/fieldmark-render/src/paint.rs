//! Pixel-level drawing primitives.
//!
//! Pixel `(x, y)` covers `[x, x+1) × [y, y+1)` in surface space and is
//! painted when its centre `(x + 0.5, y + 0.5)` falls inside the shape.
//! There is no anti-aliasing.

use fieldmark_core::annotations::point_to_segment_dist;
use font8x8::{BASIC_FONTS, UnicodeFonts};
use image::{Rgba, RgbaImage};
use kurbo::{Point, Rect};
use peniko::Color;

pub(crate) fn rgba(color: Color) -> Rgba<u8> {
    let c = color.to_rgba8();
    Rgba([c.r, c.g, c.b, c.a])
}

/// Source-over blend of `src` onto `dst`.
pub(crate) fn blend_pixel(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    match src[3] {
        0 => return dst,
        255 => return src,
        _ => {}
    }
    let a = f64::from(src[3]) / 255.0;
    let inv = 1.0 - a;
    let mix = |d: u8, s: u8| (f64::from(d) * inv + f64::from(s) * a).round().clamp(0.0, 255.0) as u8;
    let out_a = (f64::from(dst[3]) * inv + f64::from(src[3])).round().clamp(0.0, 255.0) as u8;
    Rgba([mix(dst[0], src[0]), mix(dst[1], src[1]), mix(dst[2], src[2]), out_a])
}

/// Paint every pixel within `bounds` whose centre satisfies `inside`.
///
/// Each pixel is blended at most once, so translucent shapes made of
/// overlapping parts do not darken where the parts meet.
pub(crate) fn fill_where(img: &mut RgbaImage, bounds: Rect, color: Rgba<u8>, inside: impl Fn(Point) -> bool) {
    if color[3] == 0 || !bounds.is_finite() {
        return;
    }
    let (width, height) = (img.width() as i64, img.height() as i64);
    let x0 = (bounds.x0.floor() as i64).max(0);
    let y0 = (bounds.y0.floor() as i64).max(0);
    let x1 = (bounds.x1.ceil() as i64).min(width);
    let y1 = (bounds.y1.ceil() as i64).min(height);

    for y in y0..y1 {
        for x in x0..x1 {
            let centre = Point::new(x as f64 + 0.5, y as f64 + 0.5);
            if inside(centre) {
                let (px, py) = (x as u32, y as u32);
                let dst = *img.get_pixel(px, py);
                img.put_pixel(px, py, blend_pixel(dst, color));
            }
        }
    }
}

pub(crate) fn fill_rect(img: &mut RgbaImage, rect: Rect, color: Rgba<u8>) {
    let rect = rect.abs();
    fill_where(img, rect, color, |p| rect.contains(p));
}

pub(crate) fn fill_disc(img: &mut RgbaImage, center: Point, radius: f64, color: Rgba<u8>) {
    let r2 = radius * radius;
    let bounds = Rect::from_center_size(center, (radius * 2.0, radius * 2.0));
    fill_where(img, bounds, color, |p| (p - center).hypot2() <= r2);
}

/// Outline of a rectangle, centred on its edges.
pub(crate) fn stroke_rect(img: &mut RgbaImage, rect: Rect, width: f64, color: Rgba<u8>) {
    let half = width / 2.0;
    let rect = rect.abs();
    let outer = rect.inflate(half, half);
    let inner = rect.inflate(-half, -half);
    fill_where(img, outer, color, |p| outer.contains(p) && !inner.contains(p));
}

/// Circle outline, centred on the radius.
pub(crate) fn stroke_ring(img: &mut RgbaImage, center: Point, radius: f64, width: f64, color: Rgba<u8>) {
    let half = width / 2.0;
    let extent = (radius + half) * 2.0;
    let bounds = Rect::from_center_size(center, (extent, extent));
    fill_where(img, bounds, color, |p| ((p - center).hypot() - radius).abs() <= half);
}

/// Union of round-capped segments.
pub(crate) fn stroke_segments(img: &mut RgbaImage, segments: &[(Point, Point)], width: f64, color: Rgba<u8>) {
    let Some(bounds) = segments
        .iter()
        .map(|&(a, b)| Rect::from_points(a, b))
        .reduce(|acc, r| acc.union(r))
    else {
        return;
    };
    let half = width / 2.0;
    fill_where(img, bounds.inflate(half, half), color, |p| {
        segments.iter().any(|&(a, b)| point_to_segment_dist(p, a, b) <= half)
    });
}

/// Draw text in 8x8 bitmap glyphs, each cell `scale` pixels per bit.
/// `origin` is the top-left corner of the first glyph.
pub(crate) fn draw_text(img: &mut RgbaImage, origin: Point, text: &str, scale: u32, color: Rgba<u8>) {
    let cell = f64::from(scale.max(1));
    let mut cursor_x = origin.x;
    for ch in text.chars() {
        let glyph = BASIC_FONTS.get(ch).or_else(|| BASIC_FONTS.get('?'));
        if let Some(glyph) = glyph {
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..8 {
                    // Bit 0 is the leftmost pixel.
                    if (bits >> col) & 1 == 0 {
                        continue;
                    }
                    let x = cursor_x + col as f64 * cell;
                    let y = origin.y + row as f64 * cell;
                    fill_rect(img, Rect::new(x, y, x + cell, y + cell), color);
                }
            }
        }
        cursor_x += 8.0 * cell;
    }
}
