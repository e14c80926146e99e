//! Glyph rasterization and pixel compositing shared by the raster targets.
//!
//! Text is drawn onto a transparent RGBA layer with the watermark's opacity
//! baked into the glyph alpha, optionally combined with a trademark glyph,
//! rotated about its center with bilinear resampling, and finally blended
//! onto the destination with the Porter-Duff "over" operator.

use ab_glyph::{Font, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};

use crate::attributes::Color;
use crate::error::{Result, WatermarkError};
use crate::fonts::FontLibrary;

/// A rendered watermark layer ready for compositing.
///
/// `anchor` is the position of the main text box center inside `image`;
/// targets paste the layer so this point lands on the placement pivot.
#[derive(Debug, Clone)]
pub struct TextLayer {
    /// The rendered RGBA pixels.
    pub image: RgbaImage,
    /// Main text box center within the layer, in layer pixels.
    pub anchor: (f64, f64),
    /// Main text box size before rotation.
    pub content_size: (f64, f64),
}

/// Rasterize a single line of text onto a tight transparent canvas.
///
/// The opacity is baked into the glyph alpha. Returns an error when no glyph
/// in the text has an outline (blank canvas would silently no-op).
pub fn rasterize_line(
    fonts: &FontLibrary,
    text: &str,
    size: f64,
    color: Color,
    opacity: f64,
) -> Result<RgbaImage> {
    let font = fonts.font();
    let scale = PxScale::from(size as f32);
    let scaled = font.as_scaled(scale);

    let (width, height) = fonts.measure(text, size);
    let canvas_w = (width.ceil() as u32).max(1);
    let canvas_h = (height.ceil() as u32).max(1);
    let mut canvas = RgbaImage::new(canvas_w, canvas_h);

    let alpha = (opacity.clamp(0.0, 1.0) * 255.0) as f32;
    let baseline_y = scaled.ascent();

    let mut cursor_x = 0.0f32;
    let mut prev = None;
    let mut drew_outline = false;

    for c in text.chars() {
        let id = scaled.font().glyph_id(c);
        if let Some(prev_id) = prev {
            cursor_x += scaled.kern(prev_id, id);
        }

        let glyph = id.with_scale_and_position(scale, ab_glyph::point(cursor_x, baseline_y));
        if let Some(outlined) = font.outline_glyph(glyph) {
            drew_outline = true;
            let bounds = outlined.px_bounds();
            outlined.draw(|px, py, coverage| {
                let x = px as i32 + bounds.min.x as i32;
                let y = py as i32 + bounds.min.y as i32;
                if x >= 0 && y >= 0 && (x as u32) < canvas_w && (y as u32) < canvas_h {
                    let pixel = Rgba([color.r, color.g, color.b, (coverage * alpha) as u8]);
                    let existing = canvas.get_pixel(x as u32, y as u32);
                    canvas.put_pixel(x as u32, y as u32, blend_pixels(*existing, pixel));
                }
            });
        }

        cursor_x += scaled.h_advance(id);
        prev = Some(id);
    }

    if !drew_outline {
        return Err(WatermarkError::render_failed(format!(
            "font has no outlines for any character of {text:?}"
        )));
    }

    Ok(canvas)
}

/// Render the complete watermark layer: main text, optional trademark glyph,
/// rotation.
///
/// The trademark glyph is composed at the main text's top-right corner
/// before rotation, so the combined layer rotates as one rigid body about
/// the main text center.
pub fn render_layer(
    fonts: &FontLibrary,
    text: &str,
    size: f64,
    color: Color,
    opacity: f64,
    rotation: i32,
    trademark: Option<(&str, f64)>,
) -> Result<TextLayer> {
    let main = rasterize_line(fonts, text, size, color, opacity)?;
    let (main_w, main_h) = (main.width(), main.height());

    let canvas = match trademark {
        Some((glyph, scale)) => {
            let tm = rasterize_line(fonts, glyph, size * scale, color, opacity)?;
            let mut canvas = RgbaImage::new(main_w + tm.width(), main_h.max(tm.height()));
            blend_layer(&mut canvas, &main, 0, 0);
            blend_layer(&mut canvas, &tm, main_w as i64, 0);
            canvas
        }
        None => main,
    };

    // Main box center in unrotated canvas coordinates.
    let center = (f64::from(main_w) / 2.0, f64::from(main_h) / 2.0);

    let degrees = rotation.rem_euclid(360);
    if degrees == 0 {
        return Ok(TextLayer {
            image: canvas,
            anchor: center,
            content_size: (f64::from(main_w), f64::from(main_h)),
        });
    }

    let (src_w, src_h) = (canvas.width(), canvas.height());
    let rotated = rotate_rgba(&canvas, f64::from(degrees));
    let anchor = map_through_rotation(
        (src_w, src_h),
        (rotated.width(), rotated.height()),
        f64::from(degrees),
        center,
    );

    Ok(TextLayer {
        image: rotated,
        anchor,
        content_size: (f64::from(main_w), f64::from(main_h)),
    })
}

/// Blend a layer onto the target at the given position, clipping to the
/// target bounds.
pub fn blend_layer(target: &mut RgbaImage, layer: &RgbaImage, x: i64, y: i64) {
    let target_w = i64::from(target.width());
    let target_h = i64::from(target.height());
    let layer_w = i64::from(layer.width());
    let layer_h = i64::from(layer.height());

    let x_start = x.max(0);
    let y_start = y.max(0);
    let x_end = (x + layer_w).min(target_w);
    let y_end = (y + layer_h).min(target_h);

    for ty in y_start..y_end {
        for tx in x_start..x_end {
            let src = layer.get_pixel((tx - x) as u32, (ty - y) as u32);
            if src[3] == 0 {
                continue;
            }
            let dst = target.get_pixel(tx as u32, ty as u32);
            let blended = blend_pixels(*dst, *src);
            target.put_pixel(tx as u32, ty as u32, blended);
        }
    }
}

/// Porter-Duff "over": composite `top` onto `bottom`.
pub fn blend_pixels(bottom: Rgba<u8>, top: Rgba<u8>) -> Rgba<u8> {
    let top_alpha = f32::from(top[3]) / 255.0;
    let bottom_alpha = f32::from(bottom[3]) / 255.0;

    let out_alpha = top_alpha + bottom_alpha * (1.0 - top_alpha);
    if out_alpha < 0.001 {
        return Rgba([0, 0, 0, 0]);
    }

    let blend = |t: u8, b: u8| -> u8 {
        let t = f32::from(t) / 255.0;
        let b = f32::from(b) / 255.0;
        let v = (t * top_alpha + b * bottom_alpha * (1.0 - top_alpha)) / out_alpha;
        (v * 255.0).clamp(0.0, 255.0) as u8
    };

    Rgba([
        blend(top[0], bottom[0]),
        blend(top[1], bottom[1]),
        blend(top[2], bottom[2]),
        (out_alpha * 255.0) as u8,
    ])
}

/// Rotate an RGBA image counter-clockwise (as seen by the viewer) about its
/// center, expanding the canvas to fit and sampling bilinearly.
pub fn rotate_rgba(image: &RgbaImage, degrees: f64) -> RgbaImage {
    // Screen coordinates are y-down, so a visually counter-clockwise turn is
    // a negative mathematical angle.
    let theta = (-degrees).to_radians() as f32;
    let (sin, cos) = theta.sin_cos();

    let src_w = image.width() as f32;
    let src_h = image.height() as f32;
    let cx = src_w / 2.0;
    let cy = src_h / 2.0;

    let corners = [
        (-cx, -cy),
        (src_w - cx, -cy),
        (-cx, src_h - cy),
        (src_w - cx, src_h - cy),
    ];
    let mut min_x = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    for (x, y) in corners {
        let rx = x * cos - y * sin;
        let ry = x * sin + y * cos;
        min_x = min_x.min(rx);
        max_x = max_x.max(rx);
        min_y = min_y.min(ry);
        max_y = max_y.max(ry);
    }

    let dst_w = ((max_x - min_x).ceil() as u32).max(1);
    let dst_h = ((max_y - min_y).ceil() as u32).max(1);
    let mut rotated = RgbaImage::new(dst_w, dst_h);

    let dst_cx = dst_w as f32 / 2.0;
    let dst_cy = dst_h as f32 / 2.0;

    // Inverse rotation maps destination pixels back into the source.
    let (inv_sin, inv_cos) = (-theta).sin_cos();

    for dy in 0..dst_h {
        for dx in 0..dst_w {
            let rx = dx as f32 + 0.5 - dst_cx;
            let ry = dy as f32 + 0.5 - dst_cy;

            let sx = rx * inv_cos - ry * inv_sin + cx - 0.5;
            let sy = rx * inv_sin + ry * inv_cos + cy - 0.5;

            if sx >= 0.0 && sx < src_w && sy >= 0.0 && sy < src_h {
                let x0 = sx.floor() as u32;
                let y0 = sy.floor() as u32;
                // Clamp the far texel so the last row and column still sample.
                let x1 = (x0 + 1).min(image.width() - 1);
                let y1 = (y0 + 1).min(image.height() - 1);
                let fx = sx - x0 as f32;
                let fy = sy - y0 as f32;

                let p00 = image.get_pixel(x0, y0);
                let p10 = image.get_pixel(x1, y0);
                let p01 = image.get_pixel(x0, y1);
                let p11 = image.get_pixel(x1, y1);

                let lerp = |c: usize| -> u8 {
                    let v = f32::from(p00[c]) * (1.0 - fx) * (1.0 - fy)
                        + f32::from(p10[c]) * fx * (1.0 - fy)
                        + f32::from(p01[c]) * (1.0 - fx) * fy
                        + f32::from(p11[c]) * fx * fy;
                    v.clamp(0.0, 255.0) as u8
                };

                rotated.put_pixel(dx, dy, Rgba([lerp(0), lerp(1), lerp(2), lerp(3)]));
            }
        }
    }

    rotated
}

/// Map a source-canvas point through [`rotate_rgba`]'s motion: rotate about
/// the source center, then re-center on the destination canvas.
pub fn map_through_rotation(
    src: (u32, u32),
    dst: (u32, u32),
    degrees: f64,
    point: (f64, f64),
) -> (f64, f64) {
    let theta = (-degrees).to_radians();
    let (sin, cos) = theta.sin_cos();

    let lx = point.0 - f64::from(src.0) / 2.0;
    let ly = point.1 - f64::from(src.1) / 2.0;

    (
        f64::from(dst.0) / 2.0 + lx * cos - ly * sin,
        f64::from(dst.1) / 2.0 + lx * sin + ly * cos,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fonts() -> FontLibrary {
        FontLibrary::discover().expect("system font available")
    }

    #[test]
    fn test_rasterize_produces_visible_pixels() {
        let image = rasterize_line(&fonts(), "Hello", 24.0, Color::black(), 1.0).unwrap();
        assert!(image.width() > 0 && image.height() > 0);
        assert!(image.pixels().any(|p| p[3] > 0));
    }

    #[test]
    fn test_rasterize_opacity_caps_alpha() {
        let f = fonts();
        let full = rasterize_line(&f, "Test", 24.0, Color::black(), 1.0).unwrap();
        let half = rasterize_line(&f, "Test", 24.0, Color::black(), 0.5).unwrap();

        let max_full = full.pixels().map(|p| p[3]).max().unwrap();
        let max_half = half.pixels().map(|p| p[3]).max().unwrap();
        assert!(max_half < max_full);
        assert!(max_half <= 128);
    }

    #[test]
    fn test_blend_opaque_top_wins() {
        let bottom = Rgba([10, 20, 30, 255]);
        let top = Rgba([200, 100, 50, 255]);
        assert_eq!(blend_pixels(bottom, top), top);
    }

    #[test]
    fn test_blend_transparent_top_keeps_bottom() {
        let bottom = Rgba([10, 20, 30, 255]);
        let top = Rgba([200, 100, 50, 0]);
        assert_eq!(blend_pixels(bottom, top), bottom);
    }

    #[test]
    fn test_blend_layer_clips_outside_target() {
        let mut target = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 255]));
        let layer = RgbaImage::from_pixel(6, 6, Rgba([255, 255, 255, 255]));
        blend_layer(&mut target, &layer, -3, -3);

        assert_eq!(target.get_pixel(0, 0)[0], 255);
        assert_eq!(target.get_pixel(3, 3)[0], 0);
    }

    #[test]
    fn test_rotate_90_swaps_dimensions() {
        let image = RgbaImage::new(40, 10);
        let rotated = rotate_rgba(&image, 90.0);
        assert_eq!((rotated.width(), rotated.height()), (10, 40));
    }

    #[test]
    fn test_rotate_90_keeps_edge_texels() {
        // A quarter turn maps texel centers onto texel centers; cropping the
        // source's last row and column would lose a full 9-pixel band here.
        let image = RgbaImage::from_pixel(5, 5, Rgba([255, 0, 0, 255]));
        let rotated = rotate_rgba(&image, 90.0);

        assert_eq!((rotated.width(), rotated.height()), (5, 5));
        let opaque = rotated.pixels().filter(|p| p[3] == 255).count();
        assert!(opaque >= 20, "edge texels cropped: {opaque}/25 opaque");
    }

    #[test]
    fn test_rotate_single_column_renders() {
        let image = RgbaImage::from_pixel(1, 10, Rgba([0, 0, 255, 255]));
        let rotated = rotate_rgba(&image, 90.0);

        assert!(rotated.pixels().any(|p| p[3] > 0));
    }

    #[test]
    fn test_map_through_rotation_fixes_center() {
        let mapped = map_through_rotation((40, 10), (10, 40), 90.0, (20.0, 5.0));
        assert!((mapped.0 - 5.0).abs() < 1e-9);
        assert!((mapped.1 - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_render_layer_with_trademark_is_wider() {
        let f = fonts();
        let plain = render_layer(&f, "Brand", 24.0, Color::black(), 1.0, 0, None).unwrap();
        let marked =
            render_layer(&f, "Brand", 24.0, Color::black(), 1.0, 0, Some(("\u{00AE}", 0.5)))
                .unwrap();
        assert!(marked.image.width() > plain.image.width());
        // Main box anchor is unaffected by the glyph.
        assert_eq!(marked.anchor, plain.anchor);
    }

    #[test]
    fn test_render_layer_rotation_keeps_anchor_inside() {
        let layer =
            render_layer(&fonts(), "Rotated", 24.0, Color::black(), 1.0, 45, None).unwrap();
        assert!(layer.anchor.0 > 0.0 && layer.anchor.0 < f64::from(layer.image.width()));
        assert!(layer.anchor.1 > 0.0 && layer.anchor.1 < f64::from(layer.image.height()));
    }
}
