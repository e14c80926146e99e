//! Anchor resolution: named 9-grid positions, explicit coordinates, and
//! tiled grids.

use crate::attributes::Anchor;
use crate::error::{Result, WatermarkError};

/// The drawable area being watermarked, in surface units.
///
/// For PDF pages this is the media box size in points; for raster targets it
/// is the pixel size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    /// Surface width.
    pub width: f64,
    /// Surface height.
    pub height: f64,
}

impl Surface {
    /// Create a surface of the given size.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A resolved content box: draw origin (top-left, y-down) plus dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    /// X of the content's top-left corner.
    pub x: f64,
    /// Y of the content's top-left corner.
    pub y: f64,
    /// Content width.
    pub width: f64,
    /// Content height.
    pub height: f64,
}

impl Coordinates {
    /// Create a resolved content box.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The center point of the content box.
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

fn check_inputs(surface: Surface, content_w: f64, content_h: f64) -> Result<()> {
    if !surface.width.is_finite()
        || !surface.height.is_finite()
        || surface.width <= 0.0
        || surface.height <= 0.0
    {
        return Err(WatermarkError::invalid_attribute(format!(
            "surface dimensions must be positive, got {}x{}",
            surface.width, surface.height
        )));
    }
    if !content_w.is_finite() || !content_h.is_finite() || content_w < 0.0 || content_h < 0.0 {
        return Err(WatermarkError::invalid_attribute(format!(
            "content dimensions must be non-negative, got {content_w}x{content_h}"
        )));
    }
    Ok(())
}

/// Resolve the draw origin for content of the given size anchored on a
/// surface.
///
/// Named anchors place the content box so it is centered on the anchor's
/// reference point, with corner and edge anchors inset by `margin`.
/// [`Anchor::Custom`] coordinates are passed through unchanged with no
/// bounds clamping.
///
/// # Errors
///
/// Returns [`WatermarkError::InvalidAttribute`] for non-positive or
/// non-finite surface dimensions, or negative content dimensions.
pub fn resolve_position(
    surface: Surface,
    anchor: Anchor,
    content_w: f64,
    content_h: f64,
    margin: f64,
) -> Result<Coordinates> {
    check_inputs(surface, content_w, content_h)?;

    let center_x = (surface.width - content_w) / 2.0;
    let center_y = (surface.height - content_h) / 2.0;
    let right_x = surface.width - content_w - margin;
    let bottom_y = surface.height - content_h - margin;

    let (x, y) = match anchor {
        Anchor::TopLeft => (margin, margin),
        Anchor::TopCenter => (center_x, margin),
        Anchor::TopRight => (right_x, margin),
        Anchor::CenterLeft => (margin, center_y),
        Anchor::Center => (center_x, center_y),
        Anchor::CenterRight => (right_x, center_y),
        Anchor::BottomLeft => (margin, bottom_y),
        Anchor::BottomCenter => (center_x, bottom_y),
        Anchor::BottomRight => (right_x, bottom_y),
        Anchor::Custom { x, y } => (x, y),
    };

    Ok(Coordinates::new(x, y, content_w, content_h))
}

/// Resolve a row-major grid of positions covering the whole surface.
///
/// Instances are laid out from the top-left corner with a step of
/// `content + spacing` on each axis. The last row and column may extend past
/// the surface edge; targets clip as part of compositing.
///
/// # Errors
///
/// Returns [`WatermarkError::InvalidAttribute`] for invalid surface or
/// content dimensions (tiled content must be strictly positive) or a
/// negative spacing.
pub fn resolve_tiled(
    surface: Surface,
    content_w: f64,
    content_h: f64,
    spacing: f64,
) -> Result<Vec<Coordinates>> {
    check_inputs(surface, content_w, content_h)?;
    if content_w == 0.0 || content_h == 0.0 {
        return Err(WatermarkError::invalid_attribute(
            "tiled content dimensions must be positive",
        ));
    }
    if !spacing.is_finite() || spacing < 0.0 {
        return Err(WatermarkError::invalid_attribute(format!(
            "tile spacing must be non-negative, got {spacing}"
        )));
    }

    let step_x = content_w + spacing;
    let step_y = content_h + spacing;

    let mut positions = Vec::new();
    let mut y = 0.0;
    while y < surface.height {
        let mut x = 0.0;
        while x < surface.width {
            positions.push(Coordinates::new(x, y, content_w, content_h));
            x += step_x;
        }
        y += step_y;
    }
    Ok(positions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const SURFACE: Surface = Surface {
        width: 600.0,
        height: 800.0,
    };

    #[test]
    fn test_center_position() {
        let coords = resolve_position(SURFACE, Anchor::Center, 200.0, 50.0, 10.0).unwrap();
        assert_eq!(coords.x, 200.0);
        assert_eq!(coords.y, 375.0);
        assert_eq!(coords.center(), (300.0, 400.0));
    }

    #[rstest]
    #[case(Anchor::TopLeft, 10.0, 10.0)]
    #[case(Anchor::TopCenter, 200.0, 10.0)]
    #[case(Anchor::TopRight, 390.0, 10.0)]
    #[case(Anchor::CenterLeft, 10.0, 375.0)]
    #[case(Anchor::Center, 200.0, 375.0)]
    #[case(Anchor::CenterRight, 390.0, 375.0)]
    #[case(Anchor::BottomLeft, 10.0, 740.0)]
    #[case(Anchor::BottomCenter, 200.0, 740.0)]
    #[case(Anchor::BottomRight, 390.0, 740.0)]
    fn test_nine_grid(#[case] anchor: Anchor, #[case] x: f64, #[case] y: f64) {
        let coords = resolve_position(SURFACE, anchor, 200.0, 50.0, 10.0).unwrap();
        assert_eq!((coords.x, coords.y), (x, y), "anchor {anchor:?}");
    }

    #[test]
    fn test_custom_passes_through_without_clamping() {
        let coords = resolve_position(
            SURFACE,
            Anchor::Custom { x: -50.0, y: 900.0 },
            200.0,
            50.0,
            10.0,
        )
        .unwrap();
        assert_eq!((coords.x, coords.y), (-50.0, 900.0));
    }

    #[test]
    fn test_negative_content_width_rejected() {
        let err = resolve_position(SURFACE, Anchor::Center, -200.0, 50.0, 0.0).unwrap_err();
        assert!(matches!(err, WatermarkError::InvalidAttribute { .. }));
    }

    #[rstest]
    #[case(0.0, 800.0)]
    #[case(-600.0, 800.0)]
    #[case(600.0, 0.0)]
    #[case(f64::NAN, 800.0)]
    #[case(600.0, f64::INFINITY)]
    fn test_bad_surface_rejected(#[case] w: f64, #[case] h: f64) {
        let err =
            resolve_position(Surface::new(w, h), Anchor::Center, 200.0, 50.0, 0.0).unwrap_err();
        assert!(matches!(err, WatermarkError::InvalidAttribute { .. }));
    }

    #[test]
    fn test_tiled_grid_is_row_major() {
        // 600 wide / step 250 -> columns at 0, 250, 500 (3 per row)
        // 800 tall / step 100 -> rows at 0, 100, ..., 700 (8 rows)
        let tiles = resolve_tiled(SURFACE, 200.0, 50.0, 50.0).unwrap();
        assert_eq!(tiles.len(), 24);
        assert_eq!((tiles[0].x, tiles[0].y), (0.0, 0.0));
        assert_eq!((tiles[1].x, tiles[1].y), (250.0, 0.0));
        assert_eq!((tiles[2].x, tiles[2].y), (500.0, 0.0));
        assert_eq!((tiles[3].x, tiles[3].y), (0.0, 100.0));
        assert_eq!((tiles[23].x, tiles[23].y), (500.0, 700.0));
    }

    #[test]
    fn test_tiled_rejects_zero_content() {
        assert!(resolve_tiled(SURFACE, 0.0, 50.0, 10.0).is_err());
        assert!(resolve_tiled(SURFACE, 200.0, 50.0, -1.0).is_err());
    }
}
