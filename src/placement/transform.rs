//! Translate-rotate-translate transform construction.

use super::Coordinates;

/// A rigid placement transform: translate to a pivot, optionally rotate,
/// then offset the content's local origin.
///
/// Applying the transform to a local content point `p` yields
/// `pivot + R(rotation) * (offset + p)`. The pivot is stored separately from
/// the rotation so [`Transform::translation`] is independent of the angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    translation: (f64, f64),
    /// Rotation in radians, counter-clockwise. `None` means the rotation
    /// step is skipped entirely, keeping the identity sub-matrix exact.
    rotation: Option<f64>,
    offset: (f64, f64),
}

impl Transform {
    /// The pivot point the transform translates to.
    pub fn translation(&self) -> (f64, f64) {
        self.translation
    }

    /// The rotation in degrees, normalized to `[0, 360)`. Zero when the
    /// rotation step was skipped.
    pub fn rotation_degrees(&self) -> f64 {
        self.rotation.map_or(0.0, f64::to_degrees)
    }

    /// Whether the transform carries a rotation step.
    pub fn has_rotation(&self) -> bool {
        self.rotation.is_some()
    }

    /// Apply the transform to a point in content-local coordinates.
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let px = self.offset.0 + x;
        let py = self.offset.1 + y;
        let (rx, ry) = match self.rotation {
            Some(theta) => {
                let (sin, cos) = theta.sin_cos();
                (px * cos - py * sin, px * sin + py * cos)
            }
            None => (px, py),
        };
        (self.translation.0 + rx, self.translation.1 + ry)
    }

    /// The transform as a PDF-order affine matrix `[a, b, c, d, e, f]`,
    /// mapping `x' = a*x + c*y + e` and `y' = b*x + d*y + f`.
    ///
    /// With no rotation the sub-matrix is the exact identity.
    pub fn matrix(&self) -> [f64; 6] {
        let (sin, cos) = match self.rotation {
            Some(theta) => theta.sin_cos(),
            None => (0.0, 1.0),
        };
        // Fold the post-rotation offset into the translation column.
        let e = self.translation.0 + self.offset.0 * cos - self.offset.1 * sin;
        let f = self.translation.1 + self.offset.0 * sin + self.offset.1 * cos;
        [cos, sin, -sin, cos, e, f]
    }
}

fn normalize_degrees(rotation: i32) -> Option<f64> {
    match rotation.rem_euclid(360) {
        0 => None,
        deg => Some(f64::from(deg)),
    }
}

/// Build the placement transform for a resolved content box.
///
/// The pivot is the content box center; rotation is normalized to
/// `[0, 360)` degrees and a normalized rotation of exactly 0 produces no
/// rotation step. The content center stays at the pivot under any angle.
pub fn build_transform(coordinates: Coordinates, rotation: i32) -> Transform {
    Transform {
        translation: coordinates.center(),
        rotation: normalize_degrees(rotation).map(f64::to_radians),
        offset: (-coordinates.width / 2.0, -coordinates.height / 2.0),
    }
}

/// Build the transform for the trademark glyph accompanying a main
/// watermark box.
///
/// The glyph pivots about the *main* box center and its draw origin is the
/// main box's far corner in the rotated frame, so it tracks the main text's
/// top-right edge under any rotation.
pub fn trademark_transform(
    coordinates: Coordinates,
    main_w: f64,
    main_h: f64,
    rotation: i32,
) -> Transform {
    Transform {
        translation: (coordinates.x + main_w / 2.0, coordinates.y + main_h / 2.0),
        rotation: normalize_degrees(rotation).map(f64::to_radians),
        offset: (main_w / 2.0, main_h / 2.0),
    }
}
