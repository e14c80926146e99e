//! Font loading and text measurement.
//!
//! [`FontLibrary`] wraps an [`ab_glyph`] font loaded from explicit bytes, a
//! file, or system discovery via `fontdb`. It supplies the content bounding
//! box consumed by the placement engine; placement itself never touches font
//! data.

use std::path::Path;

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use fontdb::{Database, Family, Query};
use log::debug;

use crate::error::{Result, WatermarkError};

/// A loaded font plus measurement helpers.
#[derive(Debug, Clone)]
pub struct FontLibrary {
    font: FontArc,
}

impl FontLibrary {
    /// Load a font from raw TTF/OTF bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let font = FontArc::try_from_vec(bytes)
            .map_err(|e| WatermarkError::font_unavailable(format!("invalid font data: {e}")))?;
        Ok(Self { font })
    }

    /// Load a font from a TTF/OTF file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(WatermarkError::file_not_found(path.to_path_buf()));
        }
        let bytes = std::fs::read(path)?;
        Self::from_bytes(bytes)
    }

    /// Discover a sans-serif font from the system font database.
    ///
    /// Prefers DejaVu Sans when installed, falling back to the platform's
    /// generic sans-serif face.
    ///
    /// # Errors
    ///
    /// Returns [`WatermarkError::FontUnavailable`] when no matching face can
    /// be found or its data cannot be read.
    pub fn discover() -> Result<Self> {
        let mut db = Database::new();
        db.load_system_fonts();

        let query = Query {
            families: &[Family::Name("DejaVu Sans"), Family::SansSerif],
            ..Query::default()
        };
        let id = db.query(&query).ok_or_else(|| {
            WatermarkError::font_unavailable("no sans-serif font found on this system")
        })?;

        if let Some(info) = db.face(id) {
            debug!("Discovered system font: {:?}", info.post_script_name);
        }

        let bytes = db
            .with_face_data(id, |data, _index| data.to_vec())
            .ok_or_else(|| {
                WatermarkError::font_unavailable("failed to read discovered font data")
            })?;
        Self::from_bytes(bytes)
    }

    /// The underlying font.
    pub fn font(&self) -> &FontArc {
        &self.font
    }

    /// Distance from the bottom of the measured box up to the text
    /// baseline, at the given pixel size.
    pub fn baseline_offset(&self, size: f64) -> f64 {
        let scaled = self.font.as_scaled(PxScale::from(size as f32));
        f64::from(-scaled.descent())
    }

    /// Measure the bounding box of a single line of text at the given pixel
    /// size, including kerning.
    pub fn measure(&self, text: &str, size: f64) -> (f64, f64) {
        let scaled = self.font.as_scaled(PxScale::from(size as f32));

        let mut width = 0.0f32;
        let mut prev = None;
        for c in text.chars() {
            let id = scaled.font().glyph_id(c);
            if let Some(prev_id) = prev {
                width += scaled.kern(prev_id, id);
            }
            width += scaled.h_advance(id);
            prev = Some(id);
        }

        let height = scaled.ascent() - scaled.descent();
        (f64::from(width), f64::from(height))
    }
}
