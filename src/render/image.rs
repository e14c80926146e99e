//! Raster image watermark overlay.
//!
//! The watermark is rendered once to an RGBA layer (text, optional
//! trademark glyph, rotation) and alpha-blended onto the decoded pixels at
//! every resolved position. Input format is detected from the byte
//! signature and preserved on save.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, RgbaImage};
use log::debug;
use tokio::task;

use crate::attributes::WatermarkAttributes;
use crate::error::{Result, WatermarkError};
use crate::placement::{resolve_position, resolve_tiled, Surface};
use crate::render::text::render_layer;
use crate::render::{text, OverlayTarget, RenderContext};

/// A decoded raster image being watermarked.
#[derive(Debug, Clone)]
pub struct ImageTarget {
    pixels: RgbaImage,
    format: ImageFormat,
    source: Option<PathBuf>,
}

impl ImageTarget {
    /// Wrap already-decoded pixels. Output encodes as PNG unless
    /// [`ImageTarget::with_format`] overrides it.
    pub fn from_pixels(pixels: RgbaImage) -> Self {
        Self {
            pixels,
            format: ImageFormat::Png,
            source: None,
        }
    }

    /// Decode an image from raw bytes, detecting the format from its
    /// signature.
    ///
    /// # Errors
    ///
    /// [`WatermarkError::UnsupportedImageFormat`] when the signature is not
    /// recognized, [`WatermarkError::ImageDecode`] when decoding fails.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let format =
            image::guess_format(bytes).map_err(|_| WatermarkError::UnsupportedImageFormat)?;
        let decoded = image::load_from_memory_with_format(bytes, format)
            .map_err(|e| WatermarkError::image_decode(e.to_string()))?;
        Ok(Self {
            pixels: decoded.to_rgba8(),
            format,
            source: None,
        })
    }

    /// Load and decode an image file.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(WatermarkError::file_not_found(path));
        }

        let bytes = tokio::fs::read(&path).await?;
        let mut target = task::spawn_blocking(move || Self::from_bytes(&bytes))
            .await
            .map_err(|e| WatermarkError::other(format!("Decode task failed: {e}")))??;
        target.source = Some(path);
        Ok(target)
    }

    /// Override the output encoding format.
    pub fn with_format(mut self, format: ImageFormat) -> Self {
        self.format = format;
        self
    }

    /// The current pixels.
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Consume the target, returning the watermarked pixels.
    pub fn into_pixels(self) -> RgbaImage {
        self.pixels
    }

    /// Image dimensions in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// The detected input format, used for encoding.
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// The file this image was loaded from, when it came from disk.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Encode the watermarked image in its input format.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        // JPEG has no alpha channel; flatten before encoding.
        let dynamic = if self.format == ImageFormat::Jpeg {
            DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(self.pixels.clone()).to_rgb8())
        } else {
            DynamicImage::ImageRgba8(self.pixels.clone())
        };

        let mut buffer = Cursor::new(Vec::new());
        dynamic.write_to(&mut buffer, self.format)?;
        Ok(buffer.into_inner())
    }

    /// Save the watermarked image, writing to a temporary sibling first.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref().to_path_buf();
        let bytes = self.to_bytes()?;

        task::spawn_blocking(move || {
            let tmp_path = path.with_extension("tmp");
            std::fs::write(&tmp_path, &bytes).map_err(|e| WatermarkError::FailedToWrite {
                path: tmp_path.clone(),
                source: e,
            })?;
            std::fs::rename(&tmp_path, &path).map_err(|e| WatermarkError::FailedToWrite {
                path,
                source: e,
            })
        })
        .await
        .map_err(|e| WatermarkError::other(format!("Write task failed: {e}")))?
    }
}

impl OverlayTarget for ImageTarget {
    async fn apply_overlay(
        &mut self,
        attrs: &WatermarkAttributes,
        ctx: &RenderContext,
    ) -> Result<()> {
        attrs.validate()?;

        let trademark = ctx
            .trademarks
            .select(attrs)
            .map(|s| (s.glyph().to_string(), s.scale()));
        let layer = render_layer(
            &ctx.fonts,
            &attrs.text,
            attrs.size,
            attrs.color,
            attrs.opacity,
            attrs.rotation,
            trademark.as_ref().map(|(g, s)| (g.as_str(), *s)),
        )?;

        let (width, height) = self.pixels.dimensions();
        let surface = Surface::new(f64::from(width), f64::from(height));
        let (content_w, content_h) = layer.content_size;

        let positions = if attrs.tiled {
            resolve_tiled(surface, content_w, content_h, attrs.tile_spacing)?
        } else {
            vec![resolve_position(
                surface,
                attrs.anchor,
                content_w,
                content_h,
                attrs.margin,
            )?]
        };
        debug!(
            "Compositing {:?} at {} position(s) on {}x{} image",
            attrs.text,
            positions.len(),
            width,
            height
        );

        for coords in &positions {
            let (pivot_x, pivot_y) = coords.center();
            let x = (pivot_x - layer.anchor.0).round() as i64;
            let y = (pivot_y - layer.anchor.1).round() as i64;
            text::blend_layer(&mut self.pixels, &layer.image, x, y);
        }

        Ok(())
    }
}
