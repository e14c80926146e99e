//! Fluent watermarking API.
//!
//! [`WatermarkService`] picks the target format and hands back a
//! [`WatermarkBuilder`] whose setters describe the watermark. `and()` starts
//! a second watermark in the same pass; `apply()` renders them all and
//! returns the target.
//!
//! # Examples
//!
//! ```no_run
//! use aquamark::{Anchor, WatermarkService};
//!
//! # async fn example() -> aquamark::Result<()> {
//! let service = WatermarkService::new()?;
//! let stamped = service
//!     .pdf_file("contract.pdf")
//!     .await?
//!     .text("CONFIDENTIAL")
//!     .size(36.0)
//!     .opacity(0.3)
//!     .rotation(45)
//!     .and()
//!     .text("Acme Corp")
//!     .position(Anchor::BottomRight)
//!     .trademark()
//!     .apply()
//!     .await?;
//! stamped.save("contract-stamped.pdf").await?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use image::RgbaImage;
use log::info;

use crate::attributes::{Anchor, Color, WatermarkAttributes};
use crate::error::Result;
use crate::render::{ImageTarget, OverlayTarget, PdfTarget, RenderContext, VideoTarget};

/// Entry point selecting the surface kind to watermark.
#[derive(Debug, Clone)]
pub struct WatermarkService {
    ctx: RenderContext,
}

impl WatermarkService {
    /// Create a service with a system-discovered font and default context.
    pub fn new() -> Result<Self> {
        Ok(Self {
            ctx: RenderContext::with_system_font()?,
        })
    }

    /// Create a service with an explicit render context.
    pub fn with_context(ctx: RenderContext) -> Self {
        Self { ctx }
    }

    /// The render context used for every builder this service creates.
    pub fn context(&self) -> &RenderContext {
        &self.ctx
    }

    /// Watermark a PDF file.
    pub async fn pdf_file(&self, path: impl AsRef<Path>) -> Result<WatermarkBuilder<PdfTarget>> {
        Ok(self.builder(PdfTarget::from_file(path).await?))
    }

    /// Watermark an in-memory PDF.
    pub fn pdf_bytes(&self, bytes: &[u8]) -> Result<WatermarkBuilder<PdfTarget>> {
        Ok(self.builder(PdfTarget::from_bytes(bytes)?))
    }

    /// Watermark an image file.
    pub async fn image_file(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<WatermarkBuilder<ImageTarget>> {
        Ok(self.builder(ImageTarget::from_file(path).await?))
    }

    /// Watermark an in-memory image.
    pub fn image_bytes(&self, bytes: &[u8]) -> Result<WatermarkBuilder<ImageTarget>> {
        Ok(self.builder(ImageTarget::from_bytes(bytes)?))
    }

    /// Watermark decoded video frames.
    pub fn video_frames(
        &self,
        frames: Vec<RgbaImage>,
        fps: f64,
    ) -> Result<WatermarkBuilder<VideoTarget>> {
        Ok(self.builder(VideoTarget::new(frames, fps)?))
    }

    fn builder<T: OverlayTarget>(&self, target: T) -> WatermarkBuilder<T> {
        WatermarkBuilder {
            target,
            ctx: self.ctx.clone(),
            finished: Vec::new(),
            current: WatermarkAttributes::default(),
        }
    }
}

/// Fluent description of one or more watermarks over a single target.
#[derive(Debug)]
pub struct WatermarkBuilder<T: OverlayTarget> {
    target: T,
    ctx: RenderContext,
    finished: Vec<WatermarkAttributes>,
    current: WatermarkAttributes,
}

impl<T: OverlayTarget> WatermarkBuilder<T> {
    /// Set the watermark text.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.current.text = text.into();
        self
    }

    /// Set the font size in surface units.
    pub fn size(mut self, size: f64) -> Self {
        self.current.size = size;
        self
    }

    /// Set the text color.
    pub fn color(mut self, color: Color) -> Self {
        self.current.color = color;
        self
    }

    /// Set the opacity, 0.0 to 1.0.
    pub fn opacity(mut self, opacity: f64) -> Self {
        self.current.opacity = opacity;
        self
    }

    /// Set the rotation in degrees, counter-clockwise.
    pub fn rotation(mut self, degrees: i32) -> Self {
        self.current.rotation = degrees;
        self
    }

    /// Anchor the watermark at a named position.
    pub fn position(mut self, anchor: Anchor) -> Self {
        self.current.anchor = anchor;
        self
    }

    /// Anchor the watermark at explicit coordinates.
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.current.anchor = Anchor::Custom { x, y };
        self
    }

    /// Set the margin used by corner and edge anchors.
    pub fn margin(mut self, margin: f64) -> Self {
        self.current.margin = margin;
        self
    }

    /// Tile the watermark across the surface with the given spacing.
    pub fn tiled(mut self, spacing: f64) -> Self {
        self.current.tiled = true;
        self.current.tile_spacing = spacing;
        self
    }

    /// Append the trademark glyph to the text.
    pub fn trademark(mut self) -> Self {
        self.current.trademark = true;
        self
    }

    /// Finish the current watermark and start describing another one from
    /// defaults.
    pub fn and(mut self) -> Self {
        self.finished.push(std::mem::take(&mut self.current));
        self
    }

    /// The watermarks described so far, including the one in progress.
    pub fn watermarks(&self) -> Vec<WatermarkAttributes> {
        let mut all = self.finished.clone();
        all.push(self.current.clone());
        all
    }

    /// Validate all watermarks, render them in order, and return the
    /// watermarked target.
    ///
    /// Validation runs up front for every chained watermark, so a bad
    /// attribute in the last one leaves the target untouched.
    pub async fn apply(mut self) -> Result<T> {
        self.finished.push(self.current);

        for attrs in &self.finished {
            attrs.validate()?;
        }

        info!("Applying {} watermark(s)", self.finished.len());
        for attrs in &self.finished {
            self.target.apply_overlay(attrs, &self.ctx).await?;
        }
        Ok(self.target)
    }
}

impl WatermarkBuilder<PdfTarget> {
    /// Render all watermarks and save the PDF to a file.
    pub async fn apply_to_file(self, path: impl AsRef<Path>) -> Result<PdfTarget> {
        let target = self.apply().await?;
        target.save(path).await?;
        Ok(target)
    }
}

impl WatermarkBuilder<ImageTarget> {
    /// Render all watermarks and save the image to a file.
    pub async fn apply_to_file(self, path: impl AsRef<Path>) -> Result<ImageTarget> {
        let target = self.apply().await?;
        target.save(path).await?;
        Ok(target)
    }
}
