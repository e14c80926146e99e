//! Frame-level video watermark overlay.
//!
//! Container demuxing and muxing stay outside the crate; the target
//! operates on caller-decoded RGBA frames. The watermark layer is rendered
//! once and composited onto every frame, fanning out over the blocking pool
//! with bounded concurrency and restoring frame order by index afterwards.

use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use image::RgbaImage;
use log::debug;
use tokio::task;

use crate::attributes::WatermarkAttributes;
use crate::error::{Result, WatermarkError};
use crate::placement::{resolve_position, resolve_tiled, Surface};
use crate::render::text::{self, render_layer};
use crate::render::{OverlayTarget, RenderContext};

/// A sequence of decoded video frames being watermarked.
#[derive(Debug, Clone)]
pub struct VideoTarget {
    frames: Vec<RgbaImage>,
    fps: f64,
    dimensions: (u32, u32),
}

impl VideoTarget {
    /// Wrap decoded frames.
    ///
    /// # Errors
    ///
    /// Returns [`WatermarkError::InvalidAttribute`] when the sequence is
    /// empty, the frames disagree on dimensions, or the frame rate is not a
    /// positive number.
    pub fn new(frames: Vec<RgbaImage>, fps: f64) -> Result<Self> {
        let first = frames.first().ok_or_else(|| {
            WatermarkError::invalid_attribute("video must contain at least one frame")
        })?;
        let dimensions = first.dimensions();

        if let Some(odd) = frames.iter().find(|f| f.dimensions() != dimensions) {
            return Err(WatermarkError::invalid_attribute(format!(
                "all frames must share dimensions; expected {}x{}, found {}x{}",
                dimensions.0,
                dimensions.1,
                odd.width(),
                odd.height()
            )));
        }
        if !fps.is_finite() || fps <= 0.0 {
            return Err(WatermarkError::invalid_attribute(format!(
                "frame rate must be positive, got {fps}"
            )));
        }

        Ok(Self {
            frames,
            fps,
            dimensions,
        })
    }

    /// The watermarked frames, in original order.
    pub fn frames(&self) -> &[RgbaImage] {
        &self.frames
    }

    /// Consume the target, returning the watermarked frames.
    pub fn into_frames(self) -> Vec<RgbaImage> {
        self.frames
    }

    /// Frame rate the frames were decoded at.
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Number of frames.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Frame dimensions in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }
}

impl OverlayTarget for VideoTarget {
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

        let surface = Surface::new(f64::from(self.dimensions.0), f64::from(self.dimensions.1));
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
            "Compositing {:?} onto {} frame(s), {} worker(s)",
            attrs.text,
            self.frames.len(),
            ctx.workers
        );

        let layer = Arc::new(layer);
        let positions = Arc::new(positions);

        // Tasks composite onto clones; the originals stay in the target so a
        // failed join leaves it unchanged.
        let tasks = self
            .frames
            .iter()
            .cloned()
            .enumerate()
            .map(|(index, mut frame)| {
                let layer = Arc::clone(&layer);
                let positions = Arc::clone(&positions);
                task::spawn_blocking(move || {
                    for coords in positions.iter() {
                        let (pivot_x, pivot_y) = coords.center();
                        let x = (pivot_x - layer.anchor.0).round() as i64;
                        let y = (pivot_y - layer.anchor.1).round() as i64;
                        text::blend_layer(&mut frame, &layer.image, x, y);
                    }
                    (index, frame)
                })
            });

        let mut composited: Vec<(usize, RgbaImage)> = stream::iter(tasks)
            .buffer_unordered(ctx.workers)
            .map(|joined| {
                joined.map_err(|e| WatermarkError::other(format!("Frame task failed: {e}")))
            })
            .try_collect()
            .await?;

        composited.sort_by_key(|(index, _)| *index);
        self.frames = composited.into_iter().map(|(_, frame)| frame).collect();
        Ok(())
    }
}
