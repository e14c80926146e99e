//! Format targets: the rendering side of the crate.
//!
//! Every supported surface kind implements [`OverlayTarget`], the single
//! seam between the fluent builder and format-specific compositing. The
//! placement engine stays pure; targets translate resolved coordinates and
//! transforms into content-stream operations or pixel writes.

mod image;
mod pdf;
mod text;
mod trademark;
mod video;

pub use self::image::ImageTarget;
pub use self::pdf::PdfTarget;
pub use self::trademark::{DefaultTrademarkStrategy, TrademarkRegistry, TrademarkStrategy};
pub use self::video::VideoTarget;

use crate::attributes::WatermarkAttributes;
use crate::error::Result;
use crate::fonts::FontLibrary;

/// Default number of concurrent frame-composite tasks.
pub const DEFAULT_WORKERS: usize = 4;

/// Shared state handed to every overlay application.
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// Font used for measurement and raster glyph rendering.
    pub fonts: FontLibrary,
    /// Bound on concurrent composite tasks (video frames).
    pub workers: usize,
    /// Trademark strategies, evaluated in ascending priority order.
    pub trademarks: TrademarkRegistry,
}

impl RenderContext {
    /// Create a context with the given font and default worker count.
    pub fn new(fonts: FontLibrary) -> Self {
        Self {
            fonts,
            workers: DEFAULT_WORKERS,
            trademarks: TrademarkRegistry::with_defaults(),
        }
    }

    /// Create a context discovering a system font.
    pub fn with_system_font() -> Result<Self> {
        Ok(Self::new(FontLibrary::discover()?))
    }

    /// Set the concurrent task bound.
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }
}

/// A surface that watermarks can be overlaid onto.
///
/// Implementations render one [`WatermarkAttributes`] description per call;
/// the builder invokes this once per chained watermark.
pub trait OverlayTarget {
    /// Overlay a single watermark onto this target.
    fn apply_overlay(
        &mut self,
        attrs: &WatermarkAttributes,
        ctx: &RenderContext,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}
