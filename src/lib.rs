//! aquamark - Overlay text watermarks onto PDF, image, and video surfaces.
//!
//! This library provides a fluent builder API for stamping watermarks onto
//! documents and media. It supports:
//!
//! - PDF stamping via appended content streams
//! - Raster image compositing with anti-aliased glyph rendering
//! - Frame-level video watermarking with parallel compositing
//! - Nine-grid and explicit placement, rotation, tiling
//! - Pluggable trademark glyph strategies
//! - Comprehensive error handling
//!
//! # Examples
//!
//! ## Watermark a PDF
//!
//! ```no_run
//! use aquamark::WatermarkService;
//!
//! # async fn example() -> aquamark::Result<()> {
//! let service = WatermarkService::new()?;
//! service
//!     .pdf_file("contract.pdf")
//!     .await?
//!     .text("CONFIDENTIAL")
//!     .size(36.0)
//!     .opacity(0.3)
//!     .rotation(45)
//!     .apply_to_file("contract-stamped.pdf")
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Using Individual Components
//!
//! ```no_run
//! use aquamark::attributes::{Anchor, WatermarkAttributes};
//! use aquamark::placement::{build_transform, resolve_position, Surface};
//! use aquamark::render::{ImageTarget, OverlayTarget, RenderContext};
//!
//! # async fn example() -> aquamark::Result<()> {
//! // Pure placement geometry
//! let surface = Surface::new(600.0, 800.0);
//! let coords = resolve_position(surface, Anchor::Center, 200.0, 50.0, 10.0)?;
//! let transform = build_transform(coords, 45);
//! println!("pivot at {:?}", transform.translation());
//!
//! // Direct target access
//! let mut target = ImageTarget::from_file("photo.png").await?;
//! let ctx = RenderContext::with_system_font()?;
//! target.apply_overlay(&WatermarkAttributes::new("DRAFT"), &ctx).await?;
//! target.save("photo-stamped.png").await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod attributes;
pub mod error;
pub mod fonts;
pub mod placement;
pub mod render;
pub mod service;

// Re-export commonly used types
pub use attributes::{Anchor, Color, WatermarkAttributes};
pub use error::{Result, WatermarkError};
pub use service::{WatermarkBuilder, WatermarkService};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
