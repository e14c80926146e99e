//! Watermark placement engine.
//!
//! Pure geometry: given a surface size, an anchor, and a content bounding
//! box, resolve where the content goes ([`resolve_position`],
//! [`resolve_tiled`]) and how it is transformed ([`build_transform`],
//! [`trademark_transform`]). Nothing in this module touches fonts, pixels,
//! or PDF objects; format targets consume the resolved [`Coordinates`] and
//! [`Transform`] values.
//!
//! Coordinates are y-down with the origin at the surface's top-left corner.
//! Positive rotation is counter-clockwise as seen by the viewer.
//!
//! # Examples
//!
//! ```
//! use aquamark::attributes::Anchor;
//! use aquamark::placement::{build_transform, resolve_position, Surface};
//!
//! let surface = Surface::new(600.0, 800.0);
//! let coords = resolve_position(surface, Anchor::Center, 200.0, 50.0, 10.0)?;
//! assert_eq!((coords.x, coords.y), (200.0, 375.0));
//!
//! let transform = build_transform(coords, 45);
//! // Rotation pivots on the content center, so the pivot is independent
//! // of the angle.
//! assert_eq!(transform.translation(), (300.0, 400.0));
//! # Ok::<(), aquamark::WatermarkError>(())
//! ```

mod position;
mod transform;

pub use position::{resolve_position, resolve_tiled, Coordinates, Surface};
pub use transform::{build_transform, trademark_transform, Transform};
