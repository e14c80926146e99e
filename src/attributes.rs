//! Watermark attributes and anchor configuration.
//!
//! This module holds the immutable per-render inputs: what text to draw, how
//! large, which color and opacity, how much to rotate, and where on the
//! surface to anchor it. Attributes are plain data; the fluent setters live
//! on the builders in [`crate::service`].

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WatermarkError};

/// Default margin, in surface units, applied to corner and edge anchors.
pub const DEFAULT_MARGIN: f64 = 10.0;

/// Default spacing, in surface units, between tiled watermark instances.
pub const DEFAULT_TILE_SPACING: f64 = 50.0;

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    /// Red component.
    pub r: u8,
    /// Green component.
    pub g: u8,
    /// Blue component.
    pub b: u8,
}

impl Color {
    /// Create a color from components.
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// White.
    pub fn white() -> Self {
        Self::new(255, 255, 255)
    }

    /// Black.
    pub fn black() -> Self {
        Self::new(0, 0, 0)
    }

    /// Parse a hex color string in `#RGB` or `#RRGGBB` format.
    ///
    /// # Examples
    ///
    /// ```
    /// use aquamark::attributes::Color;
    ///
    /// assert_eq!(Color::parse_hex("#FF0000").unwrap(), Color::new(255, 0, 0));
    /// assert_eq!(Color::parse_hex("#ABC").unwrap(), Color::new(170, 187, 204));
    /// ```
    pub fn parse_hex(hex: &str) -> Result<Self> {
        let digits = hex.strip_prefix('#').ok_or_else(|| {
            WatermarkError::invalid_attribute("color must start with '#'")
        })?;

        let component = |s: &str| {
            u8::from_str_radix(s, 16).map_err(|_| {
                WatermarkError::invalid_attribute(format!("invalid hex digit in color '{hex}'"))
            })
        };

        match digits.len() {
            3 => {
                // #RGB - each digit doubled: 0xF -> 0xFF
                let r = component(&digits[0..1])?;
                let g = component(&digits[1..2])?;
                let b = component(&digits[2..3])?;
                Ok(Self::new(r * 17, g * 17, b * 17))
            }
            6 => {
                let r = component(&digits[0..2])?;
                let g = component(&digits[2..4])?;
                let b = component(&digits[4..6])?;
                Ok(Self::new(r, g, b))
            }
            _ => Err(WatermarkError::invalid_attribute(format!(
                "color must be #RGB or #RRGGBB, got {} digits",
                digits.len()
            ))),
        }
    }
}

impl FromStr for Color {
    type Err = WatermarkError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_hex(s)
    }
}

/// Where watermark content is anchored on a surface.
///
/// Named anchors center the content's bounding box on the reference point;
/// corner and edge anchors are inset by the configured margin. Coordinates
/// follow the raster convention: the origin is the surface's top-left corner
/// and y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    /// Top-left corner, inset by the margin.
    TopLeft,
    /// Top edge midpoint.
    TopCenter,
    /// Top-right corner, inset by the margin.
    TopRight,
    /// Left edge midpoint.
    CenterLeft,
    /// Surface center.
    Center,
    /// Right edge midpoint.
    CenterRight,
    /// Bottom-left corner, inset by the margin.
    BottomLeft,
    /// Bottom edge midpoint.
    BottomCenter,
    /// Bottom-right corner, inset by the margin.
    BottomRight,
    /// Explicit draw-origin coordinates, passed through unchanged.
    ///
    /// No bounds clamping is applied; placing content outside the surface is
    /// permitted and is the caller's responsibility.
    Custom {
        /// X coordinate of the draw origin.
        x: f64,
        /// Y coordinate of the draw origin.
        y: f64,
    },
}

impl Default for Anchor {
    fn default() -> Self {
        Self::Center
    }
}

impl FromStr for Anchor {
    type Err = WatermarkError;

    /// Parse an anchor from a CLI-style string.
    ///
    /// Accepts the nine named positions (`center`, `top-left`, ...) or an
    /// explicit `x,y` pair.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "top-left" => Ok(Self::TopLeft),
            "top-center" => Ok(Self::TopCenter),
            "top-right" => Ok(Self::TopRight),
            "center-left" => Ok(Self::CenterLeft),
            "center" => Ok(Self::Center),
            "center-right" => Ok(Self::CenterRight),
            "bottom-left" => Ok(Self::BottomLeft),
            "bottom-center" => Ok(Self::BottomCenter),
            "bottom-right" => Ok(Self::BottomRight),
            other => {
                let parts: Vec<&str> = other.split(',').map(str::trim).collect();
                if parts.len() == 2
                    && let (Ok(x), Ok(y)) = (parts[0].parse::<f64>(), parts[1].parse::<f64>())
                {
                    return Ok(Self::Custom { x, y });
                }
                Err(WatermarkError::invalid_attribute(format!(
                    "invalid position '{s}'. Must be one of the named positions \
                     (e.g. center, top-left, bottom-right) or an explicit 'x,y' pair"
                )))
            }
        }
    }
}

/// Complete description of a single watermark.
///
/// Immutable input to a render call; the placement engine and the format
/// targets never mutate or retain it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatermarkAttributes {
    /// The watermark text.
    pub text: String,

    /// Font size in surface units (PDF points or raster pixels).
    pub size: f64,

    /// Text color.
    pub color: Color,

    /// Opacity, 0.0 (invisible) to 1.0 (opaque).
    pub opacity: f64,

    /// Rotation in degrees, counter-clockwise. Any integer; normalized
    /// mod 360 by the placement engine. 0 means no rotation step at all.
    pub rotation: i32,

    /// Where to anchor the watermark.
    pub anchor: Anchor,

    /// Margin for corner and edge anchors, in surface units.
    pub margin: f64,

    /// Repeat the watermark in a grid across the whole surface.
    pub tiled: bool,

    /// Spacing between tiled instances, in surface units.
    pub tile_spacing: f64,

    /// Render the trademark glyph next to the main text.
    pub trademark: bool,
}

impl Default for WatermarkAttributes {
    fn default() -> Self {
        Self {
            text: String::new(),
            size: 24.0,
            color: Color::black(),
            opacity: 0.5,
            rotation: 0,
            anchor: Anchor::Center,
            margin: DEFAULT_MARGIN,
            tiled: false,
            tile_spacing: DEFAULT_TILE_SPACING,
            trademark: false,
        }
    }
}

impl WatermarkAttributes {
    /// Create attributes for the given text with default styling.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Validate the attributes.
    ///
    /// # Errors
    ///
    /// Returns [`WatermarkError::InvalidAttribute`] if:
    /// - the text is empty
    /// - the size is not a positive finite number
    /// - the opacity is outside `[0, 1]`
    /// - the margin or tile spacing is negative or non-finite
    pub fn validate(&self) -> Result<()> {
        if self.text.is_empty() {
            return Err(WatermarkError::invalid_attribute(
                "watermark text must not be empty",
            ));
        }
        if !self.size.is_finite() || self.size <= 0.0 {
            return Err(WatermarkError::invalid_attribute(format!(
                "size must be a positive number, got {}",
                self.size
            )));
        }
        if !self.opacity.is_finite() || !(0.0..=1.0).contains(&self.opacity) {
            return Err(WatermarkError::invalid_attribute(format!(
                "opacity must be within [0, 1], got {}",
                self.opacity
            )));
        }
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(WatermarkError::invalid_attribute(format!(
                "margin must be non-negative, got {}",
                self.margin
            )));
        }
        if !self.tile_spacing.is_finite() || self.tile_spacing < 0.0 {
            return Err(WatermarkError::invalid_attribute(format!(
                "tile spacing must be non-negative, got {}",
                self.tile_spacing
            )));
        }
        Ok(())
    }
}
