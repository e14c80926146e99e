//! CLI argument parsing for aquamark.
//!
//! Defines the command-line interface using `clap` and converts parsed
//! arguments into [`WatermarkAttributes`].

use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;

use aquamark::attributes::{Anchor, Color, WatermarkAttributes, DEFAULT_TILE_SPACING};
use aquamark::error::{Result, WatermarkError};

/// Overlay a text watermark onto a PDF or image file.
///
/// aquamark stamps watermark text onto every page of a PDF or onto a
/// raster image, with control over placement, rotation, opacity, tiling,
/// and an optional trademark glyph.
#[derive(Parser, Debug)]
#[command(name = "aquamark")]
#[command(version)]
#[command(about = "Overlay text watermarks onto PDF and image files", long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Input file (PDF or image; format detected from the file signature)
    #[arg(required = true, value_name = "FILE")]
    pub input: PathBuf,

    /// Output file path
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Watermark text
    #[arg(short, long, value_name = "TEXT", required_unless_present = "from_json")]
    pub text: Option<String>,

    /// Read watermark definitions from a JSON file (an array of watermark
    /// objects) instead of the individual flags
    #[arg(long, value_name = "FILE", conflicts_with = "text")]
    pub from_json: Option<PathBuf>,

    /// Font size in points (PDF) or pixels (image)
    #[arg(short, long, value_name = "SIZE", default_value_t = 24.0)]
    pub size: f64,

    /// Text color as #RGB or #RRGGBB
    #[arg(short, long, value_name = "HEX", default_value = "#000000")]
    pub color: String,

    /// Opacity from 0.0 (invisible) to 1.0 (opaque)
    #[arg(long, value_name = "ALPHA", default_value_t = 0.5)]
    pub opacity: f64,

    /// Rotation in degrees, counter-clockwise
    #[arg(short, long, value_name = "DEGREES", default_value_t = 0)]
    pub rotation: i32,

    /// Placement: a named position (center, top-left, bottom-right, ...)
    /// or explicit 'x,y' coordinates
    #[arg(short, long, value_name = "POSITION", default_value = "center")]
    pub position: String,

    /// Margin for corner and edge positions
    #[arg(short, long, value_name = "UNITS", default_value_t = 10.0)]
    pub margin: f64,

    /// Tile the watermark across the surface, with optional spacing
    #[arg(long, value_name = "SPACING", num_args = 0..=1, default_missing_value = "50")]
    pub tiled: Option<f64>,

    /// Append the registered trademark sign after the text
    #[arg(long)]
    pub trademark: bool,

    /// Font file to render with (defaults to a discovered system font)
    #[arg(long, value_name = "FILE")]
    pub font: Option<PathBuf>,

    /// Number of parallel compositing tasks
    #[arg(short = 'j', long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Validate inputs and preview the operation without writing output
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Show detailed information about the operation
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Validate arguments that clap cannot check on its own.
    pub fn validate(&self) -> Result<()> {
        if !self.input.exists() {
            return Err(WatermarkError::file_not_found(self.input.clone()));
        }
        if self.input == self.output {
            return Err(WatermarkError::invalid_attribute(
                "output path must differ from the input path",
            ));
        }
        Ok(())
    }

    /// Convert the parsed arguments into one or more watermark
    /// descriptions.
    ///
    /// With `--from-json` the definitions come from the file; otherwise the
    /// individual flags describe a single watermark.
    pub fn to_watermarks(&self) -> Result<Vec<WatermarkAttributes>> {
        let watermarks = match &self.from_json {
            Some(path) => {
                if !path.exists() {
                    return Err(WatermarkError::file_not_found(path.clone()));
                }
                let json = std::fs::read_to_string(path)?;
                serde_json::from_str::<Vec<WatermarkAttributes>>(&json).map_err(|e| {
                    WatermarkError::invalid_attribute(format!(
                        "invalid watermark JSON in {}: {e}",
                        path.display()
                    ))
                })?
            }
            None => vec![WatermarkAttributes {
                text: self.text.clone().unwrap_or_default(),
                size: self.size,
                color: Color::parse_hex(&self.color)?,
                opacity: self.opacity,
                rotation: self.rotation,
                anchor: Anchor::from_str(&self.position)?,
                margin: self.margin,
                tiled: self.tiled.is_some(),
                tile_spacing: self.tiled.unwrap_or(DEFAULT_TILE_SPACING),
                trademark: self.trademark,
            }],
        };

        if watermarks.is_empty() {
            return Err(WatermarkError::invalid_attribute(
                "watermark JSON must define at least one watermark",
            ));
        }
        for attrs in &watermarks {
            attrs.validate()?;
        }
        Ok(watermarks)
    }
}
