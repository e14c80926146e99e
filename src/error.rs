//! Error types for aquamark.
//!
//! All fallible operations in this crate return [`WatermarkError`]. Placement
//! failures are always synchronous validation errors; format-layer failures
//! (unreadable PDF, undecodable image) carry the underlying reason so callers
//! can report something actionable.

use std::io;
use std::path::PathBuf;

/// Result type alias for aquamark operations.
pub type Result<T> = std::result::Result<T, WatermarkError>;

/// Main error type for aquamark operations.
#[derive(Debug, thiserror::Error)]
pub enum WatermarkError {
    /// Watermark attributes or placement inputs failed validation.
    ///
    /// Raised for non-positive surface dimensions, negative content
    /// dimensions, empty watermark text, out-of-range opacity, and similar
    /// malformed inputs. Never retried; the single render request aborts.
    #[error("Invalid watermark attribute: {message}")]
    InvalidAttribute {
        /// Description of the invalid input.
        message: String,
    },

    /// Input file was not found.
    #[error("File not found: {path}")]
    FileNotFound {
        /// Path to the file that was not found.
        path: PathBuf,
    },

    /// Failed to load a PDF document.
    #[error("Failed to load PDF: {path}\n  Reason: {reason}")]
    FailedToLoadPdf {
        /// Path to the PDF file.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// Failed to decode an image.
    #[error("Failed to decode image: {reason}")]
    ImageDecode {
        /// Reason for the failure.
        reason: String,
    },

    /// Input bytes are not in a supported image format.
    #[error(
        "Unsupported image format\n  Hint: supported formats are PNG, JPEG, GIF, WebP, BMP and TIFF"
    )]
    UnsupportedImageFormat,

    /// No usable font could be loaded.
    #[error("No usable font: {reason}")]
    FontUnavailable {
        /// Why font loading failed.
        reason: String,
    },

    /// Glyph rasterization or compositing failed.
    #[error("Failed to render watermark: {reason}")]
    RenderFailed {
        /// Details about the failure.
        reason: String,
    },

    /// Failed to write the output file.
    #[error("Failed to write output: {path}\n  Reason: {source}")]
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error surfaced by the PDF library.
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// Error surfaced by the image library.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl WatermarkError {
    /// Create an InvalidAttribute error.
    pub fn invalid_attribute(message: impl Into<String>) -> Self {
        Self::InvalidAttribute {
            message: message.into(),
        }
    }

    /// Create a FileNotFound error.
    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    /// Create a FailedToLoadPdf error.
    pub fn failed_to_load_pdf(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::FailedToLoadPdf {
            path,
            reason: reason.into(),
        }
    }

    /// Create an ImageDecode error.
    pub fn image_decode(reason: impl Into<String>) -> Self {
        Self::ImageDecode {
            reason: reason.into(),
        }
    }

    /// Create a FontUnavailable error.
    pub fn font_unavailable(reason: impl Into<String>) -> Self {
        Self::FontUnavailable {
            reason: reason.into(),
        }
    }

    /// Create a RenderFailed error.
    pub fn render_failed(reason: impl Into<String>) -> Self {
        Self::RenderFailed {
            reason: reason.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Check if this error came from input validation rather than I/O.
    ///
    /// Validation errors are never worth retrying with the same inputs.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidAttribute { .. } | Self::UnsupportedImageFormat
        )
    }

    /// Get the exit code for this error.
    ///
    /// Returns the appropriate process exit code based on error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidAttribute { .. } => 1,
            Self::FileNotFound { .. } => 2,
            Self::FailedToLoadPdf { .. } => 3,
            Self::ImageDecode { .. } => 3,
            Self::UnsupportedImageFormat => 3,
            Self::FontUnavailable { .. } => 4,
            Self::RenderFailed { .. } => 6,
            Self::FailedToWrite { .. } => 5,
            Self::Io(_) => 5,
            Self::Pdf(_) => 3,
            Self::Image(_) => 3,
            Self::Other { .. } => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_attribute_display() {
        let err = WatermarkError::invalid_attribute("opacity must be within [0, 1]");
        let msg = format!("{err}");
        assert!(msg.contains("Invalid watermark attribute"));
        assert!(msg.contains("opacity"));
    }

    #[test]
    fn test_file_not_found_display() {
        let err = WatermarkError::file_not_found(PathBuf::from("/tmp/missing.pdf"));
        let msg = format!("{err}");
        assert!(msg.contains("File not found"));
        assert!(msg.contains("missing.pdf"));
    }

    #[test]
    fn test_failed_to_load_pdf_display() {
        let err =
            WatermarkError::failed_to_load_pdf(PathBuf::from("bad.pdf"), "Invalid PDF header");
        let msg = format!("{err}");
        assert!(msg.contains("Failed to load PDF"));
        assert!(msg.contains("bad.pdf"));
        assert!(msg.contains("Invalid PDF header"));
    }

    #[test]
    fn test_unsupported_format_hint() {
        let msg = format!("{}", WatermarkError::UnsupportedImageFormat);
        assert!(msg.contains("Hint")); // Helpful hint
        assert!(msg.contains("PNG"));
    }

    #[test]
    fn test_is_validation() {
        assert!(WatermarkError::invalid_attribute("bad").is_validation());
        assert!(WatermarkError::UnsupportedImageFormat.is_validation());
        assert!(!WatermarkError::file_not_found(PathBuf::from("x")).is_validation());
        assert!(!WatermarkError::render_failed("oops").is_validation());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(WatermarkError::invalid_attribute("x").exit_code(), 1);
        assert_eq!(
            WatermarkError::file_not_found(PathBuf::from("x")).exit_code(),
            2
        );
        assert_eq!(
            WatermarkError::failed_to_load_pdf(PathBuf::from("x"), "e").exit_code(),
            3
        );
        assert_eq!(WatermarkError::font_unavailable("none").exit_code(), 4);
    }

    #[test]
    fn test_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "not found");
        let err: WatermarkError = io_err.into();
        assert!(matches!(err, WatermarkError::Io(_)));
    }

    #[test]
    fn test_builder_methods() {
        let err = WatermarkError::render_failed("glyph outline missing");
        assert!(matches!(err, WatermarkError::RenderFailed { .. }));

        let err = WatermarkError::other("generic error");
        assert!(matches!(err, WatermarkError::Other { .. }));
    }
}
