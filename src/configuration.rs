//! Extraction configuration.
//!
//! [`ExtractOptions`] is a builder that threads the output image format,
//! the progress reporter, and an optional cancellation token through an
//! extraction run.
//!
//! # Example
//!
//! ```
//! use stillframe::{CancellationToken, ExtractOptions, OutputFormat, ProgressReporter};
//!
//! let reporter = ProgressReporter::new();
//! let token = CancellationToken::new();
//! let options = ExtractOptions::new()
//!     .with_output_format(OutputFormat::Png)
//!     .with_progress(reporter.clone())
//!     .with_cancellation(token.clone());
//!
//! assert_eq!(options.output_format().extension(), "png");
//! ```

use std::str::FromStr;

use image::ImageFormat;

use crate::{
    error::StillframeError,
    progress::{CancellationToken, ProgressReporter},
};

/// Default JPEG quality, matching what OpenCV's `imwrite` uses.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Still-image format frames are written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Baseline JPEG. This is the default.
    #[default]
    Jpeg,
    /// Lossless PNG.
    Png,
    /// Uncompressed BMP.
    Bmp,
    /// Uncompressed TIFF.
    Tiff,
}

impl OutputFormat {
    /// File extension used for frame files, without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::Bmp => "bmp",
            OutputFormat::Tiff => "tiff",
        }
    }

    /// Parse an extension such as `"jpg"`, `".PNG"` or `"tif"`.
    pub fn from_extension(extension: &str) -> Result<Self, StillframeError> {
        let cleaned = extension.trim().trim_start_matches('.');
        match ImageFormat::from_extension(cleaned) {
            Some(ImageFormat::Jpeg) => Ok(OutputFormat::Jpeg),
            Some(ImageFormat::Png) => Ok(OutputFormat::Png),
            Some(ImageFormat::Bmp) => Ok(OutputFormat::Bmp),
            Some(ImageFormat::Tiff) => Ok(OutputFormat::Tiff),
            _ => Err(StillframeError::UnsupportedImageFormat(cleaned.to_string())),
        }
    }

    pub(crate) fn to_image_format(self) -> ImageFormat {
        match self {
            OutputFormat::Jpeg => ImageFormat::Jpeg,
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::Bmp => ImageFormat::Bmp,
            OutputFormat::Tiff => ImageFormat::Tiff,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = StillframeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::from_extension(value)
    }
}

/// Settings for one extraction run.
///
/// A default-constructed value writes JPEG frames at quality
/// [`DEFAULT_JPEG_QUALITY`], reports into a fresh [`ProgressReporter`], and
/// is never cancelled.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub(crate) output_format: OutputFormat,
    pub(crate) jpeg_quality: u8,
    pub(crate) progress: ProgressReporter,
    pub(crate) cancellation: Option<CancellationToken>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self {
            output_format: OutputFormat::default(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            progress: ProgressReporter::new(),
            cancellation: None,
        }
    }

    /// Choose the image format frames are written in.
    #[must_use]
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// JPEG quality, clamped to `1..=100`. Ignored for other formats.
    #[must_use]
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    /// Report into an existing reporter so callers can poll it.
    #[must_use]
    pub fn with_progress(mut self, reporter: ProgressReporter) -> Self {
        self.progress = reporter;
        self
    }

    /// Attach a cancellation token.
    ///
    /// When the token is cancelled the run stops before the next frame and
    /// returns [`StillframeError::Cancelled`].
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Output image format.
    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    /// JPEG quality in `1..=100`.
    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    /// The reporter this run writes into.
    pub fn progress(&self) -> &ProgressReporter {
        &self.progress
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }
}
