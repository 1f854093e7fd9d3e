//! Error types for the `stillframe` crate.
//!
//! [`StillframeError`] is returned by every fallible operation. Running out
//! of frames is not an error: [`FrameSource::next_frame`](crate::FrameSource::next_frame)
//! reports it as `Ok(None)`.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `stillframe` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StillframeError {
    /// The video could not be opened or has nothing decodable in it.
    ///
    /// No frames are written when a run fails this way.
    #[error("Video source unavailable at {path}: {reason}")]
    SourceUnavailable {
        /// Path that was passed to [`crate::VideoSource::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// A frame could not be decoded or converted.
    #[error("Failed to decode video frame: {0}")]
    VideoDecodeError(String),

    /// A run aborted part-way through.
    ///
    /// Frames `0..frames_written` are left on disk.
    #[error("Frame extraction failed after {frames_written} frame(s): {source}")]
    ExtractionFailed {
        /// Number of frames fully written before the failure.
        frames_written: u64,
        /// What went wrong with the next frame.
        #[source]
        source: Box<StillframeError>,
    },

    /// The run was stopped through a [`CancellationToken`](crate::CancellationToken).
    #[error("Extraction cancelled after {frames_written} frame(s)")]
    Cancelled {
        /// Number of frames fully written before cancellation was observed.
        frames_written: u64,
    },

    /// The requested output extension does not map to a writable image format.
    #[error("Unsupported output image format: {0}")]
    UnsupportedImageFormat(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate while encoding a frame.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),
}

impl StillframeError {
    /// Number of frames written before the run stopped, for run-level errors.
    pub fn frames_written(&self) -> Option<u64> {
        match self {
            StillframeError::ExtractionFailed { frames_written, .. }
            | StillframeError::Cancelled { frames_written } => Some(*frames_written),
            _ => None,
        }
    }
}

impl From<FfmpegError> for StillframeError {
    fn from(error: FfmpegError) -> Self {
        StillframeError::FfmpegError(error.to_string())
    }
}
