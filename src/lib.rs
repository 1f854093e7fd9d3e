//! # stillframe
//!
//! Split a video into numbered still images while exposing a completion
//! percentage that other threads can poll.
//!
//! Decoding goes through FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate and encoding
//! through [`image`](https://crates.io/crates/image).
//!
//! ## Quick Start
//!
//! ```no_run
//! use stillframe::{ExtractOptions, StillframeError};
//!
//! let options = ExtractOptions::new();
//! let written = stillframe::extract_video("upload/cat.mp4", "upload/cat", &options)?;
//! println!("{written} frames, {}", options.progress().label());
//! # Ok::<(), StillframeError>(())
//! ```
//!
//! The output directory then holds `frame0.jpg`, `frame1.jpg`, … in decode
//! order.
//!
//! ## Pieces
//!
//! - [`VideoSource`]: an opened video, decoded one frame at a time
//! - [`FrameExtractor`]: the sequential write loop, generic over any
//!   [`FrameSource`]
//! - [`ProgressReporter`]: shared last-write-wins percentage
//! - [`CancellationToken`]: stop a run between frames
//! - [`layout`]: file and directory naming
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on the system.

pub mod configuration;
pub mod error;
pub mod extractor;
pub mod ffmpeg;
pub mod layout;
pub mod metadata;
pub mod progress;
pub mod source;
mod utilities;

pub use configuration::{DEFAULT_JPEG_QUALITY, ExtractOptions, OutputFormat};
pub use error::StillframeError;
pub use extractor::{FrameExtractor, extract_video, extract_video_beside};
pub use metadata::VideoMetadata;
pub use progress::{CancellationToken, ProgressReporter};
pub use source::{Frame, FrameSource, VideoSource};
