//! Sequential frame sources.
//!
//! [`FrameSource`] is what the extractor pulls frames from. [`VideoSource`]
//! is the FFmpeg-backed implementation: it owns the demuxer, the decoder and
//! the pixel-format converter, and frees all of them when dropped.
//!
//! # Example
//!
//! ```no_run
//! use stillframe::{FrameSource, VideoSource};
//!
//! let mut source = VideoSource::open("input.mp4")?;
//! println!("about {} frames", source.total_frame_count());
//!
//! while let Some(frame) = source.next_frame()? {
//!     println!("{}x{}", frame.image.width(), frame.image.height());
//! }
//! # Ok::<(), stillframe::StillframeError>(())
//! ```

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    time::Duration,
};

use ffmpeg_next::{
    Error as FfmpegError, Packet, Rational,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
    util::error::EAGAIN,
};
use image::{DynamicImage, RgbImage};

use crate::{
    error::StillframeError,
    metadata::{VideoMetadata, resolve_frame_count},
};

/// Consecutive demuxer read errors tolerated before giving up.
const MAX_READ_ERRORS: u32 = 32;

/// One decoded picture, handed to the extractor and then dropped.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Decoded pixels.
    pub image: DynamicImage,
    /// Presentation time, when the stream carries one.
    pub timestamp: Option<Duration>,
}

impl Frame {
    /// Wrap an image with no timestamp.
    pub fn new(image: DynamicImage) -> Self {
        Self {
            image,
            timestamp: None,
        }
    }
}

/// Something that yields frames in decode order, once.
///
/// There is no rewind: once [`next_frame`](FrameSource::next_frame) has
/// returned `Ok(None)` or an error, the source is exhausted.
pub trait FrameSource {
    /// Total frame count reported by the source.
    ///
    /// May be approximate, or `0` when unknown. Queried once per run.
    fn total_frame_count(&self) -> u64;

    /// Decode the next frame.
    ///
    /// Returns `Ok(None)` at end of stream.
    fn next_frame(&mut self) -> Result<Option<Frame>, StillframeError>;
}

impl<S: FrameSource + ?Sized> FrameSource for &mut S {
    fn total_frame_count(&self) -> u64 {
        (**self).total_frame_count()
    }

    fn next_frame(&mut self) -> Result<Option<Frame>, StillframeError> {
        (**self).next_frame()
    }
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn total_frame_count(&self) -> u64 {
        (**self).total_frame_count()
    }

    fn next_frame(&mut self) -> Result<Option<Frame>, StillframeError> {
        (**self).next_frame()
    }
}

/// A video file opened for sequential decoding.
///
/// All FFmpeg handles belong to this value and are released when it is
/// dropped, including when a run stops early on an error.
pub struct VideoSource {
    input_context: Input,
    decoder: VideoDecoder,
    scaler: Option<ScalingContext>,
    video_stream_index: usize,
    time_base: Rational,
    metadata: VideoMetadata,
    decoded_frame: VideoFrame,
    rgb_frame: VideoFrame,
    consecutive_read_errors: u32,
    eof_sent: bool,
    done: bool,
    path: PathBuf,
}

impl Debug for VideoSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("VideoSource")
            .field("path", &self.path)
            .field("video_stream_index", &self.video_stream_index)
            .field("metadata", &self.metadata)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl VideoSource {
    /// Open `path` and prepare its best video stream for decoding.
    ///
    /// # Errors
    ///
    /// [`StillframeError::SourceUnavailable`] if the file is missing, cannot
    /// be demuxed, has no video stream, or its codec cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StillframeError> {
        let path = path.as_ref();
        let unavailable = |reason: String| StillframeError::SourceUnavailable {
            path: path.to_path_buf(),
            reason,
        };

        log::debug!("Opening video source: {}", path.display());

        if !path.is_file() {
            return Err(unavailable("no such file".to_string()));
        }

        crate::ffmpeg::init()
            .map_err(|error| unavailable(format!("FFmpeg initialisation failed: {error}")))?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| unavailable(error.to_string()))?;

        let stream = input_context
            .streams()
            .best(Type::Video)
            .ok_or_else(|| unavailable("no video stream".to_string()))?;
        let video_stream_index = stream.index();
        let time_base = stream.time_base();
        let reported_frames = stream.frames();

        let frames_per_second = {
            let average = crate::utilities::rational_to_f64(stream.avg_frame_rate());
            if average > 0.0 {
                average
            } else {
                crate::utilities::rational_to_f64(stream.rate())
            }
        };

        let decoder = CodecContext::from_parameters(stream.parameters())
            .and_then(|context| context.decoder().video())
            .map_err(|error| unavailable(format!("cannot open video decoder: {error}")))?;

        let duration = match input_context.duration() {
            microseconds if microseconds > 0 => Duration::from_micros(microseconds as u64),
            _ => Duration::ZERO,
        };

        let (frame_count, frame_count_estimated) =
            resolve_frame_count(reported_frames, duration, frames_per_second);
        if frame_count == 0 {
            log::warn!(
                "{} does not report a frame count; progress will not be estimated",
                path.display()
            );
        } else if frame_count_estimated {
            log::debug!("Estimated {frame_count} frames from duration and frame rate");
        }

        let metadata = VideoMetadata {
            width: decoder.width(),
            height: decoder.height(),
            frames_per_second,
            frame_count,
            frame_count_estimated,
            duration,
            codec: decoder
                .codec()
                .map(|codec| codec.name().to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            container: input_context.format().name().to_string(),
        };

        Ok(Self {
            input_context,
            decoder,
            scaler: None,
            video_stream_index,
            time_base,
            metadata,
            decoded_frame: VideoFrame::empty(),
            rgb_frame: VideoFrame::empty(),
            consecutive_read_errors: 0,
            eof_sent: false,
            done: false,
            path: path.to_path_buf(),
        })
    }

    /// Stream metadata captured at open time.
    pub fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    /// The path this source was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Convert the frame sitting in `decoded_frame` to an RGB image.
    fn convert_decoded_frame(&mut self) -> Result<Frame, StillframeError> {
        let format = self.decoded_frame.format();
        let width = self.decoded_frame.width();
        let height = self.decoded_frame.height();

        let stale = self.scaler.as_ref().is_none_or(|scaler| {
            let input = scaler.input();
            input.format != format || input.width != width || input.height != height
        });
        if stale {
            let scaler = ScalingContext::get(
                format,
                width,
                height,
                Pixel::RGB24,
                width,
                height,
                ScalingFlags::BILINEAR,
            )?;
            self.scaler = Some(scaler);
        }

        if let Some(scaler) = self.scaler.as_mut() {
            scaler.run(&self.decoded_frame, &mut self.rgb_frame)?;
        }

        let buffer = crate::utilities::frame_to_rgb_buffer(&self.rgb_frame, width, height);
        let image = RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
            StillframeError::VideoDecodeError(
                "Failed to construct RGB image from decoded frame data".to_string(),
            )
        })?;

        let timestamp = self
            .decoded_frame
            .pts()
            .and_then(|pts| crate::utilities::pts_to_duration(pts, self.time_base));

        Ok(Frame {
            image: DynamicImage::ImageRgb8(image),
            timestamp,
        })
    }

    /// Feed the decoder one more packet, or EOF once the demuxer is drained.
    fn feed_decoder(&mut self) -> Result<(), StillframeError> {
        let mut packet = Packet::empty();
        match packet.read(&mut self.input_context) {
            Ok(()) => {
                self.consecutive_read_errors = 0;
                if packet.stream() == self.video_stream_index {
                    self.decoder.send_packet(&packet).map_err(|error| {
                        StillframeError::VideoDecodeError(format!("decoder rejected packet: {error}"))
                    })?;
                }
                Ok(())
            }
            Err(FfmpegError::Eof) => {
                self.decoder.send_eof()?;
                self.eof_sent = true;
                Ok(())
            }
            Err(error) => {
                self.consecutive_read_errors += 1;
                log::warn!("Skipping unreadable packet: {error}");
                if self.consecutive_read_errors >= MAX_READ_ERRORS {
                    return Err(StillframeError::VideoDecodeError(format!(
                        "demuxer failed {MAX_READ_ERRORS} times in a row: {error}"
                    )));
                }
                Ok(())
            }
        }
    }
}

impl FrameSource for VideoSource {
    fn total_frame_count(&self) -> u64 {
        self.metadata.frame_count
    }

    fn next_frame(&mut self) -> Result<Option<Frame>, StillframeError> {
        if self.done {
            return Ok(None);
        }

        loop {
            match self.decoder.receive_frame(&mut self.decoded_frame) {
                Ok(()) => {
                    return match self.convert_decoded_frame() {
                        Ok(frame) => Ok(Some(frame)),
                        Err(error) => {
                            self.done = true;
                            Err(error)
                        }
                    };
                }
                Err(error) => match classify_receive_error(error) {
                    ReceiveOutcome::NeedsInput => {}
                    ReceiveOutcome::Drained => {
                        self.done = true;
                        return Ok(None);
                    }
                    ReceiveOutcome::Failed(error) => {
                        self.done = true;
                        return Err(error);
                    }
                },
            }

            // Nothing buffered in the decoder.
            if self.eof_sent {
                self.done = true;
                return Ok(None);
            }

            if let Err(error) = self.feed_decoder() {
                self.done = true;
                return Err(error);
            }
        }
    }
}

/// What a failed `receive_frame` means for the decode loop.
#[derive(Debug)]
pub(crate) enum ReceiveOutcome {
    /// The decoder wants another packet before it can produce a frame.
    NeedsInput,
    /// The decoder has been flushed and holds no more frames.
    Drained,
    /// The frame could not be decoded.
    Failed(StillframeError),
}

pub(crate) fn classify_receive_error(error: FfmpegError) -> ReceiveOutcome {
    match error {
        FfmpegError::Other { errno } if errno == EAGAIN => ReceiveOutcome::NeedsInput,
        FfmpegError::Eof => ReceiveOutcome::Drained,
        error => ReceiveOutcome::Failed(StillframeError::VideoDecodeError(error.to_string())),
    }
}
