//! The frame extraction loop.
//!
//! [`FrameExtractor::run`] pulls every frame out of a [`FrameSource`], writes
//! each one to `frame<N>.<ext>` in the output directory, and updates the
//! [`ProgressReporter`] after each write. A run is a single sequential pass
//! on the calling thread.
//!
//! Each frame is encoded into a temporary file in the output directory and
//! renamed into place, so a failed run never leaves a truncated frame file
//! behind. Frames written before the failure stay where they are.
//!
//! There is no timeout on decoding: a decoder that stalls stalls the run.

use std::{
    fs,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    time::Instant,
};

use image::{DynamicImage, codecs::jpeg::JpegEncoder};

use crate::{
    configuration::{ExtractOptions, OutputFormat},
    error::StillframeError,
    layout::frame_file_name,
    progress::{ProgressReporter, completion_percentage},
    source::{Frame, FrameSource, VideoSource},
};

/// Writes every frame of a source to disk.
///
/// # Example
///
/// ```no_run
/// use stillframe::{ExtractOptions, FrameExtractor, VideoSource};
///
/// let extractor = FrameExtractor::new(ExtractOptions::new());
/// let source = VideoSource::open("input.mp4")?;
/// let written = extractor.run(source, "frames")?;
/// println!("{written} frames, progress {}", extractor.progress().label());
/// # Ok::<(), stillframe::StillframeError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct FrameExtractor {
    options: ExtractOptions,
}

impl FrameExtractor {
    /// Create an extractor with the given settings.
    pub fn new(options: ExtractOptions) -> Self {
        Self { options }
    }

    /// Settings this extractor runs with.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// The reporter every run of this extractor writes into.
    pub fn progress(&self) -> &ProgressReporter {
        &self.options.progress
    }

    /// Drain `source` into `output_directory`, returning the frame count.
    ///
    /// The directory is created if needed. The reporter is reset to 0 before
    /// the first frame; after frame `i` of `T` it holds `round(i / T * 100)`,
    /// and it is set to 100 when the run completes. When the source reports
    /// `T = 0` the reporter is left at 0 for the whole run.
    ///
    /// The source is consumed and dropped before this returns, whatever
    /// the outcome.
    ///
    /// # Errors
    ///
    /// - [`StillframeError::ExtractionFailed`] if the directory cannot be
    ///   created, or a frame cannot be decoded, encoded or written. It
    ///   carries the number of frames already on disk.
    /// - [`StillframeError::Cancelled`] if the configured token was
    ///   cancelled.
    pub fn run<S, P>(&self, mut source: S, output_directory: P) -> Result<u64, StillframeError>
    where
        S: FrameSource,
        P: AsRef<Path>,
    {
        let output_directory = output_directory.as_ref();
        let progress = &self.options.progress;
        let extension = self.options.output_format.extension();
        let started = Instant::now();

        progress.reset();
        let total_frames = source.total_frame_count();
        log::debug!(
            "Extracting into {} ({} frames expected)",
            output_directory.display(),
            total_frames
        );

        fs::create_dir_all(output_directory).map_err(|error| failed(0, error.into()))?;

        let mut frames_written: u64 = 0;
        loop {
            if self.options.is_cancelled() {
                log::debug!("Extraction cancelled after {frames_written} frame(s)");
                return Err(StillframeError::Cancelled { frames_written });
            }

            let frame = match source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(error) => {
                    log::warn!("Decoding frame {frames_written} failed: {error}");
                    return Err(failed(frames_written, error));
                }
            };

            let path = output_directory.join(frame_file_name(frames_written, extension));
            if let Err(error) = self.write_frame(&frame, &path) {
                log::warn!("Writing {} failed: {error}", path.display());
                return Err(failed(frames_written, error));
            }
            log::trace!("Wrote {} ({:?})", path.display(), frame.timestamp);

            frames_written += 1;
            if let Some(percentage) = completion_percentage(frames_written, total_frames) {
                progress.set(percentage);
            }
        }

        drop(source);

        if total_frames > 0 {
            progress.set(100);
        }
        if total_frames != frames_written {
            log::debug!("Source reported {total_frames} frames but yielded {frames_written}");
        }
        log::debug!(
            "Extracted {frames_written} frame(s) in {:.2?}",
            started.elapsed()
        );

        Ok(frames_written)
    }

    /// Encode `frame` next to `path` and rename it into place.
    fn write_frame(&self, frame: &Frame, path: &Path) -> Result<(), StillframeError> {
        let directory = path.parent().unwrap_or_else(|| Path::new("."));
        let mut staging = tempfile::Builder::new()
            .prefix(".frame")
            .suffix(".part")
            .tempfile_in(directory)?;

        {
            let mut writer = BufWriter::new(staging.as_file_mut());
            self.encode(&frame.image, &mut writer)?;
            writer.flush()?;
        }

        staging.persist(path).map_err(|error| error.error)?;
        Ok(())
    }

    fn encode<W>(&self, image: &DynamicImage, writer: &mut W) -> Result<(), StillframeError>
    where
        W: Write + std::io::Seek,
    {
        match self.options.output_format {
            OutputFormat::Jpeg => {
                let encoder = JpegEncoder::new_with_quality(writer, self.options.jpeg_quality);
                if image.color().has_alpha() {
                    DynamicImage::ImageRgb8(image.to_rgb8()).write_with_encoder(encoder)?;
                } else {
                    image.write_with_encoder(encoder)?;
                }
            }
            format => image.write_to(writer, format.to_image_format())?,
        }
        Ok(())
    }
}

fn failed(frames_written: u64, source: StillframeError) -> StillframeError {
    StillframeError::ExtractionFailed {
        frames_written,
        source: Box::new(source),
    }
}

/// Open `input` and extract all of its frames into `output_directory`.
///
/// The reporter in `options` is reset before the video is opened, so a
/// poller never sees the previous run's 100% while the new one starts.
///
/// # Errors
///
/// [`StillframeError::SourceUnavailable`] if the video cannot be opened,
/// otherwise anything [`FrameExtractor::run`] returns.
pub fn extract_video<P, Q>(
    input: P,
    output_directory: Q,
    options: &ExtractOptions,
) -> Result<u64, StillframeError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    options.progress.reset();
    let source = VideoSource::open(input)?;
    FrameExtractor::new(options.clone()).run(source, output_directory)
}

/// Like [`extract_video`], writing into [`output_directory_for`](crate::layout::output_directory_for)
/// the input. Returns the directory and the frame count.
pub fn extract_video_beside<P: AsRef<Path>>(
    input: P,
    options: &ExtractOptions,
) -> Result<(PathBuf, u64), StillframeError> {
    let input = input.as_ref();
    let directory = crate::layout::output_directory_for(input, None)?;
    let written = extract_video(input, &directory, options)?;
    Ok((directory, written))
}
