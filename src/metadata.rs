//! Video stream metadata.
//!
//! Gathered once when a [`VideoSource`](crate::VideoSource) is opened and
//! fixed for its lifetime.

use std::time::Duration;

/// Facts about the video stream a source decodes from.
///
/// # Example
///
/// ```no_run
/// use stillframe::VideoSource;
///
/// let source = VideoSource::open("input.mp4")?;
/// let metadata = source.metadata();
/// println!("{}x{} [{}]", metadata.width, metadata.height, metadata.codec);
/// # Ok::<(), stillframe::StillframeError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct VideoMetadata {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Average frames per second, `0.0` when the container does not say.
    pub frames_per_second: f64,
    /// Total frame count as reported by the container, or estimated from
    /// duration and frame rate. May be approximate, or `0` when unknown.
    pub frame_count: u64,
    /// Whether `frame_count` is an estimate rather than a container value.
    pub frame_count_estimated: bool,
    /// Container-level duration, `Duration::ZERO` when unknown.
    pub duration: Duration,
    /// Codec name (e.g. `"h264"`, `"mjpeg"`).
    pub codec: String,
    /// Container format name (e.g. `"mov,mp4,m4a,3gp,3g2,mj2"`, `"avi"`).
    pub container: String,
}

/// Pick the frame count: container value when present, else an estimate.
///
/// Returns the count and whether it was estimated.
pub(crate) fn resolve_frame_count(
    reported: i64,
    duration: Duration,
    frames_per_second: f64,
) -> (u64, bool) {
    if reported > 0 {
        return (reported as u64, false);
    }
    if frames_per_second > 0.0 && !duration.is_zero() {
        return ((duration.as_secs_f64() * frames_per_second).round() as u64, true);
    }
    (0, true)
}
