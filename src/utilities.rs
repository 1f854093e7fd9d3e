//! Internal helpers for pixel copying and timestamp conversion.

use std::time::Duration;

use ffmpeg_next::{Rational, frame::Video as VideoFrame};

/// Copy an RGB24 plane into a tightly-packed buffer.
///
/// FFmpeg pads rows to its alignment, so the stride is often wider than
/// `width * 3`. The result can go straight into [`image::RgbImage::from_raw`].
pub(crate) fn frame_to_rgb_buffer(video_frame: &VideoFrame, width: u32, height: u32) -> Vec<u8> {
    let stride = video_frame.stride(0);
    let row_bytes = width as usize * 3;
    let rows = height as usize;
    let data = video_frame.data(0);

    if stride == row_bytes {
        return data[..row_bytes * rows].to_vec();
    }

    let mut buffer = Vec::with_capacity(row_bytes * rows);
    for row in data.chunks(stride).take(rows) {
        buffer.extend_from_slice(&row[..row_bytes]);
    }
    buffer
}

/// Stream-time-base PTS to a wall-clock offset. Negative PTS maps to `None`.
pub(crate) fn pts_to_duration(pts: i64, time_base: Rational) -> Option<Duration> {
    if pts < 0 || time_base.denominator() == 0 {
        return None;
    }
    let seconds = pts as f64 * time_base.numerator() as f64 / time_base.denominator() as f64;
    Some(Duration::from_secs_f64(seconds))
}

/// Frame rate as a float, `0.0` when the rational is degenerate.
pub(crate) fn rational_to_f64(rate: Rational) -> f64 {
    if rate.denominator() == 0 {
        0.0
    } else {
        rate.numerator() as f64 / rate.denominator() as f64
    }
}
