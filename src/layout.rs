//! On-disk naming for extracted frames.
//!
//! Frames of one video live in their own directory, named after the video's
//! file stem and placed next to it by default, and are called
//! `frame0.jpg`, `frame1.jpg`, … in decode order.

use std::{
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
};

use crate::error::StillframeError;

/// File name prefix shared by every frame file.
pub const FRAME_PREFIX: &str = "frame";

/// Video extensions the command-line front end accepts.
pub const SUPPORTED_VIDEO_EXTENSIONS: &[&str] = &["avi", "mp4", "mov", "3gp"];

/// `frame<index>.<extension>`.
///
/// ```
/// assert_eq!(stillframe::layout::frame_file_name(7, "jpg"), "frame7.jpg");
/// ```
pub fn frame_file_name(index: u64, extension: &str) -> String {
    format!("{FRAME_PREFIX}{index}.{extension}")
}

/// Whether `path` ends in one of [`SUPPORTED_VIDEO_EXTENSIONS`], ignoring case.
pub fn is_supported_video(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|extension| {
            SUPPORTED_VIDEO_EXTENSIONS
                .iter()
                .any(|supported| supported.eq_ignore_ascii_case(extension))
        })
}

/// Directory frames of `video` go to: `<root>/<video stem>`.
///
/// When `root` is `None` the video's own parent directory is used.
pub fn output_directory_for(video: &Path, root: Option<&Path>) -> Result<PathBuf, StillframeError> {
    let stem = video.file_stem().ok_or_else(|| StillframeError::SourceUnavailable {
        path: video.to_path_buf(),
        reason: "path has no file name".to_string(),
    })?;
    let parent = match root {
        Some(root) => root,
        None => video.parent().unwrap_or_else(|| Path::new(".")),
    };
    Ok(parent.join(stem))
}

/// Frame index encoded in a file name such as `frame12.png`.
pub fn parse_frame_index(file_name: &str) -> Option<u64> {
    let rest = file_name.strip_prefix(FRAME_PREFIX)?;
    let (digits, extension) = rest.split_once('.')?;
    if extension.is_empty() || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Frame files present in `directory`, ordered by frame index.
///
/// Anything not named like a frame file is ignored, which includes
/// temporary files left by an interrupted write.
pub fn list_frames(directory: &Path) -> Result<Vec<PathBuf>, StillframeError> {
    let mut frames = Vec::new();
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        if let Some(index) = name.to_str().and_then(parse_frame_index) {
            frames.push((index, entry.path()));
        }
    }
    frames.sort_by_key(|(index, _)| *index);
    Ok(frames.into_iter().map(|(_, path)| path).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supported_extensions_ignore_case() {
        assert!(is_supported_video(Path::new("clip.MP4")));
        assert!(is_supported_video(Path::new("/tmp/holiday.3gp")));
        assert!(!is_supported_video(Path::new("clip.mkv")));
        assert!(!is_supported_video(Path::new("no_extension")));
    }

    #[test]
    fn output_directory_defaults_next_to_video() {
        let dir = output_directory_for(Path::new("/uploads/cat.mov"), None).unwrap();
        assert_eq!(dir, PathBuf::from("/uploads/cat"));

        let dir = output_directory_for(Path::new("cat.mov"), Some(Path::new("/out"))).unwrap();
        assert_eq!(dir, PathBuf::from("/out/cat"));
    }

    #[test]
    fn parse_frame_index_rejects_other_names() {
        assert_eq!(parse_frame_index("frame0.jpg"), Some(0));
        assert_eq!(parse_frame_index("frame123.png"), Some(123));
        assert_eq!(parse_frame_index("frame.jpg"), None);
        assert_eq!(parse_frame_index("frame1x.jpg"), None);
        assert_eq!(parse_frame_index("frame4."), None);
        assert_eq!(parse_frame_index("thumb1.jpg"), None);
    }
}
