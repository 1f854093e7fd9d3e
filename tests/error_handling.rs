//! Error handling integration tests.
//!
//! These check that opening bad input fails with `SourceUnavailable` before
//! anything is written, and that run-level errors carry their frame count.

use std::error::Error as _;

use stillframe::{ExtractOptions, ProgressReporter, StillframeError, VideoSource};

#[test]
fn open_nonexistent_file() {
    let result = VideoSource::open("this_file_does_not_exist.mp4");

    match result {
        Err(StillframeError::SourceUnavailable { path, .. }) => {
            assert_eq!(path.to_str(), Some("this_file_does_not_exist.mp4"));
        }
        other => panic!("Expected SourceUnavailable, got: {other:?}"),
    }
}

#[test]
fn open_invalid_file() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let invalid_file_path = temporary_directory.path().join("invalid.mp4");
    std::fs::write(&invalid_file_path, b"this is not a media file")
        .expect("Failed to write invalid file");

    let error = VideoSource::open(&invalid_file_path).expect_err("Expected error for garbage");
    assert!(
        matches!(error, StillframeError::SourceUnavailable { .. }),
        "Got: {error}"
    );
    assert!(error.to_string().contains("Video source unavailable"));
}

#[test]
fn extract_video_unavailable_writes_nothing() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output = temporary_directory.path().join("frames");
    let reporter = ProgressReporter::new();
    reporter.set(100);

    let options = ExtractOptions::new().with_progress(reporter.clone());
    let result = stillframe::extract_video("missing.mov", &output, &options);

    assert!(matches!(result, Err(StillframeError::SourceUnavailable { .. })));
    assert!(!output.exists(), "No output directory for an unopenable source");
    assert_eq!(reporter.get(), 0, "A new run resets stale progress");
}

#[test]
fn extraction_failed_exposes_source() {
    let error = StillframeError::ExtractionFailed {
        frames_written: 7,
        source: Box::new(StillframeError::VideoDecodeError("corrupt slice".to_string())),
    };

    assert_eq!(error.frames_written(), Some(7));
    let message = error.to_string();
    assert!(message.contains("after 7 frame(s)"), "{message}");
    assert!(message.contains("corrupt slice"), "{message}");
    assert!(error.source().is_some());
}

#[test]
fn frames_written_absent_for_open_errors() {
    let error = StillframeError::UnsupportedImageFormat("webm".to_string());
    assert_eq!(error.frames_written(), None);
    assert!(error.to_string().contains("webm"));
}

#[test]
fn extract_beside_missing_video() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let video = temporary_directory.path().join("gone.mp4");

    let result = stillframe::extract_video_beside(&video, &ExtractOptions::new());

    assert!(matches!(result, Err(StillframeError::SourceUnavailable { .. })));
    assert!(!temporary_directory.path().join("gone").exists());
}
