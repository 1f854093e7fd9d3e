//! Output naming and listing tests.

use std::fs;

use stillframe::layout::{frame_file_name, list_frames};

#[test]
fn list_frames_orders_numerically() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let directory = temporary_directory.path();
    for index in [10_u64, 2, 0, 1] {
        fs::write(directory.join(frame_file_name(index, "jpg")), b"x").unwrap();
    }

    let names: Vec<String> = list_frames(directory)
        .expect("Failed to list")
        .iter()
        .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();

    assert_eq!(names, vec!["frame0.jpg", "frame1.jpg", "frame2.jpg", "frame10.jpg"]);
}

#[test]
fn list_frames_skips_other_entries() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let directory = temporary_directory.path();
    fs::write(directory.join("frame0.png"), b"x").unwrap();
    fs::write(directory.join(".frameAbc123.part"), b"x").unwrap();
    fs::write(directory.join("notes.txt"), b"x").unwrap();
    fs::create_dir(directory.join("frame1.png")).unwrap();

    let frames = list_frames(directory).expect("Failed to list");
    assert_eq!(frames, vec![directory.join("frame0.png")]);
}

#[test]
fn list_frames_missing_directory_errors() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    assert!(list_frames(&temporary_directory.path().join("absent")).is_err());
}
