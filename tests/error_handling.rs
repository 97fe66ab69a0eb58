//! Error handling integration tests.
//!
//! These tests verify that meaningful errors are returned for various
//! failure conditions.

use std::path::Path;

use sharpframes::{FrameSelector, SelectionOptions, SharpFramesError, VideoFile};

#[test]
fn open_nonexistent_file() {
    let result = VideoFile::open("this_file_does_not_exist.mp4");
    assert!(result.is_err());

    let error_message = result.unwrap_err().to_string();
    assert!(
        error_message.contains("Failed to open media file"),
        "Error message should mention file open failure: {error_message}",
    );
}

#[test]
fn open_invalid_file() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let invalid_file_path = temporary_directory.path().join("invalid.mp4");
    std::fs::write(&invalid_file_path, b"this is not a media file")
        .expect("Failed to write invalid file");

    let result = VideoFile::open(&invalid_file_path);
    assert!(result.is_err(), "Expected error for invalid media file");
}

#[test]
fn too_many_frames_for_video() {
    let path = "tests/fixtures/sample_video.mp4";
    if !Path::new(path).exists() {
        return;
    }

    let mut video = VideoFile::open(path).expect("Failed to open sample video");
    let options = SelectionOptions::new().with_num_frames(1_000_000);
    let result = FrameSelector::new(options).select(&mut video);
    assert!(matches!(
        result,
        Err(SharpFramesError::DegenerateInterval { .. })
    ));
}

#[test]
fn frame_out_of_range() {
    let path = "tests/fixtures/sample_video.mp4";
    if !Path::new(path).exists() {
        return;
    }

    let mut video = VideoFile::open(path).expect("Failed to open sample video");
    let frame_count = video.metadata().frame_count;
    assert!(video.frame(frame_count + 1000).is_err());
}

#[test]
fn error_messages_name_the_interval() {
    let error = SharpFramesError::IntervalExhausted {
        interval: 4,
        attempted: vec![30, 32],
    };
    let message = error.to_string();
    assert!(message.contains("interval 4"), "{message}");
    assert!(message.contains("[30, 32]"), "{message}");
}
