//! FFmpeg-backed selection tests.
//!
//! Tests require `tests/fixtures/sample_video.mp4` and are skipped when it
//! is absent.

use std::path::Path;

use sharpframes::{FrameRead, FrameSelector, FrameSource, SelectionOptions, VideoFile};

fn sample_video_path() -> &'static str {
    "tests/fixtures/sample_video.mp4"
}

fn open_sample() -> Option<VideoFile> {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return None;
    }
    Some(VideoFile::open(path).expect("Failed to open sample video"))
}

#[test]
fn metadata_is_populated() {
    let Some(video) = open_sample() else { return };
    let metadata = video.metadata();
    assert!(metadata.width > 0);
    assert!(metadata.height > 0);
    assert!(metadata.frames_per_second > 0.0);
    assert!(metadata.frame_count > 0);
    assert_eq!(video.frame_count(), metadata.frame_count);
}

#[test]
fn seek_then_read_returns_frame_of_video_size() {
    let Some(mut video) = open_sample() else { return };
    let (width, height) = (video.metadata().width, video.metadata().height);

    video.seek(video.frame_count() / 2).expect("seek should succeed");
    match video.read_next() {
        FrameRead::Frame(frame) => assert_eq!((frame.width(), frame.height()), (width, height)),
        other => panic!("expected a frame, got {other:?}"),
    }
}

#[test]
fn read_past_end_is_end_of_stream() {
    let Some(mut video) = open_sample() else { return };
    let frame_count = video.frame_count();
    video.seek(frame_count).expect("seek should succeed");
    assert!(matches!(video.read_next(), FrameRead::EndOfStream));
}

#[test]
fn selects_requested_frame_count() {
    let Some(mut video) = open_sample() else { return };
    let options = SelectionOptions::new()
        .with_num_frames(5)
        .with_blur_threshold(60.0)
        .with_max_attempts(3);

    let result = FrameSelector::new(options)
        .select(&mut video)
        .expect("selection should succeed");

    assert_eq!(result.len(), 5);
    let interval = video.frame_count() / 5;
    for (position, pick) in result.picks().iter().enumerate() {
        let start = position as u64 * interval;
        assert!((start..start + interval).contains(&pick.frame_index));
    }
}
