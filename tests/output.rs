//! Saving selected frames to disk.

mod common;

use common::{blurry_frame, sharp_frame};
use image::{DynamicImage, RgbaImage};
use sharpframes::output::{frame_file_name, save_frames};

#[test]
fn frames_are_numbered_from_one() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let frames = vec![sharp_frame(), blurry_frame(40), blurry_frame(200)];

    let written = save_frames(&frames, directory.path()).expect("saving should succeed");

    let names: Vec<String> = written
        .iter()
        .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["frame_01.jpg", "frame_02.jpg", "frame_03.jpg"]);
    assert!(written.iter().all(|path| path.exists()));
}

#[test]
fn output_directory_is_created() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let nested = directory.path().join("shoppable_items").join("run_1");

    save_frames(&[sharp_frame()], &nested).expect("saving should succeed");

    assert!(nested.join("frame_01.jpg").exists());
}

#[test]
fn rgba_frames_are_saved_as_jpeg() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let frame = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, image::Rgba([10, 20, 30, 128])));

    let written = save_frames(&[frame], directory.path()).expect("saving should succeed");

    let decoded = image::open(&written[0]).expect("written file should decode");
    assert_eq!((decoded.width(), decoded.height()), (8, 8));
}

#[test]
fn saved_png_round_trips_pixels() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let frame = sharp_frame();

    let written = sharpframes::output::save_frames_as(
        std::slice::from_ref(&frame),
        directory.path(),
        "png",
        std::sync::Arc::new(sharpframes::NoOpProgress),
    )
    .expect("saving should succeed");

    let decoded = image::open(&written[0]).expect("written file should decode");
    assert_eq!(decoded.to_luma8(), frame.to_luma8());
}

#[test]
fn empty_selection_writes_nothing() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let written = save_frames(&[], directory.path()).expect("saving should succeed");
    assert!(written.is_empty());
}

#[test]
fn file_names_are_zero_padded() {
    assert_eq!(frame_file_name(8, "jpg"), "frame_09.jpg");
    assert_eq!(frame_file_name(19, ".PNG"), "frame_20.png");
}
