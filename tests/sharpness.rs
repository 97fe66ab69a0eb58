//! Laplacian variance scoring.

mod common;

use common::{blurry_frame, sharp_frame};
use image::{DynamicImage, GrayImage, Luma, imageops};
use sharpframes::{DEFAULT_BLUR_THRESHOLD, is_sharp, laplacian_variance};

#[test]
fn flat_frame_scores_zero() {
    assert_eq!(laplacian_variance(&blurry_frame(128)), 0.0);
}

#[test]
fn checkerboard_is_sharp() {
    let frame = sharp_frame();
    assert!(laplacian_variance(&frame) > DEFAULT_BLUR_THRESHOLD);
    assert!(is_sharp(&frame, DEFAULT_BLUR_THRESHOLD));
}

#[test]
fn blurring_lowers_the_score() {
    let frame = sharp_frame();
    let blurred = DynamicImage::ImageLuma8(imageops::blur(&frame.to_luma8(), 2.0));
    assert!(laplacian_variance(&blurred) < laplacian_variance(&frame));
}

#[test]
fn gentle_gradient_is_blurry() {
    let gradient = GrayImage::from_fn(64, 64, |x, _| Luma([(x * 2) as u8]));
    let frame = DynamicImage::ImageLuma8(gradient);
    assert!(!is_sharp(&frame, DEFAULT_BLUR_THRESHOLD));
}

#[test]
fn score_is_deterministic() {
    let frame = sharp_frame();
    assert_eq!(laplacian_variance(&frame), laplacian_variance(&frame));
}
