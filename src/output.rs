//! Writing selected frames to disk.
//!
//! Frames are saved as `frame_01.jpg`, `frame_02.jpg`, … in the order they
//! were selected. The image format follows the extension.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use image::DynamicImage;

use crate::error::SharpFramesError;
use crate::progress::{NoOpProgress, OperationType, ProgressCallback, ProgressTracker};

/// Extension used by [`save_frames`].
pub const DEFAULT_EXTENSION: &str = "jpg";

/// File name for the frame at 0-based `position`: 1-based, zero-padded to
/// two digits.
///
/// ```
/// assert_eq!(sharpframes::output::frame_file_name(0, "jpg"), "frame_01.jpg");
/// assert_eq!(sharpframes::output::frame_file_name(99, "png"), "frame_100.png");
/// ```
pub fn frame_file_name(position: usize, extension: &str) -> String {
    format!(
        "frame_{:02}.{}",
        position + 1,
        extension.trim_start_matches('.').to_ascii_lowercase()
    )
}

/// Save frames as JPEG into `output_dir`, creating it if absent.
///
/// Returns the written paths in frame order.
///
/// # Errors
///
/// [`SharpFramesError::IoError`] if the directory cannot be created,
/// [`SharpFramesError::ImageError`] if a frame cannot be encoded.
pub fn save_frames<P: AsRef<Path>>(
    frames: &[DynamicImage],
    output_dir: P,
) -> Result<Vec<PathBuf>, SharpFramesError> {
    save_frames_as(frames, output_dir, DEFAULT_EXTENSION, Arc::new(NoOpProgress))
}

/// Save frames with a chosen extension, reporting after each file.
pub fn save_frames_as<P: AsRef<Path>>(
    frames: &[DynamicImage],
    output_dir: P,
    extension: &str,
    progress: Arc<dyn ProgressCallback>,
) -> Result<Vec<PathBuf>, SharpFramesError> {
    let output_dir = output_dir.as_ref();
    fs::create_dir_all(output_dir)?;

    let mut tracker = ProgressTracker::new(progress, OperationType::Saving, Some(frames.len() as u64));
    let mut written = Vec::with_capacity(frames.len());

    for (position, frame) in frames.iter().enumerate() {
        let path = output_dir.join(frame_file_name(position, extension));
        save_frame(frame, &path)?;
        log::debug!("Saved {}", path.display());
        written.push(path);
        tracker.advance(None);
    }

    log::info!("Saved {} frame(s) to {}", written.len(), output_dir.display());
    Ok(written)
}

/// JPEG has no alpha channel, so RGBA and other layouts are flattened to RGB
/// first.
fn save_frame(frame: &DynamicImage, path: &Path) -> Result<(), SharpFramesError> {
    let is_jpeg = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg"));

    if is_jpeg && !matches!(frame, DynamicImage::ImageRgb8(_) | DynamicImage::ImageLuma8(_)) {
        DynamicImage::ImageRgb8(frame.to_rgb8()).save(path)?;
    } else {
        frame.save(path)?;
    }
    Ok(())
}
