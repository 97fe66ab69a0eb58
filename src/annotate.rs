//! Bounding-box overlays.
//!
//! [`annotate`] copies a frame to RGB and outlines each detection with a
//! green rectangle. Labels are not rendered; callers that need them can use
//! [`BoundingBox::caption`](crate::BoundingBox::caption).

use std::sync::Arc;

use image::{DynamicImage, Rgb, RgbImage};

use crate::detect::{BoundingBox, Detector};
use crate::error::SharpFramesError;
use crate::progress::{NoOpProgress, OperationType, ProgressCallback, ProgressTracker};

/// Outline colour.
pub const BOX_COLOUR: Rgb<u8> = Rgb([0, 255, 0]);

/// Outline thickness in pixels.
pub const BOX_THICKNESS: u32 = 2;

/// Return a copy of `frame` with every box outlined.
///
/// Boxes are clipped to the image; boxes entirely outside it are skipped.
pub fn annotate(frame: &DynamicImage, boxes: &[BoundingBox]) -> DynamicImage {
    let mut canvas = frame.to_rgb8();
    for bounding_box in boxes {
        draw_rectangle(&mut canvas, bounding_box, BOX_COLOUR, BOX_THICKNESS);
    }
    DynamicImage::ImageRgb8(canvas)
}

/// Run `detector` over every frame and return the annotated copies in the
/// same order.
///
/// # Errors
///
/// Returns the first error from the detector.
pub fn detect_and_annotate<D: Detector + ?Sized>(
    frames: &[DynamicImage],
    detector: &mut D,
) -> Result<Vec<DynamicImage>, SharpFramesError> {
    detect_and_annotate_with_progress(frames, detector, Arc::new(NoOpProgress))
}

/// Like [`detect_and_annotate`], reporting after each frame.
pub fn detect_and_annotate_with_progress<D: Detector + ?Sized>(
    frames: &[DynamicImage],
    detector: &mut D,
    progress: Arc<dyn ProgressCallback>,
) -> Result<Vec<DynamicImage>, SharpFramesError> {
    log::info!("Detecting objects in {} frame(s) with {}", frames.len(), detector.name());
    let mut tracker = ProgressTracker::new(progress, OperationType::Detection, Some(frames.len() as u64));
    let mut annotated = Vec::with_capacity(frames.len());

    for (position, frame) in frames.iter().enumerate() {
        let boxes = detector.infer(frame)?;
        for bounding_box in &boxes {
            log::debug!(
                "frame {:02}: {} at ({:.0}, {:.0})-({:.0}, {:.0})",
                position + 1,
                bounding_box.caption(),
                bounding_box.x1,
                bounding_box.y1,
                bounding_box.x2,
                bounding_box.y2
            );
        }
        annotated.push(annotate(frame, &boxes));
        tracker.advance(None);
    }

    Ok(annotated)
}

fn draw_rectangle(canvas: &mut RgbImage, bounding_box: &BoundingBox, colour: Rgb<u8>, thickness: u32) {
    let (width, height) = canvas.dimensions();
    if width == 0 || height == 0 {
        return;
    }

    let max_x = (width - 1) as f32;
    let max_y = (height - 1) as f32;
    if bounding_box.x2 < 0.0 || bounding_box.y2 < 0.0 || bounding_box.x1 > max_x || bounding_box.y1 > max_y
    {
        return;
    }

    let x1 = bounding_box.x1.clamp(0.0, max_x) as u32;
    let y1 = bounding_box.y1.clamp(0.0, max_y) as u32;
    let x2 = bounding_box.x2.clamp(0.0, max_x) as u32;
    let y2 = bounding_box.y2.clamp(0.0, max_y) as u32;

    for offset in 0..thickness {
        // Edges grow inward so the outline stays inside the box.
        let (top, bottom) = (y1.saturating_add(offset).min(y2), y2.saturating_sub(offset).max(y1));
        let (left, right) = (x1.saturating_add(offset).min(x2), x2.saturating_sub(offset).max(x1));
        for x in x1..=x2 {
            canvas.put_pixel(x, top, colour);
            canvas.put_pixel(x, bottom, colour);
        }
        for y in y1..=y2 {
            canvas.put_pixel(left, y, colour);
            canvas.put_pixel(right, y, colour);
        }
    }
}
