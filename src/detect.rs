//! Object detection capability.
//!
//! The crate treats the detection model as a black box behind the
//! [`Detector`] trait: it receives a frame and returns pixel-space bounding
//! boxes. [`NoDetector`] is the stand-in when no model is configured; with the
//! `yolo` feature, [`YoloDetector`](crate::YoloDetector) runs a YOLOv8 ONNX
//! export.

use image::DynamicImage;

use crate::error::SharpFramesError;

/// A detected object in pixel coordinates of the frame it was found in.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingBox {
    /// Left edge.
    pub x1: f32,
    /// Top edge.
    pub y1: f32,
    /// Right edge.
    pub x2: f32,
    /// Bottom edge.
    pub y2: f32,
    /// Detector confidence in `0.0..=1.0`.
    pub confidence: f32,
    /// Model class index.
    pub class_id: usize,
    /// Human-readable class name.
    pub label: String,
}

impl BoundingBox {
    pub fn width(&self) -> f32 {
        (self.x2 - self.x1).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y2 - self.y1).max(0.0)
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Intersection over union with another box; `0.0` when either is empty.
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let ix = (self.x2.min(other.x2) - self.x1.max(other.x1)).max(0.0);
        let iy = (self.y2.min(other.y2) - self.y1.max(other.y1)).max(0.0);
        let intersection = ix * iy;
        let union = self.area() + other.area() - intersection;
        if union <= 0.0 { 0.0 } else { intersection / union }
    }

    /// `"{label} {confidence:.2}"`, e.g. `"handbag 0.87"`.
    pub fn caption(&self) -> String {
        format!("{} {:.2}", self.label, self.confidence)
    }
}

/// Produces bounding boxes for a frame.
pub trait Detector {
    /// Backend identifier, used in log output.
    fn name(&self) -> &'static str;

    /// Run the model on one frame.
    ///
    /// # Errors
    ///
    /// [`SharpFramesError::DetectionError`] when inference fails.
    fn infer(&mut self, frame: &DynamicImage) -> Result<Vec<BoundingBox>, SharpFramesError>;
}

impl<D: Detector + ?Sized> Detector for Box<D> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn infer(&mut self, frame: &DynamicImage) -> Result<Vec<BoundingBox>, SharpFramesError> {
        (**self).infer(frame)
    }
}

/// Detector that never finds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDetector;

impl Detector for NoDetector {
    fn name(&self) -> &'static str {
        "none"
    }

    fn infer(&mut self, _frame: &DynamicImage) -> Result<Vec<BoundingBox>, SharpFramesError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(x1: f32, y1: f32, x2: f32, y2: f32) -> BoundingBox {
        BoundingBox {
            x1,
            y1,
            x2,
            y2,
            confidence: 0.5,
            class_id: 0,
            label: "person".to_string(),
        }
    }

    #[test]
    fn iou_of_identical_boxes_is_one() {
        let a = bbox(0.0, 0.0, 10.0, 10.0);
        assert!((a.iou(&a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn iou_of_disjoint_boxes_is_zero() {
        let a = bbox(0.0, 0.0, 10.0, 10.0);
        let b = bbox(20.0, 20.0, 30.0, 30.0);
        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn iou_of_half_overlap() {
        let a = bbox(0.0, 0.0, 10.0, 10.0);
        let b = bbox(5.0, 0.0, 15.0, 10.0);
        // 50 / (100 + 100 - 50)
        assert!((a.iou(&b) - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn caption_has_two_decimals() {
        let mut b = bbox(0.0, 0.0, 1.0, 1.0);
        b.confidence = 0.876;
        assert_eq!(b.caption(), "person 0.88");
    }

    #[test]
    fn no_detector_finds_nothing() {
        let frame = DynamicImage::new_rgb8(8, 8);
        assert!(NoDetector.infer(&frame).unwrap().is_empty());
    }
}
