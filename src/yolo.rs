//! YOLOv8 ONNX detector (feature `yolo`).
//!
//! Runs an Ultralytics YOLOv8 export (`yolo export model=yolov8s.pt
//! format=onnx`) through `tract-onnx`. The frame is resized to the model's
//! square input, the `[1, 4 + classes, anchors]` output is decoded into
//! boxes, filtered by confidence, and de-duplicated with per-class
//! non-maximum suppression. Boxes are returned in source-frame pixels.

use std::path::Path;

use image::{DynamicImage, imageops::FilterType};
use tract_onnx::prelude::*;

use crate::detect::{BoundingBox, Detector};
use crate::error::SharpFramesError;

/// Side length of the square input YOLOv8 exports use by default.
pub const DEFAULT_INPUT_SIZE: u32 = 640;

/// Minimum class score for a box to be kept.
pub const DEFAULT_CONFIDENCE: f32 = 0.25;

/// IoU above which a lower-scoring box of the same class is suppressed.
pub const DEFAULT_IOU: f32 = 0.45;

/// COCO class names, in model output order.
pub const COCO_CLASSES: [&str; 80] = [
    "person", "bicycle", "car", "motorcycle", "airplane", "bus", "train", "truck", "boat",
    "traffic light", "fire hydrant", "stop sign", "parking meter", "bench", "bird", "cat", "dog",
    "horse", "sheep", "cow", "elephant", "bear", "zebra", "giraffe", "backpack", "umbrella",
    "handbag", "tie", "suitcase", "frisbee", "skis", "snowboard", "sports ball", "kite",
    "baseball bat", "baseball glove", "skateboard", "surfboard", "tennis racket", "bottle",
    "wine glass", "cup", "fork", "knife", "spoon", "bowl", "banana", "apple", "sandwich",
    "orange", "broccoli", "carrot", "hot dog", "pizza", "donut", "cake", "chair", "couch",
    "potted plant", "bed", "dining table", "toilet", "tv", "laptop", "mouse", "remote",
    "keyboard", "cell phone", "microwave", "oven", "toaster", "sink", "refrigerator", "book",
    "clock", "vase", "scissors", "teddy bear", "hair drier", "toothbrush",
];

fn detection_error<E: std::fmt::Display>(context: &str) -> impl FnOnce(E) -> SharpFramesError + '_ {
    move |error| SharpFramesError::DetectionError(format!("{context}: {error}"))
}

/// YOLOv8 detector backed by `tract-onnx`.
pub struct YoloDetector {
    model: SimplePlan<TypedFact, Box<dyn TypedOp>>,
    input_size: u32,
    confidence_threshold: f32,
    iou_threshold: f32,
}

impl YoloDetector {
    /// Load and optimise an ONNX model with a `1×3×640×640` input.
    ///
    /// # Errors
    ///
    /// [`SharpFramesError::DetectionError`] if the model cannot be loaded.
    pub fn new<P: AsRef<Path>>(model_path: P) -> Result<Self, SharpFramesError> {
        Self::with_input_size(model_path, DEFAULT_INPUT_SIZE)
    }

    /// Load a model exported with a non-default square input size.
    pub fn with_input_size<P: AsRef<Path>>(
        model_path: P,
        input_size: u32,
    ) -> Result<Self, SharpFramesError> {
        let model_path = model_path.as_ref();
        log::debug!("Loading YOLO model {} ({input_size}px)", model_path.display());
        let side = input_size as usize;
        let model = tract_onnx::onnx()
            .model_for_path(model_path)
            .map_err(detection_error("failed to load ONNX model"))?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(f32::datum_type(), tvec!(1, 3, side, side)),
            )
            .map_err(detection_error("failed to set input fact"))?
            .into_optimized()
            .map_err(detection_error("failed to optimise ONNX model"))?
            .into_runnable()
            .map_err(detection_error("failed to build runnable ONNX model"))?;

        Ok(Self {
            model,
            input_size,
            confidence_threshold: DEFAULT_CONFIDENCE,
            iou_threshold: DEFAULT_IOU,
        })
    }

    #[must_use]
    pub fn with_confidence(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_iou(mut self, threshold: f32) -> Self {
        self.iou_threshold = threshold;
        self
    }

    fn build_input(&self, frame: &DynamicImage) -> Tensor {
        let side = self.input_size;
        let resized = image::imageops::resize(&frame.to_rgb8(), side, side, FilterType::Triangle);
        let side = side as usize;
        tract_ndarray::Array4::from_shape_fn((1, 3, side, side), |(_, channel, y, x)| {
            resized.get_pixel(x as u32, y as u32)[channel] as f32 / 255.0
        })
        .into_tensor()
    }
}

impl Detector for YoloDetector {
    fn name(&self) -> &'static str {
        "yolov8"
    }

    fn infer(&mut self, frame: &DynamicImage) -> Result<Vec<BoundingBox>, SharpFramesError> {
        let input = self.build_input(frame);
        let outputs = self
            .model
            .run(tvec!(input.into()))
            .map_err(detection_error("ONNX inference failed"))?;
        let output = outputs
            .first()
            .ok_or_else(|| SharpFramesError::DetectionError("model produced no outputs".to_string()))?;
        let view = output
            .to_array_view::<f32>()
            .map_err(detection_error("model output tensor was not f32"))?
            .into_dimensionality::<tract_ndarray::Ix3>()
            .map_err(detection_error("YOLO output is not three-dimensional"))?;

        let (batch, rows, anchors) = view.dim();
        if batch != 1 || rows <= 4 {
            return Err(SharpFramesError::DetectionError(format!(
                "unexpected YOLO output shape [{batch}, {rows}, {anchors}]"
            )));
        }

        let scale_x = frame.width() as f32 / self.input_size as f32;
        let scale_y = frame.height() as f32 / self.input_size as f32;
        let mut candidates = Vec::new();

        for anchor in 0..anchors {
            let (class_id, confidence) = (4..rows)
                .map(|row| (row - 4, view[[0, row, anchor]]))
                .fold((0, f32::NEG_INFINITY), |best, item| if item.1 > best.1 { item } else { best });
            if confidence < self.confidence_threshold {
                continue;
            }

            let cx = view[[0, 0, anchor]];
            let cy = view[[0, 1, anchor]];
            let w = view[[0, 2, anchor]];
            let h = view[[0, 3, anchor]];
            candidates.push(BoundingBox {
                x1: (cx - w / 2.0) * scale_x,
                y1: (cy - h / 2.0) * scale_y,
                x2: (cx + w / 2.0) * scale_x,
                y2: (cy + h / 2.0) * scale_y,
                confidence,
                class_id,
                label: COCO_CLASSES
                    .get(class_id)
                    .map(|name| name.to_string())
                    .unwrap_or_else(|| format!("class {class_id}")),
            });
        }

        Ok(non_maximum_suppression(candidates, self.iou_threshold))
    }
}

/// Keep the highest-confidence box of each overlapping same-class cluster.
pub fn non_maximum_suppression(mut boxes: Vec<BoundingBox>, iou_threshold: f32) -> Vec<BoundingBox> {
    boxes.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    let mut kept: Vec<BoundingBox> = Vec::with_capacity(boxes.len());
    for candidate in boxes {
        let overlaps = kept
            .iter()
            .any(|k| k.class_id == candidate.class_id && k.iou(&candidate) > iou_threshold);
        if !overlaps {
            kept.push(candidate);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(x1: f32, class_id: usize, confidence: f32) -> BoundingBox {
        BoundingBox {
            x1,
            y1: 0.0,
            x2: x1 + 10.0,
            y2: 10.0,
            confidence,
            class_id,
            label: COCO_CLASSES[class_id].to_string(),
        }
    }

    #[test]
    fn nms_keeps_best_of_overlapping_same_class() {
        let kept = non_maximum_suppression(vec![bbox(0.0, 0, 0.6), bbox(1.0, 0, 0.9)], 0.45);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].confidence, 0.9);
    }

    #[test]
    fn nms_keeps_overlapping_boxes_of_different_classes() {
        let kept = non_maximum_suppression(vec![bbox(0.0, 0, 0.6), bbox(1.0, 26, 0.9)], 0.45);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn nms_keeps_disjoint_boxes() {
        let kept = non_maximum_suppression(vec![bbox(0.0, 0, 0.6), bbox(50.0, 0, 0.9)], 0.45);
        assert_eq!(kept.len(), 2);
    }
}
