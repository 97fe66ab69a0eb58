//! # sharpframes
//!
//! Pick a small, representative set of sharp still frames from a video and
//! annotate them with object detections.
//!
//! The video is split into equal intervals, one per output frame. Within each
//! interval a bounded number of candidate frames is decoded and scored with
//! the variance of the Laplacian; the first frame above the blur threshold is
//! kept, and if none qualifies the last decoded frame is used and the interval
//! is reported.
//!
//! ## Quick Start
//!
//! ```no_run
//! use sharpframes::{FrameSelector, SelectionOptions, VideoFile};
//!
//! let mut video = VideoFile::open("input.mp4")?;
//! let options = SelectionOptions::new()
//!     .with_num_frames(20)
//!     .with_blur_threshold(60.0)
//!     .with_max_attempts(5);
//! let selection = FrameSelector::new(options).select(&mut video)?;
//!
//! sharpframes::output::save_frames(selection.frames(), "shoppable_items")?;
//! print!("{selection}");
//! # Ok::<(), sharpframes::SharpFramesError>(())
//! ```
//!
//! ### Detection
//!
//! ```no_run
//! # #[cfg(feature = "yolo")]
//! # fn main() -> Result<(), sharpframes::SharpFramesError> {
//! use sharpframes::{VideoFile, YoloDetector, annotate};
//!
//! let mut video = VideoFile::open("input.mp4")?;
//! let selection = sharpframes::select(&mut video, 20, 60.0, 5)?;
//! let mut detector = YoloDetector::new("yolov8s.onnx")?;
//! let annotated = annotate::detect_and_annotate(selection.frames(), &mut detector)?;
//! sharpframes::output::save_frames(&annotated, "shoppable_items")?;
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "yolo"))]
//! # fn main() {}
//! ```
//!
//! ### Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `yolo` | `YoloDetector`, a YOLOv8 ONNX backend via `tract-onnx` |
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod acquire;
pub mod annotate;
pub mod configuration;
pub mod detect;
pub mod error;
pub mod ffmpeg;
pub mod metadata;
pub mod output;
pub mod progress;
pub mod sampling;
pub mod selector;
pub mod sharpness;
pub mod source;
pub mod video;
#[cfg(feature = "yolo")]
pub mod yolo;

pub use configuration::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_NUM_FRAMES, DegeneratePolicy, SelectionOptions,
};
pub use detect::{BoundingBox, Detector, NoDetector};
pub use error::SharpFramesError;
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use metadata::VideoMetadata;
pub use progress::{
    CancellationToken, NoOpProgress, OperationType, ProgressCallback, ProgressInfo,
};
pub use sampling::CandidatePolicy;
pub use selector::{
    Candidate, FramePick, FrameSelector, Interval, IntervalOutcome, IntervalSearch, ReadFailure,
    ReadFailureKind, SelectionDiagnostics, SelectionResult, partition, select,
};
pub use sharpness::{DEFAULT_BLUR_THRESHOLD, is_sharp, laplacian_variance, luma_bt601};
pub use source::{FrameRead, FrameSource};
pub use video::VideoFile;
#[cfg(feature = "yolo")]
pub use yolo::YoloDetector;
