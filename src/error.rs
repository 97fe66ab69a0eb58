//! Error types for the `sharpframes` crate.
//!
//! This module defines [`SharpFramesError`], the unified error type returned
//! by all fallible operations in the crate. Variants carry the context needed
//! to diagnose a failed selection: interval numbers, attempted frame indices,
//! file paths, and upstream error messages.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `sharpframes` operations.
///
/// Individual frame read failures during selection are *not* errors; they are
/// recorded in [`SelectionDiagnostics`](crate::SelectionDiagnostics) and
/// retried within the attempt budget.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SharpFramesError {
    /// The number of frames to select must be at least one.
    #[error("Number of frames to select must be greater than zero")]
    InvalidFrameCount,

    /// The per-interval attempt budget must be at least one.
    #[error("Maximum attempts per interval must be greater than zero")]
    InvalidAttemptCount,

    /// The video has fewer frames than the number of intervals requested, so
    /// intervals would be zero frames wide.
    #[error(
        "Cannot split {total_frames} frame(s) into {num_frames} interval(s): intervals would be empty"
    )]
    DegenerateInterval {
        /// Decodable frames reported by the source.
        total_frames: u64,
        /// Number of intervals that was requested.
        num_frames: usize,
    },

    /// Every read attempt in an interval failed, so there is no frame to
    /// return for it, not even a blurry one.
    #[error("No frame could be read in interval {interval} (attempted frames {attempted:?})")]
    IntervalExhausted {
        /// 1-based interval number.
        interval: usize,
        /// Frame indices that were seeked to, in attempt order.
        attempted: Vec<u64>,
    },

    /// The operation was cancelled via a [`CancellationToken`](crate::CancellationToken).
    #[error("Operation cancelled")]
    Cancelled,

    /// The media file could not be opened.
    #[error("Failed to open media file at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to [`crate::VideoFile::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// A video frame could not be decoded.
    #[error("Failed to decode video frame: {0}")]
    VideoDecodeError(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// The object detector failed to load or run.
    #[error("Detection error: {0}")]
    DetectionError(String),

    /// The external downloader exited unsuccessfully.
    #[error("Download of {url} failed: {reason}")]
    DownloadError {
        /// Locator that was passed to the downloader.
        url: String,
        /// Exit status or stderr summary.
        reason: String,
    },

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate during conversion or saving.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),
}

impl From<FfmpegError> for SharpFramesError {
    fn from(error: FfmpegError) -> Self {
        SharpFramesError::FfmpegError(error.to_string())
    }
}
