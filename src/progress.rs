//! Progress reporting and cancellation support.
//!
//! [`ProgressCallback`] observes long-running work interval by interval (or
//! frame by frame for detection and saving), and [`CancellationToken`] lets
//! another thread stop a selection between intervals.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use sharpframes::{
//!     CancellationToken, FrameSelector, ProgressCallback, ProgressInfo,
//!     SelectionOptions, VideoFile,
//! };
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         if let Some(pct) = info.percentage {
//!             println!("[{:?}] {pct:.0}%", info.operation);
//!         }
//!     }
//! }
//!
//! let token = CancellationToken::new();
//! let options = SelectionOptions::new()
//!     .with_progress(Arc::new(PrintProgress))
//!     .with_cancellation(token.clone());
//!
//! let mut video = VideoFile::open("input.mp4")?;
//! let selection = FrameSelector::new(options).select(&mut video)?;
//! # Ok::<(), sharpframes::SharpFramesError>(())
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::{Duration, Instant};

/// The kind of work being reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OperationType {
    /// Searching intervals for sharp frames.
    FrameSelection,
    /// Running the object detector over selected frames.
    Detection,
    /// Writing frames to disk.
    Saving,
}

/// A snapshot of progress.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// What kind of work is being performed.
    pub operation: OperationType,
    /// Items (intervals or frames) completed so far.
    pub current: u64,
    /// Total items expected, if known.
    pub total: Option<u64>,
    /// Completion percentage (0.0 – 100.0), if `total` is known.
    pub percentage: Option<f32>,
    /// Wall-clock time since the operation started.
    pub elapsed: Duration,
    /// Estimated time remaining, based on current throughput.
    pub estimated_remaining: Option<Duration>,
    /// Frame index chosen for the most recent item, when applicable.
    pub current_frame: Option<u64>,
}

/// Trait for receiving progress updates.
///
/// Callbacks are infallible observers. Use [`CancellationToken`] to stop an
/// operation.
pub trait ProgressCallback: Send + Sync {
    /// Called after each completed item.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Discards all notifications. Default when no callback is configured.
pub struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Cooperative cancellation token backed by an [`AtomicBool`].
///
/// Clones share state. The selector checks the token before starting each
/// interval, so a cancelled selection never leaves an interval half-searched.
///
/// ```
/// use sharpframes::CancellationToken;
///
/// let token = CancellationToken::new();
/// let observer = token.clone();
/// token.cancel();
/// assert!(observer.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new, non-cancelled token.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation. All clones observe it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks timing and emits callbacks.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    operation: OperationType,
    total: Option<u64>,
    current: u64,
    start_time: Instant,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        operation: OperationType,
        total: Option<u64>,
    ) -> Self {
        Self {
            callback,
            operation,
            total,
            current: 0,
            start_time: Instant::now(),
        }
    }

    /// Record one completed item and notify the callback.
    pub(crate) fn advance(&mut self, frame_index: Option<u64>) {
        self.current += 1;

        let elapsed = self.start_time.elapsed();
        let percentage = self
            .total
            .filter(|&t| t > 0)
            .map(|t| (self.current as f32 / t as f32) * 100.0);
        let estimated_remaining = self.total.map(|t| {
            let remaining = t.saturating_sub(self.current);
            let per_item = elapsed / self.current as u32;
            per_item * remaining as u32
        });

        self.callback.on_progress(&ProgressInfo {
            operation: self.operation,
            current: self.current,
            total: self.total,
            percentage,
            elapsed,
            estimated_remaining,
            current_frame: frame_index,
        });
    }
}
