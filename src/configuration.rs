//! Selection configuration.
//!
//! [`SelectionOptions`] is a builder that carries the selection parameters
//! (frame count, blur threshold, attempt budget), the candidate placement
//! policy, and the operational hooks (progress, cancellation).
//!
//! # Example
//!
//! ```
//! use sharpframes::{CandidatePolicy, DegeneratePolicy, SelectionOptions};
//!
//! let options = SelectionOptions::new()
//!     .with_num_frames(12)
//!     .with_blur_threshold(60.0)
//!     .with_max_attempts(8)
//!     .with_policy(CandidatePolicy::Consecutive)
//!     .with_degenerate_policy(DegeneratePolicy::Clamp);
//! assert_eq!(options.num_frames(), 12);
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::error::SharpFramesError;
use crate::progress::{CancellationToken, NoOpProgress, ProgressCallback};
use crate::sampling::CandidatePolicy;
use crate::sharpness::DEFAULT_BLUR_THRESHOLD;

/// Default number of frames (intervals) to select.
pub const DEFAULT_NUM_FRAMES: usize = 20;

/// Default read attempts per interval.
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

/// What to do when the video has fewer frames than requested intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DegeneratePolicy {
    /// Fail with [`SharpFramesError::DegenerateInterval`]. This is the default.
    #[default]
    Reject,
    /// Reduce the interval count to the frame count, giving one-frame
    /// intervals. The result then holds fewer frames than requested.
    Clamp,
}

/// Configuration for [`FrameSelector`](crate::FrameSelector).
///
/// A default-constructed value selects 20 frames with a blur threshold of
/// 80 and up to 5 attempts per interval.
#[derive(Clone)]
pub struct SelectionOptions {
    pub(crate) num_frames: usize,
    pub(crate) blur_threshold: f64,
    pub(crate) max_attempts: usize,
    pub(crate) policy: CandidatePolicy,
    pub(crate) degenerate: DegeneratePolicy,
    pub(crate) progress: Arc<dyn ProgressCallback>,
    pub(crate) cancellation: Option<CancellationToken>,
}

impl Debug for SelectionOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("SelectionOptions")
            .field("num_frames", &self.num_frames)
            .field("blur_threshold", &self.blur_threshold)
            .field("max_attempts", &self.max_attempts)
            .field("policy", &self.policy)
            .field("degenerate", &self.degenerate)
            .field("has_cancellation", &self.cancellation.is_some())
            .finish()
    }
}

impl Default for SelectionOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionOptions {
    /// Create options with the default parameters.
    pub fn new() -> Self {
        Self {
            num_frames: DEFAULT_NUM_FRAMES,
            blur_threshold: DEFAULT_BLUR_THRESHOLD,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            policy: CandidatePolicy::default(),
            degenerate: DegeneratePolicy::default(),
            progress: Arc::new(NoOpProgress),
            cancellation: None,
        }
    }

    /// Number of intervals, and therefore frames, to select.
    #[must_use]
    pub fn with_num_frames(mut self, num_frames: usize) -> Self {
        self.num_frames = num_frames;
        self
    }

    /// Minimum Laplacian variance for a frame to count as sharp.
    ///
    /// Passed through unchanged; any value is accepted.
    #[must_use]
    pub fn with_blur_threshold(mut self, threshold: f64) -> Self {
        self.blur_threshold = threshold;
        self
    }

    /// Upper bound on reads per interval.
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Candidate placement policy.
    #[must_use]
    pub fn with_policy(mut self, policy: CandidatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Behaviour when the video is shorter than the interval count.
    #[must_use]
    pub fn with_degenerate_policy(mut self, policy: DegeneratePolicy) -> Self {
        self.degenerate = policy;
        self
    }

    /// Attach a progress callback, fired once per completed interval.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Attach a cancellation token, checked before each interval.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    pub fn blur_threshold(&self) -> f64 {
        self.blur_threshold
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub fn policy(&self) -> CandidatePolicy {
        self.policy
    }

    /// Check the parameters without touching any video.
    ///
    /// # Errors
    ///
    /// [`SharpFramesError::InvalidFrameCount`] when `num_frames` is zero,
    /// [`SharpFramesError::InvalidAttemptCount`] when `max_attempts` is zero.
    pub fn validate(&self) -> Result<(), SharpFramesError> {
        if self.num_frames == 0 {
            return Err(SharpFramesError::InvalidFrameCount);
        }
        if self.max_attempts == 0 {
            return Err(SharpFramesError::InvalidAttemptCount);
        }
        Ok(())
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }
}
