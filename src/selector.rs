//! Interval-based sharp frame selection.
//!
//! [`FrameSelector`] splits a video into `num_frames` equal, contiguous
//! intervals and searches each one for a frame whose Laplacian variance meets
//! the blur threshold. Each interval gets a bounded number of reads, placed by
//! the configured [`CandidatePolicy`](crate::CandidatePolicy). The first sharp
//! frame wins; when none is found the last frame that decoded is used
//! instead, and the interval is reported in
//! [`SelectionResult::unsharp_intervals`].
//!
//! # Example
//!
//! ```no_run
//! use sharpframes::{FrameSelector, SelectionOptions, VideoFile};
//!
//! let mut video = VideoFile::open("input.mp4")?;
//! let selector = FrameSelector::new(SelectionOptions::new().with_num_frames(10));
//! let selection = selector.select(&mut video)?;
//!
//! for (position, frame) in selection.frames().iter().enumerate() {
//!     frame.save(format!("pick_{:02}.png", position + 1))?;
//! }
//! if !selection.unsharp_intervals().is_empty() {
//!     println!("blurry intervals: {:?}", selection.unsharp_intervals());
//! }
//! # Ok::<(), sharpframes::SharpFramesError>(())
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};

use image::DynamicImage;

use crate::configuration::{DegeneratePolicy, SelectionOptions};
use crate::error::SharpFramesError;
use crate::progress::{OperationType, ProgressTracker};
use crate::sharpness;
use crate::source::{FrameRead, FrameSource};

/// One contiguous slice of the video, `[start, start + len)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    /// 0-based position of the interval (and of its frame in the result).
    pub index: usize,
    /// First frame index in the interval.
    pub start: u64,
    /// Width in frames.
    pub len: u64,
}

impl Interval {
    /// 1-based interval number, as used in diagnostics and errors.
    pub fn number(&self) -> usize {
        self.index + 1
    }

    /// One past the last frame index in the interval.
    pub fn end(&self) -> u64 {
        self.start + self.len
    }

    pub fn contains(&self, frame_index: u64) -> bool {
        (self.start..self.end()).contains(&frame_index)
    }
}

/// Split `total_frames` into `num_frames` intervals of
/// `total_frames / num_frames` frames each.
///
/// Trailing frames left over by the integer division belong to no interval.
///
/// # Errors
///
/// [`SharpFramesError::InvalidFrameCount`] for `num_frames == 0` and
/// [`SharpFramesError::DegenerateInterval`] when the intervals would be empty.
pub fn partition(total_frames: u64, num_frames: usize) -> Result<Vec<Interval>, SharpFramesError> {
    if num_frames == 0 {
        return Err(SharpFramesError::InvalidFrameCount);
    }
    let interval_size = total_frames / num_frames as u64;
    if interval_size == 0 {
        return Err(SharpFramesError::DegenerateInterval {
            total_frames,
            num_frames,
        });
    }
    Ok((0..num_frames)
        .map(|index| Interval {
            index,
            start: index as u64 * interval_size,
            len: interval_size,
        })
        .collect())
}

/// A decoded frame together with where it came from and how it scored.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub frame: DynamicImage,
    pub frame_index: u64,
    /// Laplacian variance of the frame.
    pub score: f64,
}

/// Result of searching one interval.
#[derive(Debug, Clone)]
pub enum IntervalOutcome {
    /// A frame met the threshold.
    Sharp(Candidate),
    /// No frame met the threshold; this is the last frame that decoded.
    Fallback(Candidate),
    /// No attempt produced a frame at all.
    Exhausted,
}

/// Outcome of [`FrameSelector::search_interval`] plus the indices it read.
#[derive(Debug, Clone)]
pub struct IntervalSearch {
    pub outcome: IntervalOutcome,
    /// Frame indices attempted, in order.
    pub attempted: Vec<u64>,
}

/// Why a single read attempt produced no frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadFailureKind {
    /// The source reported end of stream.
    EndOfStream,
    /// The frame data could not be decoded.
    Decode(String),
    /// The seek itself failed.
    Seek(String),
}

/// A failed read attempt, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadFailure {
    /// 1-based interval number.
    pub interval: usize,
    pub frame_index: u64,
    pub kind: ReadFailureKind,
}

impl Display for ReadFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "Could not read frame at index {} (interval {}): ",
            self.frame_index, self.interval
        )?;
        match &self.kind {
            ReadFailureKind::EndOfStream => write!(f, "end of stream"),
            ReadFailureKind::Decode(reason) => write!(f, "decode failed: {reason}"),
            ReadFailureKind::Seek(reason) => write!(f, "seek failed: {reason}"),
        }
    }
}

/// Where the frame for one interval came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramePick {
    /// 1-based interval number.
    pub interval: usize,
    pub frame_index: u64,
    pub score: f64,
    /// `false` when the frame is a fallback.
    pub sharp: bool,
    /// Reads spent on the interval, including failed ones.
    pub attempts: usize,
}

/// Non-fatal events collected during a selection.
#[derive(Debug, Clone, Default)]
pub struct SelectionDiagnostics {
    /// Every read attempt that produced no frame, in the order they happened.
    pub read_failures: Vec<ReadFailure>,
    /// Set when [`DegeneratePolicy::Clamp`] reduced the interval count; holds
    /// the originally requested count.
    pub clamped_from: Option<usize>,
}

/// Frames chosen by [`FrameSelector::select`].
///
/// `frames()[i]` always belongs to interval `i`.
#[derive(Debug, Clone)]
pub struct SelectionResult {
    frames: Vec<DynamicImage>,
    picks: Vec<FramePick>,
    unsharp_intervals: Vec<usize>,
    diagnostics: SelectionDiagnostics,
}

impl SelectionResult {
    /// Selected frames in interval order.
    pub fn frames(&self) -> &[DynamicImage] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<DynamicImage> {
        self.frames
    }

    /// Per-interval provenance, parallel to [`frames`](SelectionResult::frames).
    pub fn picks(&self) -> &[FramePick] {
        &self.picks
    }

    /// 1-based numbers of the intervals that fell back to an unsharp frame.
    pub fn unsharp_intervals(&self) -> &[usize] {
        &self.unsharp_intervals
    }

    pub fn diagnostics(&self) -> &SelectionDiagnostics {
        &self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl Display for SelectionResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if let Some(requested) = self.diagnostics.clamped_from {
            writeln!(
                f,
                "[WARN] Video too short for {requested} intervals; selected {} instead",
                self.frames.len()
            )?;
        }
        for failure in &self.diagnostics.read_failures {
            writeln!(f, "[WARN] {failure}")?;
        }
        if !self.unsharp_intervals.is_empty() {
            let numbers: Vec<String> = self
                .unsharp_intervals
                .iter()
                .map(ToString::to_string)
                .collect();
            writeln!(
                f,
                "[WARN] No sharp frame found in intervals [{}]. Using last sampled frame.",
                numbers.join(", ")
            )?;
        }
        writeln!(
            f,
            "[INFO] Selected {} frame(s), {} sharp",
            self.frames.len(),
            self.picks.iter().filter(|pick| pick.sharp).count()
        )
    }
}

/// Searches intervals of a [`FrameSource`] for sharp frames.
#[derive(Debug, Clone, Default)]
pub struct FrameSelector {
    options: SelectionOptions,
}

impl FrameSelector {
    pub fn new(options: SelectionOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SelectionOptions {
        &self.options
    }

    /// Select one frame per interval.
    ///
    /// Parameters are validated before the source is touched. Read failures
    /// are retried within the attempt budget and recorded in the result's
    /// diagnostics.
    ///
    /// # Errors
    ///
    /// - [`SharpFramesError::InvalidFrameCount`] /
    ///   [`SharpFramesError::InvalidAttemptCount`] for bad parameters.
    /// - [`SharpFramesError::DegenerateInterval`] when the video has fewer
    ///   frames than intervals (or none) under [`DegeneratePolicy::Reject`].
    /// - [`SharpFramesError::IntervalExhausted`] when no read in an interval
    ///   produced a frame.
    /// - [`SharpFramesError::Cancelled`] when the token fires between
    ///   intervals.
    pub fn select<S: FrameSource + ?Sized>(
        &self,
        source: &mut S,
    ) -> Result<SelectionResult, SharpFramesError> {
        self.options.validate()?;

        let total_frames = source.frame_count();
        let mut diagnostics = SelectionDiagnostics::default();
        let num_frames = self.interval_count(total_frames, &mut diagnostics)?;
        let intervals = partition(total_frames, num_frames)?;

        log::debug!(
            "Selecting {} frame(s) from {} (interval={}, threshold={}, attempts={}, policy={:?})",
            num_frames,
            total_frames,
            intervals[0].len,
            self.options.blur_threshold,
            self.options.max_attempts,
            self.options.policy
        );

        let mut tracker = ProgressTracker::new(
            self.options.progress.clone(),
            OperationType::FrameSelection,
            Some(num_frames as u64),
        );
        let mut frames = Vec::with_capacity(num_frames);
        let mut picks = Vec::with_capacity(num_frames);
        let mut unsharp_intervals = Vec::new();

        for interval in &intervals {
            if self.options.is_cancelled() {
                return Err(SharpFramesError::Cancelled);
            }

            let search = self.search_interval(source, interval, &mut diagnostics);
            let attempts = search.attempted.len();
            let (candidate, sharp) = match search.outcome {
                IntervalOutcome::Sharp(candidate) => (candidate, true),
                IntervalOutcome::Fallback(candidate) => {
                    unsharp_intervals.push(interval.number());
                    (candidate, false)
                }
                IntervalOutcome::Exhausted => {
                    log::error!(
                        "Interval {} exhausted: no frame decoded at {:?}",
                        interval.number(),
                        search.attempted
                    );
                    return Err(SharpFramesError::IntervalExhausted {
                        interval: interval.number(),
                        attempted: search.attempted,
                    });
                }
            };

            picks.push(FramePick {
                interval: interval.number(),
                frame_index: candidate.frame_index,
                score: candidate.score,
                sharp,
                attempts,
            });
            frames.push(candidate.frame);
            tracker.advance(Some(candidate.frame_index));
        }

        if !unsharp_intervals.is_empty() {
            log::warn!(
                "No sharp frame found in intervals {:?}; using last sampled frame",
                unsharp_intervals
            );
        }

        Ok(SelectionResult {
            frames,
            picks,
            unsharp_intervals,
            diagnostics,
        })
    }

    /// Search a single interval.
    ///
    /// Reads candidates in policy order and stops at the first sharp frame.
    /// Failed reads are appended to `diagnostics` and logged at warn level.
    pub fn search_interval<S: FrameSource + ?Sized>(
        &self,
        source: &mut S,
        interval: &Interval,
        diagnostics: &mut SelectionDiagnostics,
    ) -> IntervalSearch {
        let candidates =
            self.options
                .policy
                .candidates(interval.start, interval.len, self.options.max_attempts);
        let mut attempted = Vec::with_capacity(candidates.len());
        let mut last_read: Option<Candidate> = None;

        for frame_index in candidates {
            attempted.push(frame_index);

            let read = match source.seek(frame_index) {
                Ok(()) => source.read_next(),
                Err(error) => {
                    self.record_failure(
                        diagnostics,
                        interval,
                        frame_index,
                        ReadFailureKind::Seek(error.to_string()),
                    );
                    continue;
                }
            };

            let frame = match read {
                FrameRead::Frame(frame) => frame,
                FrameRead::EndOfStream => {
                    self.record_failure(
                        diagnostics,
                        interval,
                        frame_index,
                        ReadFailureKind::EndOfStream,
                    );
                    continue;
                }
                FrameRead::DecodeError(reason) => {
                    self.record_failure(
                        diagnostics,
                        interval,
                        frame_index,
                        ReadFailureKind::Decode(reason),
                    );
                    continue;
                }
            };

            let score = sharpness::laplacian_variance(&frame);
            let candidate = Candidate {
                frame,
                frame_index,
                score,
            };
            if score >= self.options.blur_threshold {
                log::debug!(
                    "Interval {}: frame {} is sharp ({:.1})",
                    interval.number(),
                    frame_index,
                    score
                );
                return IntervalSearch {
                    outcome: IntervalOutcome::Sharp(candidate),
                    attempted,
                };
            }
            log::trace!(
                "Interval {}: frame {} is blurry ({:.1} < {})",
                interval.number(),
                frame_index,
                score,
                self.options.blur_threshold
            );
            last_read = Some(candidate);
        }

        let outcome = match last_read {
            Some(candidate) => IntervalOutcome::Fallback(candidate),
            None => IntervalOutcome::Exhausted,
        };
        IntervalSearch { outcome, attempted }
    }

    fn interval_count(
        &self,
        total_frames: u64,
        diagnostics: &mut SelectionDiagnostics,
    ) -> Result<usize, SharpFramesError> {
        let requested = self.options.num_frames;
        if total_frames >= requested as u64 {
            return Ok(requested);
        }
        match self.options.degenerate {
            DegeneratePolicy::Clamp if total_frames > 0 => {
                log::warn!(
                    "Video has only {total_frames} frame(s); selecting {total_frames} instead of {requested}"
                );
                diagnostics.clamped_from = Some(requested);
                Ok(total_frames as usize)
            }
            _ => Err(SharpFramesError::DegenerateInterval {
                total_frames,
                num_frames: requested,
            }),
        }
    }

    fn record_failure(
        &self,
        diagnostics: &mut SelectionDiagnostics,
        interval: &Interval,
        frame_index: u64,
        kind: ReadFailureKind,
    ) {
        let failure = ReadFailure {
            interval: interval.number(),
            frame_index,
            kind,
        };
        log::warn!("{failure}");
        diagnostics.read_failures.push(failure);
    }
}

/// Select `num_frames` frames with the default candidate policy.
///
/// Shorthand for building a [`FrameSelector`] from [`SelectionOptions`].
///
/// # Errors
///
/// See [`FrameSelector::select`].
pub fn select<S: FrameSource + ?Sized>(
    source: &mut S,
    num_frames: usize,
    blur_threshold: f64,
    max_attempts: usize,
) -> Result<SelectionResult, SharpFramesError> {
    let options = SelectionOptions::new()
        .with_num_frames(num_frames)
        .with_blur_threshold(blur_threshold)
        .with_max_attempts(max_attempts);
    FrameSelector::new(options).select(source)
}
