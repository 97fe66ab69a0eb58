//! Random-access frame sources.
//!
//! [`FrameSource`] is the capability the selector needs from a video: a frame
//! count, a cursor that can be moved to any frame index, and a sequential
//! read at the cursor. [`VideoFile`](crate::VideoFile) implements it on top
//! of FFmpeg; tests implement it with in-memory frame lists.

use image::DynamicImage;

use crate::error::SharpFramesError;

/// Outcome of a single [`FrameSource::read_next`] call.
#[derive(Debug, Clone)]
pub enum FrameRead {
    /// A frame was decoded at the cursor position.
    Frame(DynamicImage),
    /// The cursor is at or past the last decodable frame.
    EndOfStream,
    /// The packet data at the cursor could not be decoded.
    DecodeError(String),
}

/// A video that can be sought by frame index and read one frame at a time.
///
/// A source holds a single cursor. Callers needing concurrent access must open
/// one source per caller.
pub trait FrameSource {
    /// Total decodable frame count (may be an estimate for some containers).
    fn frame_count(&self) -> u64;

    /// Move the cursor so the next [`read_next`](FrameSource::read_next)
    /// returns frame `index` (0-based).
    ///
    /// # Errors
    ///
    /// Implementations return an error when the underlying demuxer cannot
    /// seek. The selector treats this like a failed read.
    fn seek(&mut self, index: u64) -> Result<(), SharpFramesError>;

    /// Decode the frame at the cursor and advance the cursor by one.
    fn read_next(&mut self) -> FrameRead;
}

impl<S: FrameSource + ?Sized> FrameSource for &mut S {
    fn frame_count(&self) -> u64 {
        (**self).frame_count()
    }

    fn seek(&mut self, index: u64) -> Result<(), SharpFramesError> {
        (**self).seek(index)
    }

    fn read_next(&mut self) -> FrameRead {
        (**self).read_next()
    }
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn frame_count(&self) -> u64 {
        (**self).frame_count()
    }

    fn seek(&mut self, index: u64) -> Result<(), SharpFramesError> {
        (**self).seek(index)
    }

    fn read_next(&mut self) -> FrameRead {
        (**self).read_next()
    }
}
