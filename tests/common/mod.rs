//! In-memory frame sources shared by the integration tests.

#![allow(dead_code)]

use image::{DynamicImage, GrayImage, Luma};
use sharpframes::{FrameRead, FrameSource, SharpFramesError};

/// A one-pixel checkerboard; its Laplacian variance is far above any
/// practical blur threshold.
pub fn sharp_frame() -> DynamicImage {
    let image = GrayImage::from_fn(16, 16, |x, y| {
        if (x + y) % 2 == 0 { Luma([255]) } else { Luma([0]) }
    });
    DynamicImage::ImageLuma8(image)
}

/// A flat frame; its Laplacian variance is zero.
pub fn blurry_frame(level: u8) -> DynamicImage {
    DynamicImage::ImageLuma8(GrayImage::from_pixel(16, 16, Luma([level])))
}

/// Frames held in memory. `None` entries fail to decode.
pub struct FakeSource {
    frames: Vec<Option<DynamicImage>>,
    reported_count: u64,
    cursor: u64,
    unseekable: Vec<u64>,
    pub seeks: Vec<u64>,
    pub reads: usize,
}

impl FakeSource {
    pub fn new(frames: Vec<Option<DynamicImage>>) -> Self {
        let reported_count = frames.len() as u64;
        Self {
            frames,
            reported_count,
            cursor: 0,
            unseekable: Vec::new(),
            seeks: Vec::new(),
            reads: 0,
        }
    }

    /// `count` flat frames, each a different grey level.
    pub fn blurry(count: usize) -> Self {
        Self::new((0..count).map(|i| Some(blurry_frame((i % 256) as u8))).collect())
    }

    /// Report a frame count that differs from the frames actually held.
    pub fn with_reported_count(mut self, count: u64) -> Self {
        self.reported_count = count;
        self
    }

    pub fn set_sharp(&mut self, index: usize) {
        self.frames[index] = Some(sharp_frame());
    }

    pub fn set_broken(&mut self, index: usize) {
        self.frames[index] = None;
    }

    pub fn set_unseekable(&mut self, index: u64) {
        self.unseekable.push(index);
    }

    pub fn frame_at(&self, index: usize) -> Option<&DynamicImage> {
        self.frames.get(index).and_then(Option::as_ref)
    }
}

impl FrameSource for FakeSource {
    fn frame_count(&self) -> u64 {
        self.reported_count
    }

    fn seek(&mut self, index: u64) -> Result<(), SharpFramesError> {
        self.seeks.push(index);
        if self.unseekable.contains(&index) {
            return Err(SharpFramesError::FfmpegError(format!("cannot seek to {index}")));
        }
        self.cursor = index;
        Ok(())
    }

    fn read_next(&mut self) -> FrameRead {
        self.reads += 1;
        match self.frames.get(self.cursor as usize) {
            None => FrameRead::EndOfStream,
            Some(None) => FrameRead::DecodeError(format!("corrupt packet at {}", self.cursor)),
            Some(Some(frame)) => {
                self.cursor += 1;
                FrameRead::Frame(frame.clone())
            }
        }
    }
}
