//! Video stream metadata.
//!
//! [`VideoMetadata`] is read once when a [`VideoFile`](crate::VideoFile) is
//! opened and cached for its lifetime.

use std::time::Duration;

/// Metadata for the video stream a [`VideoFile`](crate::VideoFile) reads.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct VideoMetadata {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second (average rate for variable-frame-rate content).
    pub frames_per_second: f64,
    /// Decodable frame count. Taken from the stream header when present,
    /// otherwise estimated from duration and frame rate.
    pub frame_count: u64,
    /// Stream duration, falling back to the container duration.
    pub duration: Duration,
    /// Codec name (e.g. `"h264"`, `"vp9"`, `"av1"`).
    pub codec: String,
    /// Container format name (e.g. `"mov,mp4,m4a,3gp,3g2,mj2"`).
    pub format: String,
}

impl VideoMetadata {
    /// Presentation time of a frame index, from the average frame rate.
    pub fn timestamp_of(&self, frame_index: u64) -> Duration {
        if self.frames_per_second > 0.0 {
            Duration::from_secs_f64(frame_index as f64 / self.frames_per_second)
        } else {
            Duration::ZERO
        }
    }
}
