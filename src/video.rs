//! FFmpeg-backed [`FrameSource`].
//!
//! [`VideoFile`] opens a media file, locates its best video stream, and
//! decodes individual frames by index. Every read seeks the demuxer to the
//! nearest keyframe before the target and decodes forward until the target
//! frame is reached, so reads are independent of each other. The demuxer is
//! closed when the `VideoFile` is dropped.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    time::Duration,
};

use ffmpeg_next::{
    Rational,
    codec::context::Context as CodecContext,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::{DynamicImage, RgbImage};

use crate::{
    error::SharpFramesError,
    metadata::VideoMetadata,
    source::{FrameRead, FrameSource},
};

/// A video file opened for frame-by-index reading.
///
/// # Example
///
/// ```no_run
/// use sharpframes::{FrameSource, VideoFile};
///
/// let mut video = VideoFile::open("input.mp4")?;
/// println!("{} frames", video.frame_count());
/// let frame = video.frame(42)?;
/// frame.save("frame_42.png")?;
/// # Ok::<(), sharpframes::SharpFramesError>(())
/// ```
pub struct VideoFile {
    input_context: Input,
    video_stream_index: usize,
    metadata: VideoMetadata,
    path: PathBuf,
    position: u64,
}

impl Debug for VideoFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("VideoFile")
            .field("path", &self.path)
            .field("video_stream_index", &self.video_stream_index)
            .field("metadata", &self.metadata)
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}

impl VideoFile {
    /// Open a video file.
    ///
    /// Initialises FFmpeg (idempotent), opens the container, and reads the
    /// metadata of its best video stream.
    ///
    /// # Errors
    ///
    /// - [`SharpFramesError::FileOpen`] if the file cannot be opened or its
    ///   video stream has no usable frame rate.
    /// - [`SharpFramesError::NoVideoStream`] if the file has no video.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SharpFramesError> {
        let path = path.as_ref().to_path_buf();
        log::debug!("Opening video file: {}", path.display());

        ffmpeg_next::init().map_err(|error| SharpFramesError::FileOpen {
            path: path.clone(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| SharpFramesError::FileOpen {
                path: path.clone(),
                reason: error.to_string(),
            })?;

        let stream = input_context
            .streams()
            .best(Type::Video)
            .ok_or(SharpFramesError::NoVideoStream)?;
        let video_stream_index = stream.index();

        let decoder_context =
            CodecContext::from_parameters(stream.parameters()).map_err(|error| {
                SharpFramesError::FileOpen {
                    path: path.clone(),
                    reason: format!("Failed to read video codec parameters: {error}"),
                }
            })?;
        let decoder = decoder_context
            .decoder()
            .video()
            .map_err(|error| SharpFramesError::FileOpen {
                path: path.clone(),
                reason: format!("Failed to create video decoder: {error}"),
            })?;

        let frames_per_second = rational_to_f64(stream.avg_frame_rate())
            .or_else(|| rational_to_f64(stream.rate()))
            .ok_or_else(|| SharpFramesError::FileOpen {
                path: path.clone(),
                reason: "Video stream has no usable frame rate".to_string(),
            })?;

        let stream_duration = stream.duration();
        let duration = if stream_duration > 0 {
            let time_base = stream.time_base();
            Duration::from_secs_f64(
                stream_duration as f64 * time_base.numerator() as f64
                    / time_base.denominator() as f64,
            )
        } else if input_context.duration() > 0 {
            Duration::from_micros(input_context.duration() as u64)
        } else {
            Duration::ZERO
        };

        let frame_count = if stream.frames() > 0 {
            stream.frames() as u64
        } else {
            (duration.as_secs_f64() * frames_per_second) as u64
        };

        let codec = decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let metadata = VideoMetadata {
            width: decoder.width(),
            height: decoder.height(),
            frames_per_second,
            frame_count,
            duration,
            codec,
            format: input_context.format().name().to_string(),
        };

        log::info!(
            "Opened {}: {}x{} @ {:.2} fps, {} frames [{}]",
            path.display(),
            metadata.width,
            metadata.height,
            metadata.frames_per_second,
            metadata.frame_count,
            metadata.codec
        );

        Ok(Self {
            input_context,
            video_stream_index,
            metadata,
            path,
            position: 0,
        })
    }

    pub fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decode frame `frame_index` without moving the read cursor.
    ///
    /// # Errors
    ///
    /// - [`SharpFramesError::VideoDecodeError`] if the stream ends before the
    ///   frame is reached.
    /// - [`SharpFramesError::FfmpegError`] for demuxer or decoder failures.
    pub fn frame(&mut self, frame_index: u64) -> Result<DynamicImage, SharpFramesError> {
        self.decode_at(frame_index)?.ok_or_else(|| {
            SharpFramesError::VideoDecodeError(format!(
                "Could not locate frame {frame_index} in the video stream"
            ))
        })
    }

    /// Seek and decode forward to `frame_index`.
    ///
    /// `Ok(None)` means the stream ended before the frame was reached.
    fn decode_at(&mut self, frame_index: u64) -> Result<Option<DynamicImage>, SharpFramesError> {
        let video_stream_index = self.video_stream_index;
        let frames_per_second = self.metadata.frames_per_second;
        let (width, height) = (self.metadata.width, self.metadata.height);

        let stream = self
            .input_context
            .stream(video_stream_index)
            .ok_or(SharpFramesError::NoVideoStream)?;
        let time_base = stream.time_base();
        let decoder_context = CodecContext::from_parameters(stream.parameters())?;
        let mut decoder = decoder_context.decoder().video()?;

        let mut scaler = ScalingContext::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            Pixel::RGB24,
            width,
            height,
            ScalingFlags::BILINEAR,
        )?;

        // Container-level seek takes AV_TIME_BASE (microseconds).
        let target = frame_index_to_seek_timestamp(frame_index, frames_per_second);
        self.input_context.seek(target, ..target)?;

        let mut decoded_frame = VideoFrame::empty();
        let mut rgb_frame = VideoFrame::empty();

        for (stream, packet) in self.input_context.packets() {
            if stream.index() != video_stream_index {
                continue;
            }

            decoder.send_packet(&packet)?;

            while decoder.receive_frame(&mut decoded_frame).is_ok() {
                let pts = decoded_frame.pts().unwrap_or(0);
                // The seek may land past an index missing from the stream;
                // the first frame at or after it is the closest match.
                if pts_to_frame_index(pts, time_base, frames_per_second) >= frame_index {
                    scaler.run(&decoded_frame, &mut rgb_frame)?;
                    return convert_frame_to_image(&rgb_frame, width, height).map(Some);
                }
            }
        }

        decoder.send_eof()?;
        while decoder.receive_frame(&mut decoded_frame).is_ok() {
            let pts = decoded_frame.pts().unwrap_or(0);
            if pts_to_frame_index(pts, time_base, frames_per_second) >= frame_index {
                scaler.run(&decoded_frame, &mut rgb_frame)?;
                return convert_frame_to_image(&rgb_frame, width, height).map(Some);
            }
        }

        Ok(None)
    }
}

impl FrameSource for VideoFile {
    fn frame_count(&self) -> u64 {
        self.metadata.frame_count
    }

    fn seek(&mut self, index: u64) -> Result<(), SharpFramesError> {
        self.position = index;
        Ok(())
    }

    fn read_next(&mut self) -> FrameRead {
        if self.position >= self.metadata.frame_count {
            return FrameRead::EndOfStream;
        }
        match self.decode_at(self.position) {
            Ok(Some(image)) => {
                self.position += 1;
                FrameRead::Frame(image)
            }
            Ok(None) => FrameRead::EndOfStream,
            Err(error) => FrameRead::DecodeError(error.to_string()),
        }
    }
}

fn rational_to_f64(rate: Rational) -> Option<f64> {
    if rate.numerator() > 0 && rate.denominator() > 0 {
        Some(rate.numerator() as f64 / rate.denominator() as f64)
    } else {
        None
    }
}

fn frame_index_to_seek_timestamp(frame_index: u64, frames_per_second: f64) -> i64 {
    (frame_index as f64 / frames_per_second * 1_000_000.0) as i64
}

fn pts_to_frame_index(pts: i64, time_base: Rational, frames_per_second: f64) -> u64 {
    let seconds = pts as f64 * time_base.numerator() as f64 / time_base.denominator() as f64;
    // Round so that pts values stored a tick early still map to their frame.
    (seconds * frames_per_second).round().max(0.0) as u64
}

/// Convert a scaled RGB24 frame to an image, dropping per-row stride padding.
fn convert_frame_to_image(
    rgb_frame: &VideoFrame,
    width: u32,
    height: u32,
) -> Result<DynamicImage, SharpFramesError> {
    let stride = rgb_frame.stride(0);
    let row_bytes = width as usize * 3;
    let data = rgb_frame.data(0);

    let buffer = if stride == row_bytes {
        data[..row_bytes * height as usize].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(row_bytes * height as usize);
        for row in 0..height as usize {
            let start = row * stride;
            buffer.extend_from_slice(&data[start..start + row_bytes]);
        }
        buffer
    };

    let rgb_image = RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
        SharpFramesError::VideoDecodeError(
            "Failed to construct RGB image from decoded frame data".to_string(),
        )
    })?;
    Ok(DynamicImage::ImageRgb8(rgb_image))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seek_timestamp_is_microseconds() {
        assert_eq!(frame_index_to_seek_timestamp(50, 25.0), 2_000_000);
        assert_eq!(frame_index_to_seek_timestamp(0, 30.0), 0);
    }

    #[test]
    fn pts_maps_back_to_frame_index() {
        let time_base = Rational::new(1, 12_800);
        // Frame 10 at 25 fps is 0.4 s = 5120 ticks.
        assert_eq!(pts_to_frame_index(5120, time_base, 25.0), 10);
        assert_eq!(pts_to_frame_index(5119, time_base, 25.0), 10);
        assert_eq!(pts_to_frame_index(-512, time_base, 25.0), 0);
    }

    #[test]
    fn unusable_rates_are_rejected() {
        assert_eq!(rational_to_f64(Rational::new(0, 1)), None);
        assert_eq!(rational_to_f64(Rational::new(30, 0)), None);
        assert_eq!(rational_to_f64(Rational::new(30_000, 1001)).map(f64::round), Some(30.0));
    }
}
