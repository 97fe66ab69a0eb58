//! Print the Laplacian variance of evenly spaced frames.
//!
//! Usage:
//!   cargo run --example score_frames -- <input_file> [samples]

use std::error::Error;

use sharpframes::{DEFAULT_BLUR_THRESHOLD, FrameRead, FrameSource, VideoFile, laplacian_variance};

fn main() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let input_path = args.next().unwrap_or_else(|| "input.mp4".to_string());
    let samples: u64 = match args.next() {
        Some(value) => value.parse()?,
        None => 10,
    };

    let mut video = VideoFile::open(&input_path)?;
    let frame_count = video.frame_count();
    let step = (frame_count / samples.max(1)).max(1);

    for frame_index in (0..frame_count).step_by(step as usize).take(samples as usize) {
        video.seek(frame_index)?;
        match video.read_next() {
            FrameRead::Frame(frame) => {
                let score = laplacian_variance(&frame);
                let verdict = if score >= DEFAULT_BLUR_THRESHOLD { "sharp" } else { "blurry" };
                println!("frame {frame_index:>6}: {score:>10.2} {verdict}");
            }
            FrameRead::EndOfStream => break,
            FrameRead::DecodeError(reason) => println!("frame {frame_index:>6}: {reason}"),
        }
    }

    Ok(())
}
