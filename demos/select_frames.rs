//! Select sharp frames from a video and save them.
//!
//! Usage:
//!   cargo run --example select_frames -- <input_file> [output_dir]

use std::error::Error;

use sharpframes::{FrameSelector, SelectionOptions, VideoFile};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let input_path = args.next().unwrap_or_else(|| "input.mp4".to_string());
    let output_dir = args.next().unwrap_or_else(|| "shoppable_items".to_string());

    println!("Opening {input_path}...");
    let mut video = VideoFile::open(&input_path)?;

    let metadata = video.metadata();
    println!(
        "Video: {}x{}, {:.2} fps, {} frames",
        metadata.width, metadata.height, metadata.frames_per_second, metadata.frame_count,
    );

    let options = SelectionOptions::new()
        .with_num_frames(20)
        .with_blur_threshold(60.0)
        .with_max_attempts(5);
    let selection = FrameSelector::new(options).select(&mut video)?;
    print!("{selection}");

    for pick in selection.picks() {
        println!(
            "  interval {:>2}: frame {:>6} score {:>8.1}{}",
            pick.interval,
            pick.frame_index,
            pick.score,
            if pick.sharp { "" } else { " (fallback)" }
        );
    }

    let written = sharpframes::output::save_frames(selection.frames(), &output_dir)?;
    println!("Saved {} frame(s) to {output_dir}", written.len());

    Ok(())
}
