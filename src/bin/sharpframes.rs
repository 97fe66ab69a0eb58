use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use sharpframes::{
    CandidatePolicy, DEFAULT_BLUR_THRESHOLD, DEFAULT_MAX_ATTEMPTS, DEFAULT_NUM_FRAMES,
    DegeneratePolicy, Detector, FfmpegLogLevel, FramePick, FrameSelector, FrameSource, NoDetector,
    NoOpProgress, OperationType, ProgressCallback, ProgressInfo, SelectionOptions,
    SelectionResult, VideoFile, VideoMetadata, acquire, annotate, output,
};

#[cfg(feature = "yolo")]
use sharpframes::YoloDetector;

const CLI_AFTER_HELP: &str = "Examples:\n  sharpframes select input.mp4 --out frames --frames 20 --threshold 80\n  sharpframes run input.mp4 --out shoppable_items --model yolov8s.onnx --progress\n  sharpframes score input.mp4 --frame 0 --frame 120\n  sharpframes fetch https://www.youtube.com/watch?v=7TKZRc2Cn00 --out video.mp4\n  sharpframes completions zsh > _sharpframes";

/// Blur threshold used by `run`, tuned for product footage.
const RUN_BLUR_THRESHOLD: f64 = 60.0;

#[derive(Debug, Parser)]
#[command(
    name = "sharpframes",
    version,
    about = "Pick sharp representative frames from a video and annotate detected objects",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show debug logging (RUST_LOG overrides).
    #[arg(long, global = true)]
    verbose: bool,

    /// Show a progress bar.
    #[arg(long, global = true)]
    progress: bool,

    /// Allow writing into an existing output directory or file.
    #[arg(long, global = true)]
    overwrite: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    EvenlySpaced,
    Consecutive,
}

impl From<PolicyArg> for CandidatePolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::EvenlySpaced => CandidatePolicy::EvenlySpaced,
            PolicyArg::Consecutive => CandidatePolicy::Consecutive,
        }
    }
}

#[derive(Debug, Args, Clone)]
struct SelectionArgs {
    /// Number of frames (intervals) to select.
    #[arg(long, default_value_t = DEFAULT_NUM_FRAMES)]
    frames: usize,
    /// Minimum Laplacian variance for a sharp frame.
    #[arg(long)]
    threshold: Option<f64>,
    /// Read attempts per interval.
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    attempts: usize,
    /// Where attempts are placed within an interval.
    #[arg(long, value_enum, default_value_t = PolicyArg::EvenlySpaced)]
    policy: PolicyArg,
    /// Select fewer frames instead of failing when the video is too short.
    #[arg(long)]
    clamp: bool,
    /// Output image extension (jpg, png, bmp, tiff).
    #[arg(long, default_value = output::DEFAULT_EXTENSION)]
    ext: String,
    /// Print a machine-readable JSON summary.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Select sharp frames and save them.
    #[command(
        about = "Select sharp frames",
        after_help = "Examples:\n  sharpframes select input.mp4 --out frames\n  sharpframes select input.mp4 --out frames --frames 10 --attempts 8 --policy consecutive --json"
    )]
    Select {
        /// Input video path.
        input: PathBuf,
        /// Output directory.
        #[arg(long)]
        out: PathBuf,
        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Select frames, run object detection, and save annotated frames.
    #[command(
        about = "Select, detect, annotate, and save",
        after_help = "Examples:\n  sharpframes run input.mp4 --out shoppable_items --model yolov8s.onnx"
    )]
    Run {
        /// Input video path.
        input: PathBuf,
        /// Output directory.
        #[arg(long)]
        out: PathBuf,
        /// YOLOv8 ONNX model (requires the `yolo` feature).
        #[arg(long)]
        model: Option<PathBuf>,
        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Print the Laplacian variance of frames.
    #[command(about = "Score frame sharpness")]
    Score {
        /// Input video path.
        input: PathBuf,
        /// Frame index to score (repeatable). Defaults to 10 evenly spaced frames.
        #[arg(long = "frame")]
        frames: Vec<u64>,
        /// Minimum Laplacian variance reported as sharp.
        #[arg(long, default_value_t = DEFAULT_BLUR_THRESHOLD)]
        threshold: f64,
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Download the opening of a remote video with yt-dlp.
    #[command(about = "Download a video clip")]
    Fetch {
        /// Video URL.
        url: String,
        /// Output file path.
        #[arg(long)]
        out: PathBuf,
        /// Maximum clip length in seconds.
        #[arg(long, default_value_t = acquire::DEFAULT_CLIP_LENGTH.as_secs())]
        seconds: u64,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let bar = ProgressBar::new(0);
        let style =
            ProgressStyle::with_template("{spinner:.green} {msg:>10} {bar:40.cyan/blue} {pos}/{len}")?;
        bar.set_style(style.progress_chars("##-"));
        Ok(Self { bar })
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        let label = match info.operation {
            OperationType::FrameSelection => "selecting",
            OperationType::Detection => "detecting",
            OperationType::Saving => "saving",
            _ => "working",
        };
        if let Some(total) = info.total {
            self.bar.set_length(total);
        }
        self.bar.set_message(label);
        self.bar.set_position(info.current);
        if info.total == Some(info.current) {
            self.bar.finish_and_clear();
            self.bar.reset();
        }
    }
}

fn init_logging(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    let filter = if global.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(filter)
        .parse_default_env()
        .init();

    let ffmpeg_level = match &global.log_level {
        Some(level) => level.parse::<FfmpegLogLevel>()?,
        None => FfmpegLogLevel::for_log_filter(filter),
    };
    sharpframes::set_ffmpeg_log_level(ffmpeg_level);
    Ok(())
}

fn progress_callback(
    global: &GlobalOptions,
) -> Result<Option<Arc<dyn ProgressCallback>>, Box<dyn std::error::Error>> {
    if global.progress {
        Ok(Some(Arc::new(TerminalProgress::new()?)))
    } else {
        Ok(None)
    }
}

fn selection_options(
    args: &SelectionArgs,
    default_threshold: f64,
    progress: Option<Arc<dyn ProgressCallback>>,
) -> SelectionOptions {
    let mut options = SelectionOptions::new()
        .with_num_frames(args.frames)
        .with_blur_threshold(args.threshold.unwrap_or(default_threshold))
        .with_max_attempts(args.attempts)
        .with_policy(args.policy.into());
    if args.clamp {
        options = options.with_degenerate_policy(DegeneratePolicy::Clamp);
    }
    if let Some(callback) = progress {
        options = options.with_progress(callback);
    }
    options
}

fn ensure_output_dir(path: &Path, overwrite: bool) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() {
        if !overwrite {
            return Err(format!(
                "output directory already exists: {} (use --overwrite)",
                path.display()
            )
            .into());
        }
        eprintln!(
            "{} {}",
            "warning:".yellow().bold(),
            format!("writing into existing directory {}", path.display()).yellow()
        );
    }
    Ok(())
}

fn ensure_writable_path(path: &Path, overwrite: bool) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() {
        if !overwrite {
            return Err(format!(
                "output already exists: {} (use --overwrite to replace)",
                path.display()
            )
            .into());
        }
        eprintln!(
            "{} {}",
            "warning:".yellow().bold(),
            format!("overwriting {}", path.display()).yellow()
        );
    }
    Ok(())
}

#[cfg(feature = "yolo")]
fn build_detector(model: Option<&Path>) -> Result<Box<dyn Detector>, Box<dyn std::error::Error>> {
    match model {
        Some(path) => Ok(Box::new(YoloDetector::new(path)?)),
        None => Ok(Box::new(NoDetector)),
    }
}

#[cfg(not(feature = "yolo"))]
fn build_detector(model: Option<&Path>) -> Result<Box<dyn Detector>, Box<dyn std::error::Error>> {
    if model.is_some() {
        eprintln!(
            "{} {}",
            "warning:".yellow().bold(),
            "--model requires building with the `yolo` feature; saving frames without detections"
                .yellow()
        );
    }
    Ok(Box::new(NoDetector))
}

fn pick_summary(pick: &FramePick, path: &Path, metadata: &VideoMetadata) -> serde_json::Value {
    json!({
        "interval": pick.interval,
        "frame_index": pick.frame_index,
        "timestamp_seconds": metadata.timestamp_of(pick.frame_index).as_secs_f64(),
        "score": pick.score,
        "sharp": pick.sharp,
        "attempts": pick.attempts,
        "path": path.display().to_string(),
    })
}

fn report_selection(
    selection: &SelectionResult,
    metadata: &VideoMetadata,
    written: &[PathBuf],
    out: &Path,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        let frames: Vec<_> = selection
            .picks()
            .iter()
            .zip(written)
            .map(|(pick, path)| pick_summary(pick, path, metadata))
            .collect();
        let failures: Vec<String> = selection
            .diagnostics()
            .read_failures
            .iter()
            .map(ToString::to_string)
            .collect();
        let payload = json!({
            "output_dir": out.display().to_string(),
            "frames": frames,
            "unsharp_intervals": selection.unsharp_intervals(),
            "read_failures": failures,
            "clamped_from": selection.diagnostics().clamped_from,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if !selection.unsharp_intervals().is_empty() {
        let numbers: Vec<String> = selection
            .unsharp_intervals()
            .iter()
            .map(ToString::to_string)
            .collect();
        eprintln!(
            "{} {}",
            "warning:".yellow().bold(),
            format!(
                "No sharp frame found in intervals [{}]. Using last sampled frame.",
                numbers.join(", ")
            )
            .yellow()
        );
    }
    println!(
        "{} {}",
        "success:".green().bold(),
        format!("Saved {} frame(s) to {}", written.len(), out.display()).green()
    );
    Ok(())
}

fn default_score_indices(frame_count: u64) -> Vec<u64> {
    let samples = frame_count.min(10);
    if samples == 0 {
        return Vec::new();
    }
    let step = frame_count / samples;
    (0..samples).map(|i| i * step).collect()
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli.global)?;

    match cli.command {
        Commands::Select {
            input,
            out,
            selection,
        } => {
            ensure_output_dir(&out, cli.global.overwrite)?;
            let progress = progress_callback(&cli.global)?;
            let options = selection_options(&selection, DEFAULT_BLUR_THRESHOLD, progress.clone());

            let mut video = VideoFile::open(&input)?;
            let result = FrameSelector::new(options).select(&mut video)?;

            let written = output::save_frames_as(
                result.frames(),
                &out,
                &selection.ext,
                progress.unwrap_or_else(|| Arc::new(NoOpProgress)),
            )?;
            report_selection(&result, video.metadata(), &written, &out, selection.json)?;
        }
        Commands::Run {
            input,
            out,
            model,
            selection,
        } => {
            ensure_output_dir(&out, cli.global.overwrite)?;
            let mut detector = build_detector(model.as_deref())?;
            let progress = progress_callback(&cli.global)?;
            let options = selection_options(&selection, RUN_BLUR_THRESHOLD, progress.clone());

            let mut video = VideoFile::open(&input)?;
            let result = FrameSelector::new(options).select(&mut video)?;

            let progress: Arc<dyn ProgressCallback> =
                progress.unwrap_or_else(|| Arc::new(NoOpProgress));
            let annotated = annotate::detect_and_annotate_with_progress(
                result.frames(),
                &mut detector,
                progress.clone(),
            )?;
            let written = output::save_frames_as(&annotated, &out, &selection.ext, progress)?;
            report_selection(&result, video.metadata(), &written, &out, selection.json)?;
        }
        Commands::Score {
            input,
            frames,
            threshold,
            json,
        } => {
            let mut video = VideoFile::open(&input)?;
            let indices = if frames.is_empty() {
                default_score_indices(video.frame_count())
            } else {
                frames
            };

            let mut scores = Vec::with_capacity(indices.len());
            for index in indices {
                let image = video.frame(index)?;
                scores.push((index, sharpframes::laplacian_variance(&image)));
            }

            if json {
                let payload: Vec<_> = scores
                    .iter()
                    .map(|(index, score)| {
                        json!({
                            "frame_index": index,
                            "timestamp_seconds": video.metadata().timestamp_of(*index).as_secs_f64(),
                            "score": score,
                            "sharp": *score >= threshold,
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                for (index, score) in scores {
                    let verdict = if score >= threshold {
                        "sharp".green()
                    } else {
                        "blurry".red()
                    };
                    let seconds = video.metadata().timestamp_of(index).as_secs_f64();
                    println!("frame {index:>6} ({seconds:>8.2}s): {score:>10.2} {verdict}");
                }
            }
        }
        Commands::Fetch { url, out, seconds } => {
            ensure_writable_path(&out, cli.global.overwrite)?;
            let path = acquire::download(&url, &out, Duration::from_secs(seconds))?;
            println!("{} {}", "saved".green().bold(), path.display());
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "sharpframes", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use std::{path::Path, time::Duration};

    use super::{Cli, default_score_indices, pick_summary};
    use clap::Parser;
    use sharpframes::{FramePick, VideoMetadata};

    #[test]
    fn score_defaults_spread_over_video() {
        assert_eq!(default_score_indices(100), vec![0, 10, 20, 30, 40, 50, 60, 70, 80, 90]);
        assert_eq!(default_score_indices(3), vec![0, 1, 2]);
        assert!(default_score_indices(0).is_empty());
    }

    #[test]
    fn select_defaults_match_library() {
        let cli = Cli::try_parse_from(["sharpframes", "select", "in.mp4", "--out", "frames"]).unwrap();
        match cli.command {
            super::Commands::Select { selection, .. } => {
                assert_eq!(selection.frames, sharpframes::DEFAULT_NUM_FRAMES);
                assert_eq!(selection.attempts, sharpframes::DEFAULT_MAX_ATTEMPTS);
                assert_eq!(selection.threshold, None);
                assert_eq!(selection.ext, "jpg");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn policy_flag_parses() {
        let cli = Cli::try_parse_from([
            "sharpframes",
            "run",
            "in.mp4",
            "--out",
            "o",
            "--policy",
            "consecutive",
            "--clamp",
        ])
        .unwrap();
        match cli.command {
            super::Commands::Run { selection, model, .. } => {
                assert!(matches!(selection.policy, super::PolicyArg::Consecutive));
                assert!(selection.clamp);
                assert!(model.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn score_threshold_flag() {
        let cli = Cli::try_parse_from(["sharpframes", "score", "in.mp4", "--threshold", "42.5"])
            .unwrap();
        match cli.command {
            super::Commands::Score { threshold, .. } => assert_eq!(threshold, 42.5),
            other => panic!("unexpected command {other:?}"),
        }

        let cli = Cli::try_parse_from(["sharpframes", "score", "in.mp4"]).unwrap();
        match cli.command {
            super::Commands::Score { threshold, .. } => {
                assert_eq!(threshold, sharpframes::DEFAULT_BLUR_THRESHOLD)
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn summary_includes_timestamp() {
        let metadata = VideoMetadata {
            width: 640,
            height: 360,
            frames_per_second: 25.0,
            frame_count: 500,
            duration: Duration::from_secs(20),
            codec: "h264".to_string(),
            format: "mp4".to_string(),
        };
        let pick = FramePick {
            interval: 3,
            frame_index: 50,
            score: 120.0,
            sharp: true,
            attempts: 1,
        };
        let summary = pick_summary(&pick, Path::new("out/frame_03.jpg"), &metadata);
        assert_eq!(summary["timestamp_seconds"], 2.0);
        assert_eq!(summary["frame_index"], 50);
        assert_eq!(summary["path"], "out/frame_03.jpg");
    }
}
