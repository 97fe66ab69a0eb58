//! Video download via `yt-dlp`.
//!
//! Fetches the opening seconds of a remote video so it can be fed to
//! [`VideoFile::open`](crate::VideoFile::open). Requires `yt-dlp` and
//! `ffmpeg` on `PATH`.

use std::{
    path::{Path, PathBuf},
    process::Command,
    time::Duration,
};

use crate::error::SharpFramesError;

/// Name of the downloader executable.
pub const DOWNLOADER: &str = "yt-dlp";

/// Length of the clip fetched when no limit is given.
pub const DEFAULT_CLIP_LENGTH: Duration = Duration::from_secs(60);

/// Arguments passed to `yt-dlp` for a download limited to `max_length`.
pub fn downloader_args(url: &str, output: &Path, max_length: Duration) -> Vec<String> {
    vec![
        "--downloader".to_string(),
        "ffmpeg".to_string(),
        "--downloader-args".to_string(),
        format!("ffmpeg:-t {}", max_length.as_secs().max(1)),
        "-o".to_string(),
        output.display().to_string(),
        url.to_string(),
    ]
}

/// Download at most `max_length` of `url` to `output`.
///
/// # Errors
///
/// - [`SharpFramesError::IoError`] if `yt-dlp` cannot be started.
/// - [`SharpFramesError::DownloadError`] if it exits unsuccessfully.
pub fn download<P: AsRef<Path>>(
    url: &str,
    output: P,
    max_length: Duration,
) -> Result<PathBuf, SharpFramesError> {
    let output = output.as_ref();
    let args = downloader_args(url, output, max_length);
    log::info!("Downloading {url} to {}", output.display());
    log::debug!("{DOWNLOADER} {}", args.join(" "));

    let result = Command::new(DOWNLOADER).args(&args).output()?;
    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        let reason = stderr
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("{DOWNLOADER} exited with {}", result.status));
        return Err(SharpFramesError::DownloadError {
            url: url.to_string(),
            reason,
        });
    }

    Ok(output.to_path_buf())
}
