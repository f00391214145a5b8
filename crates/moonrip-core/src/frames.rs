use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};

use crate::{
    config::get_frames_dir,
    error::{MoonripError, Result},
    process::run_captured,
    progress::{ProgressSink, Stage},
    tools::{ExternalTool, Toolchain},
    types::Frame,
};

/// Evenly spaced sample points strictly inside `(0, duration)`:
/// `duration / (count + 1) * i` for `i` in `1..=count`.
pub fn sample_timestamps(duration: f64, count: usize) -> Vec<f64> {
    let interval = duration / (count as f64 + 1.0);
    (1..=count).map(|i| interval * i as f64).collect()
}

pub fn frame_file_name(index: usize) -> String {
    format!("frame_{index:03}.jpg")
}

/// Ask ffprobe for the container duration in seconds.
pub async fn probe_duration(prober: &ExternalTool, video_path: &Path) -> Result<f64> {
    let probe_failed = |reason: String| MoonripError::FrameExtractionFailed {
        video_path: video_path.to_path_buf(),
        reason,
    };

    let mut cmd = prober.command();
    cmd.arg("-v")
        .arg("error")
        .arg("-show_entries")
        .arg("format=duration")
        .arg("-of")
        .arg("default=noprint_wrappers=1:nokey=1")
        .arg(video_path);

    let output = run_captured(cmd)
        .await
        .map_err(|e| probe_failed(format!("failed to run {}: {e}", prober.display_name())))?;

    if !output.success() {
        return Err(probe_failed(format!(
            "failed to get video duration: {}",
            output.diagnostic()
        )));
    }

    let raw = output.stdout.trim();
    raw.parse::<f64>()
        .ok()
        .filter(|duration| duration.is_finite() && *duration > 0.0)
        .ok_or_else(|| probe_failed(format!("unparseable duration '{raw}'")))
}

/// Sample `count` frames from the video into a `frames` directory beside it.
///
/// Any single failed extraction aborts the whole operation.
pub async fn extract_frames(
    tools: &Toolchain,
    video_path: &Path,
    count: usize,
    progress: &dyn ProgressSink,
) -> Result<Vec<Frame>> {
    let transcoder = &tools.transcoder;
    let extraction_failed = |reason: String| MoonripError::FrameExtractionFailed {
        video_path: video_path.to_path_buf(),
        reason,
    };

    let frames_dir = get_frames_dir(video_path);
    fs::create_dir_all(&frames_dir)
        .await
        .map_err(|e| extraction_failed(format!("failed to create frames directory: {e}")))?;

    let duration = probe_duration(&tools.prober, video_path).await?;
    debug!(duration, count, "sampling frames");

    let mut frames = Vec::with_capacity(count);
    for (i, timestamp) in sample_timestamps(duration, count).into_iter().enumerate() {
        let frame_path: PathBuf = frames_dir.join(frame_file_name(i + 1));

        let mut cmd = transcoder.command();
        cmd.arg("-ss")
            .arg(timestamp.to_string())
            .arg("-i")
            .arg(video_path)
            .arg("-vframes")
            .arg("1")
            .arg("-q:v")
            .arg("2")
            .arg("-y")
            .arg(&frame_path);

        let output = run_captured(cmd).await.map_err(|e| {
            extraction_failed(format!("failed to run {}: {e}", transcoder.display_name()))
        })?;
        if !output.success() {
            return Err(extraction_failed(format!(
                "failed to extract frame at {timestamp:.2}s: {}",
                output.diagnostic()
            )));
        }

        frames.push(Frame {
            path: frame_path,
            timestamp,
        });
        progress.progress(Stage::ExtractFrames, (i + 1) as f64 / count as f64 * 100.0);
    }

    info!(count = frames.len(), "frames extracted");
    Ok(frames)
}
