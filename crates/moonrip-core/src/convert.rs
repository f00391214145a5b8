use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::{
    error::{MoonripError, Result},
    process::run_streaming,
    progress::{ProgressSink, Stage, TranscodeProgress},
    tools::Toolchain,
    types::{AudioFormat, VideoInfo},
};

/// Where the converted audio lands: next to the video, same stem.
pub fn get_converted_path(video_path: &Path, format: AudioFormat) -> PathBuf {
    video_path.with_extension(format.extension())
}

fn already_in_format(audio_path: &Path, format: AudioFormat) -> bool {
    audio_path
        .extension()
        .and_then(|ext| AudioFormat::from_extension(&ext.to_string_lossy()))
        == Some(format)
}

/// Produce audio in `format` from the downloaded media.
///
/// Audio that yt-dlp already extracted in the right container is returned
/// untouched and ffmpeg never runs.
pub async fn convert_audio(
    tools: &Toolchain,
    video: &VideoInfo,
    format: AudioFormat,
    progress: &dyn ProgressSink,
) -> Result<PathBuf> {
    if let Some(audio_path) = &video.audio_path
        && already_in_format(audio_path, format)
    {
        debug!(path = %audio_path.display(), "audio already in target format");
        return Ok(audio_path.clone());
    }

    let transcoder = &tools.transcoder;
    let conversion_failed = |reason: String| MoonripError::ConversionFailed {
        format: format.name().to_string(),
        reason,
    };

    let config = format.config();
    let input = video.audio_path.as_ref().unwrap_or(&video.video_path);
    let output_path = get_converted_path(&video.video_path, format);
    if output_path == *input {
        return Err(conversion_failed(format!(
            "{} would overwrite its own input",
            output_path.display()
        )));
    }

    let mut cmd = transcoder.command();
    cmd.arg("-i")
        .arg(input)
        .arg("-vn")
        .arg("-acodec")
        .arg(config.codec)
        .args(config.quality_args)
        .arg("-metadata")
        .arg(format!("title={}", video.title));
    if let Some(artist) = &video.artist {
        cmd.arg("-metadata").arg(format!("artist={artist}"));
    }
    cmd.arg("-y").arg(&output_path);

    let mut tracker = TranscodeProgress::new();
    let output = run_streaming(cmd, |line| {
        if let Some(percent) = tracker.observe(line) {
            progress.progress(Stage::Convert, percent);
        }
    })
    .await
    .map_err(|e| conversion_failed(format!("failed to run {}: {e}", transcoder.display_name())))?;

    if !output.success() {
        return Err(conversion_failed(output.diagnostic()));
    }

    info!(path = %output_path.display(), %format, "conversion complete");
    Ok(output_path)
}
