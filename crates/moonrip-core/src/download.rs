use std::path::Path;

use tokio::fs;
use tracing::{debug, info};

use crate::{
    error::{MoonripError, Result},
    process::run_streaming,
    progress::{ProgressSink, Stage, parse_download_percent},
    tools::Toolchain,
    types::VideoInfo,
    workdir::find_media,
};

const METADATA_TEMPLATE: &str = "after_move:%(id)s|%(title)s|%(artist,uploader)s|%(thumbnail)s";

/// The `id|title|artist|thumbnail` line yt-dlp prints after moving the file.
#[derive(Debug, Default, PartialEq)]
pub struct DownloadMetadata {
    pub id: Option<String>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub thumbnail: Option<String>,
}

fn field(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty() && *value != "NA")
        .map(str::to_string)
}

/// Take the last pipe-delimited line of yt-dlp stdout.
pub fn parse_metadata(stdout: &str) -> DownloadMetadata {
    let Some(line) = stdout
        .lines()
        .rev()
        .find(|line| line.matches('|').count() >= 3)
    else {
        return DownloadMetadata::default();
    };

    let mut parts = line.splitn(4, '|');
    DownloadMetadata {
        id: field(parts.next()),
        title: field(parts.next()),
        artist: field(parts.next()),
        thumbnail: field(parts.next()),
    }
}

/// Download a video from URL using yt-dlp into `work_dir`
pub async fn download_video(
    tools: &Toolchain,
    url: &str,
    work_dir: &Path,
    progress: &dyn ProgressSink,
) -> Result<VideoInfo> {
    let downloader = &tools.downloader;
    let download_failed = |reason: String| MoonripError::DownloadFailed {
        url: url.to_string(),
        reason,
    };

    fs::create_dir_all(work_dir)
        .await
        .map_err(|e| download_failed(format!("failed to create working directory: {e}")))?;

    let output_template = work_dir.join("%(id)s.%(ext)s");
    let mut cmd = downloader.command();
    cmd.arg("--no-playlist")
        .arg("--write-thumbnail")
        .arg("--convert-thumbnails")
        .arg("jpg")
        .arg("-f")
        .arg("bestvideo*+bestaudio/best")
        .arg("-o")
        .arg(&output_template)
        .arg("--print")
        .arg(METADATA_TEMPLATE)
        .arg("--progress")
        .arg("--newline")
        .arg(url);

    let output = run_streaming(cmd, |line| {
        if let Some(percent) = parse_download_percent(line) {
            progress.progress(Stage::Download, percent);
        }
    })
    .await
    .map_err(|e| download_failed(format!("failed to run {}: {e}", downloader.display_name())))?;

    if !output.success() {
        return Err(download_failed(output.diagnostic()));
    }

    let metadata = parse_metadata(&output.stdout);
    debug!(?metadata, "yt-dlp metadata");

    let media = find_media(work_dir)
        .map_err(|e| download_failed(format!("failed to list working directory: {e}")))?;
    let id = metadata.id.as_deref();
    let Some(video_path) = media.first_video(id).cloned() else {
        return Err(download_failed(
            "no video file found after download; yt-dlp produced an unexpected set of files"
                .to_string(),
        ));
    };

    let info = VideoInfo {
        video_path,
        audio_path: media.first_audio(id).cloned(),
        title: metadata.title.unwrap_or_else(|| "Unknown".to_string()),
        artist: metadata.artist,
        thumbnail: metadata.thumbnail,
    };
    info!(video = %info.video_path.display(), title = %info.title, "download complete");

    Ok(info)
}
