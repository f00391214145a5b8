use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};

use crate::{
    error::{MoonripError, Result},
    process::run_captured,
    tools::Toolchain,
    types::AudioFormat,
};

/// `<stem>_with_cover.<ext>` next to the audio file.
pub fn get_muxed_path(audio_path: &Path) -> PathBuf {
    let stem = audio_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio".to_string());
    let file_name = match audio_path.extension() {
        Some(ext) => format!("{stem}_with_cover.{}", ext.to_string_lossy()),
        None => format!("{stem}_with_cover"),
    };
    audio_path.with_file_name(file_name)
}

/// `<output_dir>/<audio basename>`, keeping the original extension.
pub fn get_final_path(audio_path: &Path, output_dir: &Path) -> PathBuf {
    output_dir.join(audio_path.file_name().unwrap_or(audio_path.as_os_str()))
}

fn cover_args(format: Option<AudioFormat>) -> &'static [&'static str] {
    match format {
        Some(AudioFormat::Mp3) => &[
            "-id3v2_version",
            "3",
            "-metadata:s:v",
            "title=Album cover",
            "-metadata:s:v",
            "comment=Cover (front)",
        ],
        _ => &["-disposition:v:0", "attached_pic"],
    }
}

/// Mux `cover_path` into `audio_path` as the front cover and copy the result
/// into `output_dir` (the current directory when `None`).
///
/// WAV has no attached-picture support: the audio is copied as-is and the
/// cover is written beside it as `<stem>.jpg`.
pub async fn embed_cover_art(
    tools: &Toolchain,
    audio_path: &Path,
    cover_path: &Path,
    output_dir: Option<&Path>,
) -> Result<PathBuf> {
    let embed_failed = |reason: String| MoonripError::EmbedFailed {
        audio_path: audio_path.to_path_buf(),
        reason,
    };

    let output_dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir()?,
    };
    fs::create_dir_all(&output_dir)
        .await
        .map_err(|e| embed_failed(format!("failed to create {}: {e}", output_dir.display())))?;

    let final_path = get_final_path(audio_path, &output_dir);
    let format = audio_path
        .extension()
        .and_then(|ext| AudioFormat::from_extension(&ext.to_string_lossy()));

    if format.is_some_and(|format| !format.supports_cover_art()) {
        fs::copy(audio_path, &final_path)
            .await
            .map_err(|e| embed_failed(format!("failed to copy to output directory: {e}")))?;
        let sidecar = final_path.with_extension("jpg");
        fs::copy(cover_path, &sidecar)
            .await
            .map_err(|e| embed_failed(format!("failed to write cover sidecar: {e}")))?;
        info!(path = %final_path.display(), cover = %sidecar.display(), "container has no cover support, wrote sidecar");
        return Ok(final_path);
    }

    let muxed_path = get_muxed_path(audio_path);
    let mut cmd = tools.transcoder.command();
    cmd.arg("-i")
        .arg(audio_path)
        .arg("-i")
        .arg(cover_path)
        .arg("-map")
        .arg("0:a")
        .arg("-map")
        .arg("1:0")
        .arg("-c")
        .arg("copy")
        .args(cover_args(format))
        .arg("-y")
        .arg(&muxed_path);

    let output = run_captured(cmd).await.map_err(|e| {
        embed_failed(format!("failed to run {}: {e}", tools.transcoder.display_name()))
    })?;
    if !output.success() {
        return Err(embed_failed(output.diagnostic()));
    }

    fs::copy(&muxed_path, &final_path)
        .await
        .map_err(|e| embed_failed(format!("failed to copy to output directory: {e}")))?;

    if let Err(e) = fs::remove_file(&muxed_path).await {
        debug!(path = %muxed_path.display(), error = %e, "could not remove muxed temp file");
    }

    info!(path = %final_path.display(), "cover art embedded");
    Ok(final_path)
}
