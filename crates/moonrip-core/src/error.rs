use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MoonripError {
    #[error("{dependency} is not installed")]
    MissingDependency {
        dependency: String,
        install_instructions: String,
    },

    #[error("Invalid arguments: {reason}")]
    InvalidArguments { reason: String },

    #[error("Download failed for {url}: {reason}")]
    DownloadFailed { url: String, reason: String },

    #[error("Conversion to {format} failed: {reason}")]
    ConversionFailed { format: String, reason: String },

    #[error("Frame extraction failed for {video_path}: {reason}")]
    FrameExtractionFailed { video_path: PathBuf, reason: String },

    #[error("Cover art selection failed: {reason}")]
    CoverArtSelectionFailed { reason: String },

    #[error("Embedding cover art into {audio_path} failed: {reason}")]
    EmbedFailed { audio_path: PathBuf, reason: String },

    #[error("Vision service returned an unexpected response: {reason}")]
    VisionResponse { reason: String },

    #[error("Interrupted")]
    Interrupted,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),
}

impl MoonripError {
    /// Install hint attached to a missing dependency, if any.
    pub fn install_instructions(&self) -> Option<&str> {
        match self {
            MoonripError::MissingDependency {
                install_instructions,
                ..
            } => Some(install_instructions),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, MoonripError>;
