//! Moonrip Core Library
//!
//! Downloads a video, extracts its audio, samples candidate cover frames,
//! scores them with a vision-language model and embeds the winner as cover
//! art.

pub mod config;
pub mod convert;
pub mod cover_art;
pub mod download;
pub mod embed;
pub mod error;
pub mod format;
pub mod frames;
pub mod input;
pub mod pipeline;
pub mod process;
pub mod progress;
pub mod tools;
pub mod types;
pub mod vision;
pub mod workdir;

// Re-export commonly used items at crate root
pub use config::{DEFAULT_FRAME_COUNT, VisionConfig, get_work_dir};
pub use convert::convert_audio;
pub use cover_art::{parse_score, select_best, select_cover_art};
pub use download::download_video;
pub use embed::embed_cover_art;
pub use error::{MoonripError, Result};
pub use format::{format_cover_choice, format_duration, format_timestamp};
pub use frames::{extract_frames, sample_timestamps};
pub use input::{RunRequest, expand_home, normalize_video_url, resolve_output_dir};
pub use pipeline::{Pipeline, RunOutcome};
pub use progress::{NoProgress, ProgressSink, Stage};
pub use tools::{ExternalTool, Toolchain, check_dependencies};
pub use types::{AudioFormat, Frame, ScoredFrame, VideoInfo};
pub use vision::{MoondreamClient, VisionModel, VisionService, VisionSource};
pub use workdir::WorkDir;
