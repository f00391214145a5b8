use std::{
    path::{Path, PathBuf},
    time::Duration,
};

/// Working directory name, created under the current directory for each run.
pub const WORK_DIR_NAME: &str = ".moonrip-temp";

/// Subdirectory of the working directory that holds sampled frames.
pub const FRAMES_DIR_NAME: &str = "frames";

pub const DEFAULT_FRAME_COUNT: usize = 10;

pub const LOCAL_VISION_ENDPOINT: &str = "http://localhost:2020/v1";
pub const CLOUD_VISION_ENDPOINT: &str = "https://api.moondream.ai/v1";
pub const LOCAL_PROBE_TIMEOUT: Duration = Duration::from_secs(1);

pub const ENDPOINT_ENV_VAR: &str = "MOONDREAM_ENDPOINT";
pub const API_KEY_ENV_VAR: &str = "MOONDREAM_API_KEY";

/// Get the working directory used under `base`
pub fn get_work_dir(base: &Path) -> PathBuf {
    base.join(WORK_DIR_NAME)
}

/// Get the frames directory next to a downloaded video
pub fn get_frames_dir(video_path: &Path) -> PathBuf {
    video_path
        .parent()
        .unwrap_or(Path::new("."))
        .join(FRAMES_DIR_NAME)
}

/// Vision service settings.
#[derive(Debug, Clone)]
pub struct VisionConfig {
    /// Explicit endpoint; skips the local probe when set.
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub local_endpoint: String,
    pub cloud_endpoint: String,
    pub probe_timeout: Duration,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            local_endpoint: LOCAL_VISION_ENDPOINT.to_string(),
            cloud_endpoint: CLOUD_VISION_ENDPOINT.to_string(),
            probe_timeout: LOCAL_PROBE_TIMEOUT,
        }
    }
}

impl VisionConfig {
    pub fn from_env() -> Self {
        Self {
            endpoint: non_empty_env(ENDPOINT_ENV_VAR),
            api_key: non_empty_env(API_KEY_ENV_VAR),
            ..Self::default()
        }
    }
}

pub(crate) fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_dir_sits_next_to_the_video() {
        let frames = get_frames_dir(Path::new("/work/.moonrip-temp/abc.mp4"));
        assert_eq!(frames, PathBuf::from("/work/.moonrip-temp/frames"));
    }

    #[test]
    fn default_vision_config_has_no_override() {
        let config = VisionConfig::default();
        assert!(config.endpoint.is_none());
        assert_eq!(config.local_endpoint, LOCAL_VISION_ENDPOINT);
        assert_eq!(config.probe_timeout, Duration::from_secs(1));
    }
}
