use std::{fmt, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};

/// What the downloader left behind in the working directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub video_path: PathBuf,
    pub audio_path: Option<PathBuf>,
    pub title: String,
    pub artist: Option<String>,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub path: PathBuf,
    /// Seconds from the start of the video.
    pub timestamp: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredFrame {
    pub frame: Frame,
    /// 0-10, higher is better.
    pub score: u8,
    pub description: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    #[default]
    Mp3,
    M4a,
    Wav,
}

pub struct FormatConfig {
    pub extension: &'static str,
    pub codec: &'static str,
    pub quality_args: &'static [&'static str],
}

impl AudioFormat {
    pub const ALL: [AudioFormat; 3] = [AudioFormat::Mp3, AudioFormat::M4a, AudioFormat::Wav];

    pub fn config(&self) -> FormatConfig {
        match self {
            // highest quality VBR
            AudioFormat::Mp3 => FormatConfig {
                extension: "mp3",
                codec: "libmp3lame",
                quality_args: &["-q:a", "0"],
            },
            AudioFormat::M4a => FormatConfig {
                extension: "m4a",
                codec: "aac",
                quality_args: &["-b:a", "256k"],
            },
            AudioFormat::Wav => FormatConfig {
                extension: "wav",
                codec: "pcm_s16le",
                quality_args: &[],
            },
        }
    }

    pub fn extension(&self) -> &'static str {
        self.config().extension
    }

    pub fn name(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "MP3",
            AudioFormat::M4a => "M4A",
            AudioFormat::Wav => "WAV",
        }
    }

    /// Human description used by the interactive format menu.
    pub fn blurb(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "most compatible",
            AudioFormat::M4a => "better quality, smaller size",
            AudioFormat::Wav => "lossless",
        }
    }

    /// Whether the container can hold an attached cover picture.
    pub fn supports_cover_art(&self) -> bool {
        !matches!(self, AudioFormat::Wav)
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        AudioFormat::ALL
            .into_iter()
            .find(|format| format.extension() == ext)
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AudioFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AudioFormat::from_extension(s).ok_or_else(|| format!("unsupported audio format: {s}"))
    }
}
