//! External programs the pipeline shells out to, and the up-front check that
//! they are installed.

use std::{
    ffi::OsString,
    path::PathBuf,
    process::Stdio,
};

use tokio::process::Command;
use tracing::debug;

use crate::{
    config::non_empty_env,
    error::{MoonripError, Result},
};

/// A program plus any arguments that must precede the stage's own arguments,
/// e.g. `python3 -m yt_dlp`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalTool {
    pub program: OsString,
    pub leading_args: Vec<OsString>,
}

impl ExternalTool {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(program: impl Into<OsString>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            program: program.into(),
            leading_args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Start a command for this tool with stdin closed and both output
    /// channels piped. Dropping the child kills it.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.leading_args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    pub fn display_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }
}

/// The three external programs used by the pipeline.
#[derive(Debug, Clone)]
pub struct Toolchain {
    pub downloader: ExternalTool,
    pub transcoder: ExternalTool,
    pub prober: ExternalTool,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            downloader: ExternalTool::new("yt-dlp"),
            transcoder: ExternalTool::new("ffmpeg"),
            prober: ExternalTool::new("ffprobe"),
        }
    }
}

impl Toolchain {
    /// Defaults, with per-tool overrides from `MOONRIP_YT_DLP`,
    /// `MOONRIP_FFMPEG` and `MOONRIP_FFPROBE`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let pick = |var: &str, fallback: ExternalTool| {
            non_empty_env(var).map(ExternalTool::new).unwrap_or(fallback)
        };
        Self {
            downloader: pick("MOONRIP_YT_DLP", defaults.downloader),
            transcoder: pick("MOONRIP_FFMPEG", defaults.transcoder),
            prober: pick("MOONRIP_FFPROBE", defaults.prober),
        }
    }
}

/// Verify the downloader and transcoder are resolvable on `PATH`.
pub fn check_dependencies(tools: &Toolchain) -> Result<Vec<PathBuf>> {
    check_dependencies_in(tools, std::env::var_os("PATH"))
}

/// Same as [`check_dependencies`], searching `search_path` instead of the
/// process `PATH`. Fails on the first missing tool.
pub fn check_dependencies_in(
    tools: &Toolchain,
    search_path: Option<OsString>,
) -> Result<Vec<PathBuf>> {
    let cwd = std::env::current_dir()?;
    let required = [
        (&tools.downloader, "yt-dlp"),
        (&tools.transcoder, "ffmpeg"),
    ];

    let mut resolved = Vec::with_capacity(required.len());
    for (tool, dependency) in required {
        match which::which_in(&tool.program, search_path.as_deref(), &cwd) {
            Ok(path) => {
                debug!(tool = %tool.display_name(), path = %path.display(), "resolved dependency");
                resolved.push(path);
            }
            Err(_) => {
                return Err(MoonripError::MissingDependency {
                    dependency: tool.display_name(),
                    install_instructions: install_instructions(dependency),
                });
            }
        }
    }

    Ok(resolved)
}

/// Install hints for the current platform.
pub fn install_instructions(dependency: &str) -> String {
    let (brew, apt, extra, url) = match dependency {
        "yt-dlp" => (
            "brew install yt-dlp",
            "sudo apt install yt-dlp",
            Some("pip install yt-dlp"),
            "https://github.com/yt-dlp/yt-dlp#installation",
        ),
        "ffmpeg" => (
            "brew install ffmpeg",
            "sudo apt install ffmpeg",
            None,
            "https://ffmpeg.org/download.html",
        ),
        other => {
            return format!("Install {other} and make sure it is on your PATH.");
        }
    };

    let mut text = format!("{dependency} is required but was not found on your PATH.\n\n");
    if cfg!(target_os = "macos") {
        text.push_str(&format!("Install it with Homebrew:\n  {brew}\n"));
    } else if cfg!(target_os = "linux") {
        text.push_str(&format!("Install it with apt:\n  {apt}\n"));
        if let Some(extra) = extra {
            text.push_str(&format!("or with pip:\n  {extra}\n"));
        }
    } else if cfg!(target_os = "windows") {
        text.push_str(&format!("Install it with winget:\n  winget install {dependency}\n"));
    }
    text.push_str(&format!("\nOr visit: {url}\n"));
    text
}
