use std::{ffi::OsString, path::Path};

use clap::{CommandFactory, Parser, ValueEnum};

use moonrip_core::{
    AudioFormat, DEFAULT_FRAME_COUNT, MoonripError, Result, RunRequest, normalize_video_url,
    resolve_output_dir,
};

/// CLI wrapper for AudioFormat (needed for clap ValueEnum)
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum CliFormat {
    #[default]
    Mp3,
    M4a,
    Wav,
}

impl From<CliFormat> for AudioFormat {
    fn from(cli: CliFormat) -> Self {
        match cli {
            CliFormat::Mp3 => AudioFormat::Mp3,
            CliFormat::M4a => AudioFormat::M4a,
            CliFormat::Wav => AudioFormat::Wav,
        }
    }
}

fn parse_frame_count(value: &str) -> std::result::Result<usize, String> {
    match value.parse::<usize>() {
        Ok(count) if count >= 1 => Ok(count),
        _ => Err(format!("expected a whole number of frames >= 1, got '{value}'")),
    }
}

#[derive(Parser, Debug)]
#[command(name = "moonrip")]
#[command(about = "Download a video, rip its audio and embed AI-selected cover art")]
#[command(
    after_help = "Run without arguments for interactive mode.\n\nExamples:\n  moonrip \"https://www.youtube.com/watch?v=dQw4w9WgXcQ\"\n  moonrip \"https://youtu.be/dQw4w9WgXcQ\" --prompt \"vibrant concert scene\"\n  moonrip \"https://youtu.be/dQw4w9WgXcQ\" --output ~/Music"
)]
pub struct Cli {
    /// Video URL
    pub url: String,

    /// Describe the cover image you want; frames are scored against it
    #[arg(short, long)]
    pub prompt: Option<String>,

    /// Output directory (default: current directory)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Audio format
    #[arg(short, long, default_value = "mp3")]
    pub format: CliFormat,

    /// Number of candidate frames to sample
    #[arg(long, default_value_t = DEFAULT_FRAME_COUNT, value_parser = parse_frame_count)]
    pub frames: usize,
}

/// Parse flag-driven arguments (without the program name) into a run
/// request. Help output and every parse failure come back as
/// `InvalidArguments` whose reason is ready to print.
pub fn parse_args<I, T>(args: I, cwd: &Path) -> Result<RunRequest>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    if args.is_empty() {
        return Err(MoonripError::InvalidArguments {
            reason: Cli::command().render_help().to_string(),
        });
    }

    let cli = Cli::try_parse_from(std::iter::once(OsString::from("moonrip")).chain(args))
        .map_err(|e| MoonripError::InvalidArguments {
            reason: e.render().to_string(),
        })?;

    let url = normalize_video_url(&cli.url).map_err(|e| MoonripError::InvalidArguments {
        reason: format!("{e}\n\n{}", Cli::command().render_usage()),
    })?;

    Ok(RunRequest {
        url,
        format: cli.format.into(),
        prompt: cli.prompt.filter(|prompt| !prompt.trim().is_empty()),
        output_dir: resolve_output_dir(cli.output.as_deref(), cwd),
        frame_count: cli.frames,
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    const URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    fn cwd() -> PathBuf {
        PathBuf::from("/home/user/music")
    }

    #[test]
    fn bare_url_uses_defaults() {
        let request = parse_args([URL], &cwd()).unwrap();
        assert_eq!(request.url, URL);
        assert_eq!(request.format, AudioFormat::Mp3);
        assert_eq!(request.output_dir, cwd());
        assert_eq!(request.prompt, None);
        assert_eq!(request.frame_count, DEFAULT_FRAME_COUNT);
    }

    #[test]
    fn prompt_flag_sets_prompt() {
        let request = parse_args(
            ["https://youtu.be/dQw4w9WgXcQ", "--prompt", "vibrant concert scene"],
            &cwd(),
        )
        .unwrap();
        assert_eq!(request.prompt.as_deref(), Some("vibrant concert scene"));

        let request = parse_args([URL, "-p", "sunset"], &cwd()).unwrap();
        assert_eq!(request.prompt.as_deref(), Some("sunset"));
    }

    #[test]
    fn output_flag_sets_output_dir() {
        let request = parse_args(["https://youtu.be/dQw4w9WgXcQ", "--output", "/tmp"], &cwd())
            .unwrap();
        assert_eq!(request.output_dir, PathBuf::from("/tmp"));

        let request = parse_args([URL, "-o", "/srv/audio"], &cwd()).unwrap();
        assert_eq!(request.output_dir, PathBuf::from("/srv/audio"));
    }

    #[test]
    fn format_and_frames_flags() {
        let request = parse_args([URL, "-f", "wav", "--frames", "4"], &cwd()).unwrap();
        assert_eq!(request.format, AudioFormat::Wav);
        assert_eq!(request.frame_count, 4);

        assert!(parse_args([URL, "--frames", "0"], &cwd()).is_err());
        assert!(parse_args([URL, "--format", "flac"], &cwd()).is_err());
    }

    #[test]
    fn rejects_invalid_url() {
        let err = parse_args(["not-a-url"], &cwd()).unwrap_err();
        assert!(matches!(err, MoonripError::InvalidArguments { .. }));
    }

    #[test]
    fn rejects_empty_arguments() {
        let empty: [&str; 0] = [];
        let err = parse_args(empty, &cwd()).unwrap_err();
        match err {
            MoonripError::InvalidArguments { reason } => assert!(reason.contains("Usage")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn help_is_an_error_carrying_usage() {
        for flag in ["--help", "-h"] {
            let err = parse_args([URL, flag], &cwd()).unwrap_err();
            match err {
                MoonripError::InvalidArguments { reason } => {
                    assert!(reason.contains("--prompt"));
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }
}
