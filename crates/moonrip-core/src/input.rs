use std::path::{Path, PathBuf};

use reqwest::Url;

use crate::{
    config::DEFAULT_FRAME_COUNT,
    error::{MoonripError, Result},
    types::AudioFormat,
};

const VIDEO_HOSTS: [&str; 2] = ["youtube.com", "youtu.be"];

/// Validated inputs for one run. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRequest {
    pub url: String,
    pub format: AudioFormat,
    pub prompt: Option<String>,
    pub output_dir: PathBuf,
    pub frame_count: usize,
}

impl RunRequest {
    pub fn new(url: String, output_dir: PathBuf) -> Self {
        Self {
            url,
            format: AudioFormat::default(),
            prompt: None,
            output_dir,
            frame_count: DEFAULT_FRAME_COUNT,
        }
    }
}

/// Whether a scheme-less link starts with a known video host or one of its
/// subdomains (`m.youtube.com`, `music.youtube.com`).
fn is_video_host(input: &str) -> bool {
    let host = input.split('/').next().unwrap_or_default().to_ascii_lowercase();
    VIDEO_HOSTS
        .iter()
        .any(|known| host == *known || host.ends_with(&format!(".{known}")))
}

/// Accept anything that looks like a video page URL.
///
/// Full `http(s)://` URLs pass through unchanged. Scheme-less YouTube links
/// (`youtu.be/abc`) get `https://` prepended.
pub fn normalize_video_url(input: &str) -> Result<String> {
    let input = input.trim();
    if input.is_empty() {
        return Err(MoonripError::InvalidArguments {
            reason: "a video URL is required".to_string(),
        });
    }

    if let Ok(url) = Url::parse(input)
        && matches!(url.scheme(), "http" | "https")
        && url.host_str().is_some_and(|host| !host.is_empty())
    {
        return Ok(input.to_string());
    }

    if is_video_host(input) && !input.contains(char::is_whitespace) {
        return Ok(format!("https://{input}"));
    }

    Err(MoonripError::InvalidArguments {
        reason: format!("'{input}' is not a valid video URL"),
    })
}

/// Expand a leading `~/` (or a lone `~`) to the user's home directory.
pub fn expand_home(input: &str) -> PathBuf {
    let home = dirs::home_dir();
    match (input, home) {
        ("~", Some(home)) => home,
        (path, Some(home)) if path.starts_with("~/") => home.join(&path[2..]),
        (path, _) => PathBuf::from(path),
    }
}

/// Empty input means the current directory; otherwise `~` is expanded.
pub fn resolve_output_dir(input: Option<&str>, cwd: &Path) -> PathBuf {
    match input.map(str::trim).filter(|dir| !dir.is_empty()) {
        Some(dir) => expand_home(dir),
        None => cwd.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_urls_are_kept_verbatim() {
        let url = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
        assert_eq!(normalize_video_url(url).unwrap(), url);
        assert_eq!(
            normalize_video_url("http://vimeo.com/123").unwrap(),
            "http://vimeo.com/123"
        );
    }

    #[test]
    fn bare_youtube_links_get_a_scheme() {
        assert_eq!(
            normalize_video_url("youtu.be/dQw4w9WgXcQ").unwrap(),
            "https://youtu.be/dQw4w9WgXcQ"
        );
        assert_eq!(
            normalize_video_url("www.youtube.com/watch?v=x").unwrap(),
            "https://www.youtube.com/watch?v=x"
        );
        assert_eq!(
            normalize_video_url("music.youtube.com/watch?v=abc").unwrap(),
            "https://music.youtube.com/watch?v=abc"
        );
        assert_eq!(
            normalize_video_url("M.YouTube.com/watch?v=abc").unwrap(),
            "https://M.YouTube.com/watch?v=abc"
        );
        assert!(normalize_video_url("notyoutube.com/watch?v=abc").is_err());
    }

    #[test]
    fn rejects_non_urls() {
        assert!(normalize_video_url("not-a-url").is_err());
        assert!(normalize_video_url("").is_err());
        assert!(normalize_video_url("ftp://example.com/video").is_err());
        assert!(matches!(
            normalize_video_url("   "),
            Err(MoonripError::InvalidArguments { .. })
        ));
    }

    #[test]
    fn tilde_expands_to_home() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        assert_eq!(expand_home("~/Music"), home.join("Music"));
        assert_eq!(expand_home("~"), home);
        assert_eq!(expand_home("/tmp/out"), PathBuf::from("/tmp/out"));
        assert_eq!(expand_home("music~/x"), PathBuf::from("music~/x"));
    }

    #[test]
    fn empty_output_dir_means_cwd() {
        let cwd = Path::new("/work");
        assert_eq!(resolve_output_dir(None, cwd), cwd);
        assert_eq!(resolve_output_dir(Some("  "), cwd), cwd);
        assert_eq!(resolve_output_dir(Some("/tmp"), cwd), PathBuf::from("/tmp"));
    }
}
