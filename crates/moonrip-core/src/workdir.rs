use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use crate::error::Result;

const VIDEO_EXTENSIONS: [&str; 7] = ["mp4", "webm", "mkv", "mov", "avi", "flv", "m4v"];
const AUDIO_EXTENSIONS: [&str; 7] = ["mp3", "m4a", "wav", "opus", "ogg", "aac", "flac"];

/// The per-run scratch directory. Created fresh, removed on drop.
#[derive(Debug)]
pub struct WorkDir {
    path: PathBuf,
}

impl WorkDir {
    /// Create the directory, clearing anything a previous run left behind.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if path.exists() {
            debug!(path = %path.display(), "removing stale working directory");
            fs::remove_dir_all(&path)?;
        }
        fs::create_dir_all(&path)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        match fs::remove_dir_all(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "removed working directory"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "failed to remove working directory"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Audio,
}

pub fn classify_media(path: &Path) -> Option<MediaKind> {
    let ext = path.extension()?.to_string_lossy().to_lowercase();
    if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Video)
    } else if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Audio)
    } else {
        None
    }
}

/// Media files found directly inside a directory, split by kind.
#[derive(Debug, Default, PartialEq)]
pub struct MediaFiles {
    pub videos: Vec<PathBuf>,
    pub audio: Vec<PathBuf>,
}

impl MediaFiles {
    /// First video, preferring one whose file name contains `id`.
    pub fn first_video(&self, id: Option<&str>) -> Option<&PathBuf> {
        preferring_id(&self.videos, id)
    }

    pub fn first_audio(&self, id: Option<&str>) -> Option<&PathBuf> {
        preferring_id(&self.audio, id)
    }
}

fn preferring_id<'a>(paths: &'a [PathBuf], id: Option<&str>) -> Option<&'a PathBuf> {
    id.filter(|id| !id.is_empty())
        .and_then(|id| {
            paths.iter().find(|path| {
                path.file_name()
                    .is_some_and(|name| name.to_string_lossy().contains(id))
            })
        })
        .or_else(|| paths.first())
}

/// List `dir` (non-recursively) and bucket media files by extension, in name
/// order.
pub fn find_media(dir: &Path) -> Result<MediaFiles> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    entries.sort();

    let mut media = MediaFiles::default();
    for path in entries {
        match classify_media(&path) {
            Some(MediaKind::Video) => media.videos.push(path),
            Some(MediaKind::Audio) => media.audio.push(path),
            None => {}
        }
    }
    Ok(media)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_extension() {
        assert_eq!(classify_media(Path::new("a.MP4")), Some(MediaKind::Video));
        assert_eq!(classify_media(Path::new("a.webm")), Some(MediaKind::Video));
        assert_eq!(classify_media(Path::new("a.m4a")), Some(MediaKind::Audio));
        assert_eq!(classify_media(Path::new("a.jpg")), None);
        assert_eq!(classify_media(Path::new("noext")), None);
    }

    #[test]
    fn find_media_buckets_and_prefers_id() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["aaa.mp4", "xyz.webm", "xyz.jpg", "xyz.m4a"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }

        let media = find_media(dir.path()).unwrap();
        assert_eq!(media.videos.len(), 2);
        assert_eq!(media.audio.len(), 1);
        assert!(media.first_video(None).unwrap().ends_with("aaa.mp4"));
        assert!(media.first_video(Some("xyz")).unwrap().ends_with("xyz.webm"));
        assert!(media.first_video(Some("nope")).unwrap().ends_with("aaa.mp4"));
        assert!(media.first_audio(Some("xyz")).unwrap().ends_with("xyz.m4a"));
    }

    #[test]
    fn work_dir_is_fresh_and_removed_on_drop() {
        let base = tempfile::tempdir().unwrap();
        let path = base.path().join(".moonrip-temp");
        fs::create_dir_all(&path).unwrap();
        fs::write(path.join("stale.mp4"), b"old").unwrap();

        {
            let work = WorkDir::create(&path).unwrap();
            assert!(work.path().is_dir());
            assert!(!work.path().join("stale.mp4").exists());
        }

        assert!(!path.exists());
    }
}
