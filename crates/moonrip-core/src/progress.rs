//! Progress reporting for pipeline stages.
//!
//! The scraping of external tool output lives here and only here: if yt-dlp
//! or ffmpeg change their progress text, the regexes below are what changes.

use std::{fmt, sync::LazyLock};

use regex::Regex;

static DOWNLOAD_PERCENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[download\]\s+(\d+(?:\.\d+)?)%").unwrap());
static TRANSCODE_DURATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Duration: (\d+):(\d+):(\d+(?:\.\d+)?)").unwrap());
static TRANSCODE_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"time=(\d+):(\d+):(\d+(?:\.\d+)?)").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Download,
    Convert,
    ExtractFrames,
    SelectCover,
    Embed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Download => "Downloading video",
            Stage::Convert => "Converting audio",
            Stage::ExtractFrames => "Extracting frames",
            Stage::SelectCover => "Analyzing frames",
            Stage::Embed => "Embedding cover art",
        };
        f.write_str(label)
    }
}

/// Receives stage transitions and percent-complete updates.
pub trait ProgressSink: Send + Sync {
    fn stage_started(&self, stage: Stage, detail: &str);

    /// `percent` is in `0.0..=100.0`.
    fn progress(&self, stage: Stage, percent: f64);

    fn stage_finished(&self, stage: Stage, summary: &str);
}

/// Discards everything.
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn stage_started(&self, _stage: Stage, _detail: &str) {}
    fn progress(&self, _stage: Stage, _percent: f64) {}
    fn stage_finished(&self, _stage: Stage, _summary: &str) {}
}

/// Parse a yt-dlp `[download]  42.3% of ...` line.
pub fn parse_download_percent(line: &str) -> Option<f64> {
    let caps = DOWNLOAD_PERCENT.captures(line)?;
    caps[1].parse::<f64>().ok().map(|pct| pct.clamp(0.0, 100.0))
}

fn hms_to_seconds(caps: &regex::Captures<'_>) -> Option<f64> {
    let hours: f64 = caps[1].parse().ok()?;
    let minutes: f64 = caps[2].parse().ok()?;
    let seconds: f64 = caps[3].parse().ok()?;
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

/// Tracks ffmpeg's `Duration:` header and `time=` updates.
#[derive(Debug, Default)]
pub struct TranscodeProgress {
    duration: Option<f64>,
    last_reported: Option<f64>,
}

impl TranscodeProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    /// Feed one stderr line. Returns a new percentage, rounded to a tenth,
    /// only when it differs from the last one returned.
    pub fn observe(&mut self, line: &str) -> Option<f64> {
        if self.duration.is_none()
            && let Some(caps) = TRANSCODE_DURATION.captures(line)
        {
            self.duration = hms_to_seconds(&caps).filter(|d| *d > 0.0);
        }

        let duration = self.duration?;
        let caps = TRANSCODE_TIME.captures(line)?;
        let current = hms_to_seconds(&caps)?;
        let percent = ((current / duration) * 100.0).min(100.0);
        let percent = (percent * 10.0).round() / 10.0;

        if self.last_reported == Some(percent) {
            return None;
        }
        self.last_reported = Some(percent);
        Some(percent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_download_percentages() {
        assert_eq!(
            parse_download_percent("[download]  42.5% of   10.00MiB at  1.00MiB/s ETA 00:05"),
            Some(42.5)
        );
        assert_eq!(parse_download_percent("[download] 100% of 3.2MiB"), Some(100.0));
        assert_eq!(parse_download_percent("[info] Downloading webpage"), None);
    }

    #[test]
    fn transcode_progress_needs_duration_first() {
        let mut progress = TranscodeProgress::new();
        assert_eq!(progress.observe("size= 10kB time=00:00:05.00 bitrate="), None);

        assert_eq!(
            progress.observe("  Duration: 00:01:40.00, start: 0.000000, bitrate: 128 kb/s"),
            None
        );
        assert_eq!(progress.duration(), Some(100.0));
        assert_eq!(progress.observe("size= 10kB time=00:00:25.00 bitrate="), Some(25.0));
    }

    #[test]
    fn transcode_progress_skips_repeats_and_clamps() {
        let mut progress = TranscodeProgress::new();
        progress.observe("Duration: 00:00:10.00,");

        assert_eq!(progress.observe("time=00:00:05.00"), Some(50.0));
        assert_eq!(progress.observe("time=00:00:05.00"), None);
        assert_eq!(progress.observe("time=00:00:12.00"), Some(100.0));
    }
}
