use std::{
    sync::{Mutex, MutexGuard},
    time::{Duration, Instant},
};

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use moonrip_core::{ProgressSink, Stage, format_duration};

pub fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn finished_label(stage: Stage) -> &'static str {
    match stage {
        Stage::Download => "Downloaded",
        Stage::Convert => "Converted",
        Stage::ExtractFrames => "Extracted",
        Stage::SelectCover => "Selected cover",
        Stage::Embed => "Saved",
    }
}

fn started_message(stage: Stage, detail: &str) -> String {
    match stage {
        Stage::Convert => format!("Converting to {detail}..."),
        Stage::ExtractFrames => format!("Extracting {detail} frames..."),
        Stage::SelectCover if !detail.is_empty() => format!("{stage} for \"{detail}\"..."),
        _ => format!("{stage}..."),
    }
}

struct ActiveStage {
    spinner: ProgressBar,
    message: String,
    started: Instant,
}

/// Terminal progress: one spinner line per stage, finished with a check
/// mark and the time the stage took.
#[derive(Default)]
pub struct TerminalProgress {
    active: Mutex<Option<ActiveStage>>,
}

impl TerminalProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn active(&self) -> MutexGuard<'_, Option<ActiveStage>> {
        self.active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Stop the running spinner, if any, marking its stage as failed.
    pub fn fail(&self) {
        if let Some(stage) = self.active().take() {
            stage.spinner.abandon_with_message(format!(
                "{} {}",
                style("✗").red().bold(),
                stage.message
            ));
        }
    }
}

impl ProgressSink for TerminalProgress {
    fn stage_started(&self, stage: Stage, detail: &str) {
        let message = started_message(stage, detail);
        let spinner = create_spinner(&message);
        if let Some(previous) = self.active().replace(ActiveStage {
            spinner,
            message,
            started: Instant::now(),
        }) {
            previous.spinner.finish_and_clear();
        }
    }

    fn progress(&self, _stage: Stage, percent: f64) {
        if let Some(active) = self.active().as_ref() {
            active
                .spinner
                .set_message(format!("{} {:.1}%", active.message, percent));
        }
    }

    fn stage_finished(&self, stage: Stage, summary: &str) {
        if let Some(active) = self.active().take() {
            active.spinner.finish_with_message(format!(
                "{} {}: {} {}",
                style("✓").green().bold(),
                finished_label(stage),
                style(summary).dim(),
                style(format!("({})", format_duration(active.started.elapsed()))).dim()
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn started_messages_mention_detail() {
        assert_eq!(started_message(Stage::Convert, "MP3"), "Converting to MP3...");
        assert_eq!(
            started_message(Stage::ExtractFrames, "10"),
            "Extracting 10 frames..."
        );
        assert_eq!(
            started_message(Stage::SelectCover, "sunset"),
            "Analyzing frames for \"sunset\"..."
        );
        assert_eq!(started_message(Stage::SelectCover, ""), "Analyzing frames...");
        assert_eq!(
            started_message(Stage::Download, "https://youtu.be/x"),
            "Downloading video..."
        );
    }

    #[test]
    fn finishing_clears_the_active_stage() {
        let progress = TerminalProgress::new();
        progress.stage_started(Stage::Download, "https://youtu.be/x");
        progress.progress(Stage::Download, 42.0);
        assert!(progress.active().is_some());

        progress.stage_finished(Stage::Download, "Some Title");
        assert!(progress.active().is_none());

        // Finishing without a running stage is a no-op
        progress.stage_finished(Stage::Convert, "x.mp3");
        progress.fail();
    }

    #[test]
    fn fail_abandons_running_stage() {
        let progress = TerminalProgress::new();
        progress.stage_started(Stage::Embed, "/tmp");
        progress.fail();
        assert!(progress.active().is_none());
    }
}
