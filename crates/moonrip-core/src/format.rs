use std::time::Duration;

use crate::types::ScoredFrame;

/// Format seconds as MM:SS timestamp
pub fn format_timestamp(seconds: f64) -> String {
    let mins = (seconds / 60.0) as u32;
    let secs = (seconds % 60.0) as u32;
    format!("{:02}:{:02}", mins, secs)
}

pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let whole = d.as_secs();
        format!("{}m {}s", whole / 60, whole % 60)
    }
}

/// One-line summary of the chosen cover frame
pub fn format_cover_choice(cover: &ScoredFrame) -> String {
    let description = if cover.description.is_empty() {
        "(no description)"
    } else {
        cover.description.as_str()
    };
    format!(
        "[{}] score {}/10 - {}",
        format_timestamp(cover.frame.timestamp),
        cover.score,
        description
    )
}
