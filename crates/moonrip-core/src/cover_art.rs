use std::sync::LazyLock;

use regex::Regex;
use tokio::fs;
use tracing::{info, warn};

use crate::{
    error::{MoonripError, Result},
    progress::{ProgressSink, Stage},
    types::{Frame, ScoredFrame},
    vision::VisionModel,
};

const MAX_SCORE: u8 = 10;

static FIRST_INTEGER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

static GENERIC_QUESTION: &str = "On a scale of 0-10, how suitable is this image as album cover art? Consider composition, visual appeal, and focus. Answer with just a number.";

/// The question asked for every frame.
pub fn scoring_question(prompt: Option<&str>) -> String {
    match prompt {
        Some(prompt) => format!(
            "On a scale of 0-10, how well does this image match the description: \"{prompt}\"? Answer with just a number."
        ),
        None => GENERIC_QUESTION.to_string(),
    }
}

/// First integer in a free-text answer, capped at 10. `0` if there is none.
pub fn parse_score(answer: &str) -> u8 {
    FIRST_INTEGER
        .find(answer)
        .and_then(|m| m.as_str().parse::<u64>().ok())
        .map(|score| score.min(MAX_SCORE as u64) as u8)
        .unwrap_or(0)
}

/// Highest score wins; among equal scores the earliest frame wins.
pub fn select_best(scored: &[ScoredFrame]) -> Option<&ScoredFrame> {
    scored.iter().fold(None, |best: Option<&ScoredFrame>, candidate| match best {
        Some(best) if best.score >= candidate.score => Some(best),
        _ => Some(candidate),
    })
}

/// Caption and score every frame, in order.
///
/// A failed caption leaves the description empty and a failed or unparseable
/// score counts as 0; neither aborts the run. Only an unreadable frame does.
/// The second element of the result counts frames whose score request
/// actually succeeded.
pub async fn score_frames(
    frames: &[Frame],
    prompt: Option<&str>,
    model: &dyn VisionModel,
    progress: &dyn ProgressSink,
) -> Result<(Vec<ScoredFrame>, usize)> {
    let question = scoring_question(prompt);
    let mut scored = Vec::with_capacity(frames.len());
    let mut answered = 0;

    for (i, frame) in frames.iter().enumerate() {
        let image = fs::read(&frame.path).await.map_err(|e| {
            MoonripError::CoverArtSelectionFailed {
                reason: format!("failed to read frame {}: {e}", frame.path.display()),
            }
        })?;

        let description = match model.caption(&image).await {
            Ok(caption) => caption.trim().to_string(),
            Err(e) => {
                warn!(frame = %frame.path.display(), error = %e, "caption request failed");
                String::new()
            }
        };

        let score = match model.query(&image, &question).await {
            Ok(answer) => {
                answered += 1;
                parse_score(&answer)
            }
            Err(e) => {
                warn!(frame = %frame.path.display(), error = %e, "score request failed, using 0");
                0
            }
        };

        scored.push(ScoredFrame {
            frame: frame.clone(),
            score,
            description,
        });
        progress.progress(Stage::SelectCover, (i + 1) as f64 / frames.len() as f64 * 100.0);
    }

    Ok((scored, answered))
}

/// Pick the frame that makes the best cover.
///
/// Fails when there are no frames, or when the vision service could not
/// score a single one of them.
pub async fn select_cover_art(
    frames: &[Frame],
    prompt: Option<&str>,
    model: &dyn VisionModel,
    progress: &dyn ProgressSink,
) -> Result<ScoredFrame> {
    if frames.is_empty() {
        return Err(MoonripError::CoverArtSelectionFailed {
            reason: "no frames to choose from".to_string(),
        });
    }

    let (scored, answered) = score_frames(frames, prompt, model, progress).await?;
    if answered == 0 {
        return Err(MoonripError::CoverArtSelectionFailed {
            reason: "the vision service could not score any frame".to_string(),
        });
    }

    let best = select_best(&scored)
        .cloned()
        .ok_or_else(|| MoonripError::CoverArtSelectionFailed {
            reason: "no suitable frames found".to_string(),
        })?;

    info!(
        timestamp = best.frame.timestamp,
        score = best.score,
        description = %best.description,
        "selected cover frame"
    );
    Ok(best)
}
