use std::{
    io::{BufRead, Write},
    path::Path,
};

use console::style;

use moonrip_core::{
    AudioFormat, MoonripError, Result, RunRequest, normalize_video_url, resolve_output_dir,
};

/// Read one line, trimmed. `None` once the input is closed.
fn read_answer<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> Result<String> {
    write!(output, "{} ", style(question).bold())?;
    output.flush()?;
    Ok(read_answer(input)?.unwrap_or_default())
}

fn ask_url<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<String> {
    loop {
        write!(output, "{} ", style("Video URL:").bold())?;
        output.flush()?;
        let Some(answer) = read_answer(input)? else {
            return Err(MoonripError::InvalidArguments {
                reason: "input closed before a video URL was entered".to_string(),
            });
        };
        match normalize_video_url(&answer) {
            Ok(url) => return Ok(url),
            Err(_) => writeln!(
                output,
                "{} Please enter a valid video URL (e.g. https://youtu.be/...)",
                style("✗").red()
            )?,
        }
    }
}

/// Map a menu answer to a format. Anything but `2` or `3` picks the first.
pub fn format_choice(answer: &str) -> AudioFormat {
    answer
        .parse::<usize>()
        .ok()
        .and_then(|choice| choice.checked_sub(1))
        .and_then(|index| AudioFormat::ALL.get(index).copied())
        .unwrap_or_default()
}

/// Prompt for URL, format, cover prompt and output directory, in that order.
pub fn collect_inputs<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    cwd: &Path,
) -> Result<RunRequest> {
    let url = ask_url(input, output)?;

    writeln!(output, "\n{}", style("Audio format:").bold())?;
    for (i, format) in AudioFormat::ALL.iter().enumerate() {
        writeln!(
            output,
            "  {}. {} {}",
            i + 1,
            format.name(),
            style(format!("({})", format.blurb())).dim()
        )?;
    }
    let format = format_choice(&ask(input, output, "Choice [1]:")?);

    writeln!(output)?;
    let prompt = ask(
        input,
        output,
        "Describe the cover art you want (Enter for automatic):",
    )?;

    let output_dir = ask(input, output, "Output directory (Enter for current):")?;
    writeln!(output)?;

    let mut request = RunRequest::new(url, resolve_output_dir(Some(&output_dir), cwd));
    request.format = format;
    request.prompt = Some(prompt).filter(|prompt| !prompt.is_empty());
    Ok(request)
}
