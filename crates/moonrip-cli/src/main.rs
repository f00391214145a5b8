mod cli;
mod interactive;
mod reporter;

use std::{io, path::PathBuf, time::Instant};

use anyhow::Result;
use console::style;
use tracing_subscriber::EnvFilter;

use moonrip_core::{
    MoonripError, Pipeline, RunRequest, Toolchain, VisionConfig, VisionService, VisionSource,
    check_dependencies, format_cover_choice, format_duration, get_work_dir,
};

use reporter::TerminalProgress;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
}

fn report_error(error: &MoonripError) {
    eprintln!("\n{} {}", style("Error:").red().bold(), error);
    if let Some(instructions) = error.install_instructions() {
        eprintln!("\n{}", instructions);
    }
}

fn describe_source(source: &VisionSource) -> String {
    match source {
        VisionSource::Configured(endpoint) => format!("Moondream at {endpoint}"),
        VisionSource::Local(endpoint) => format!("local Moondream at {endpoint}"),
        VisionSource::Cloud {
            has_api_key: true, ..
        } => "Moondream cloud".to_string(),
        VisionSource::Cloud {
            has_api_key: false,
            ..
        } => "Moondream cloud (no MOONDREAM_API_KEY set)".to_string(),
    }
}

/// Names only the tools `check_dependencies` resolves up front.
fn dependencies_summary(tools: &Toolchain) -> String {
    format!(
        "Dependencies found: {}, {}",
        tools.downloader.display_name(),
        tools.transcoder.display_name()
    )
}

async fn collect_interactive(cwd: PathBuf) -> moonrip_core::Result<RunRequest> {
    tokio::task::spawn_blocking(move || {
        interactive::collect_inputs(&mut io::stdin().lock(), &mut io::stdout(), &cwd)
    })
    .await
    .map_err(|e| MoonripError::InvalidArguments {
        reason: format!("input prompt failed: {e}"),
    })?
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cwd = std::env::current_dir()?;
    let args: Vec<String> = std::env::args().skip(1).collect();

    // Flags are validated before anything touches the network or the disk
    let flag_request = if args.is_empty() {
        None
    } else {
        match cli::parse_args(&args, &cwd) {
            Ok(request) => Some(request),
            Err(MoonripError::InvalidArguments { reason }) => {
                eprintln!("{}", reason.trim_end());
                std::process::exit(1);
            }
            Err(e) => {
                report_error(&e);
                std::process::exit(1);
            }
        }
    };

    println!(
        "\n{}  {}\n",
        style("moonrip").cyan().bold(),
        style("Video to Audio with AI Cover Art").dim()
    );

    // Step 0: External tools
    let tools = Toolchain::from_env();
    if let Err(e) = check_dependencies(&tools) {
        report_error(&e);
        std::process::exit(1);
    }
    println!(
        "{} {}",
        style("✓").green().bold(),
        dependencies_summary(&tools)
    );

    let spinner = reporter::create_spinner("Connecting to vision service...");
    let vision = VisionService::start(&VisionConfig::from_env()).await;
    spinner.finish_with_message(format!(
        "{} Vision: {}",
        style("✓").green().bold(),
        style(describe_source(vision.source())).dim()
    ));

    let request = match flag_request {
        Some(request) => request,
        None => {
            println!();
            match collect_interactive(cwd.clone()).await {
                Ok(request) => request,
                Err(e) => {
                    vision.stop();
                    report_error(&e);
                    std::process::exit(1);
                }
            }
        }
    };

    let progress = TerminalProgress::new();
    let pipeline = Pipeline::new(&tools, vision.model(), &progress, get_work_dir(&cwd));
    let started = Instant::now();

    let result = tokio::select! {
        result = pipeline.run(&request) => result,
        _ = tokio::signal::ctrl_c() => Err(MoonripError::Interrupted),
    };
    vision.stop();

    match result {
        Ok(outcome) => {
            println!(
                "\n{} {}",
                style("Saved:").dim(),
                style(outcome.output_path.display()).cyan()
            );
            println!(
                "{} {}",
                style("Cover:").dim(),
                format_cover_choice(&outcome.cover)
            );
            println!(
                "{} {}\n",
                style("Total time:").dim(),
                format_duration(started.elapsed())
            );
            Ok(())
        }
        Err(e) => {
            progress.fail();
            report_error(&e);
            std::process::exit(1);
        }
    }
}
