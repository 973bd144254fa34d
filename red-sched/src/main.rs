//! red-sched - Daemon that generates and publishes notes at configured times
//!
//! Registers one daily job per `content_strategy.post_times` entry and polls
//! for due jobs until SIGINT or SIGTERM.

use clap::{ArgGroup, Parser};
use libredcast::logging::LoggingConfig;
use libredcast::scheduler::parse_poll_interval;
use libredcast::{Config, ContentGenerator, JobOutcome, Publisher, Result, Scheduler};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "red-sched")]
#[command(version)]
#[command(about = "Daemon that generates and publishes notes at configured times")]
#[command(long_about = "\
red-sched - Daemon that generates and publishes notes at configured times

DESCRIPTION:
    red-sched runs one job per configured daily time. Each job generates a
    note, saves it, and (when publish.auto_publish is true) hands it to the
    publisher. A failed generation skips that run; the job stays scheduled.

USAGE:
    # Run in foreground (logs to stderr)
    red-sched --start

    # Run the job once right now and exit
    red-sched --once

    # Poll more often
    red-sched --start --poll-interval 10s

SIGNALS:
    SIGTERM, SIGINT - Graceful shutdown (finishes the current job)

CONFIGURATION:
    Configuration file: ~/.config/redcast/config.toml (or $REDCAST_CONFIG)

    [content_strategy]
    post_times = [\"09:00\", \"20:00\"]

    [publish]
    auto_publish = false

EXIT CODES:
    0 - Clean shutdown
    1 - Runtime error
    2 - Missing API key
    3 - Invalid arguments
")]
#[command(group(ArgGroup::new("mode").required(true).args(["start", "once"])))]
struct Cli {
    /// Run the scheduler until interrupted
    #[arg(long)]
    start: bool,

    /// Run the job once immediately and exit
    #[arg(long)]
    once: bool,

    /// How often to check for due jobs
    #[arg(long, default_value = "60s", value_name = "DURATION")]
    poll_interval: String,

    /// Configuration file (overrides REDCAST_CONFIG)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    LoggingConfig::from_env(cli.verbose).init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let poll_interval = parse_poll_interval(&cli.poll_interval)?;
    let config = Arc::new(Config::load_from(cli.config.as_deref())?);

    let generator = ContentGenerator::from_config(config.clone())?;
    let publisher = Publisher::new(config.clone());
    let mut scheduler = Scheduler::new(&config, generator, publisher)?;

    if cli.once {
        let outcome = scheduler.job_generate_and_publish().await?;
        print_outcome(&outcome);
        return Ok(());
    }

    info!("red-sched starting");

    let shutdown = Arc::new(AtomicBool::new(false));
    setup_signal_handlers(shutdown.clone())?;

    scheduler.setup_schedule();
    scheduler.run(shutdown, poll_interval).await;

    info!("red-sched stopped");
    Ok(())
}

fn print_outcome(outcome: &JobOutcome) {
    match outcome {
        JobOutcome::Skipped => println!("skipped: generation failed"),
        JobOutcome::Saved { path } => println!("saved: {}", path.display()),
        JobOutcome::Published { path, result } => {
            println!("{}: {} ({})", result.status, result.message, path.display())
        }
    }
}

#[cfg(unix)]
fn setup_signal_handlers(shutdown: Arc<AtomicBool>) -> Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM]).map_err(|e| {
        libredcast::RedcastError::InvalidInput(format!("Signal setup failed: {}", e))
    })?;

    std::thread::spawn(move || {
        if let Some(sig) = signals.forever().next() {
            info!(signal = sig, "Received shutdown signal, stopping gracefully...");
            shutdown.store(true, Ordering::Relaxed);
        }
    });

    Ok(())
}

#[cfg(not(unix))]
fn setup_signal_handlers(_shutdown: Arc<AtomicBool>) -> Result<()> {
    Ok(())
}
