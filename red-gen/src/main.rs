//! red-gen - Generate marketing notes with a language model

use clap::Parser;
use libredcast::logging::LoggingConfig;
use libredcast::storage::{load_content, RecordStore};
use libredcast::types::normalize_tag;
use libredcast::{Config, ContentGenerator, GeneratedContent, RedcastError, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

const RULE: &str = "==================================================";

#[derive(Parser, Debug)]
#[command(name = "red-gen")]
#[command(version, about = "Generate marketing notes with a language model")]
#[command(long_about = r#"Generate Xiaohongshu notes for the configured product.

Each note is drawn from a weighted content type and one of its templates,
written by the model, and saved as content_<timestamp>.json in the output
directory. The path of every saved record is printed to stdout. A note
whose generation fails is logged and skipped; the rest of the batch still
runs and the exit code reports the failure.

EXAMPLES:
    # Generate one note
    red-gen

    # Generate five notes and preview them
    red-gen --count 5 --test

    # Show the most recent note
    red-gen --show-latest

    # Publish what was just generated
    red-gen && red-publish --latest

CONFIGURATION:
    Configuration file: ~/.config/redcast/config.toml (or $REDCAST_CONFIG)
    API key: environment variable named by ai.api_key_env
             (default ANTHROPIC_API_KEY)

EXIT CODES:
    0 - Success
    1 - Generation or storage error
    2 - Missing or rejected API key
    3 - Invalid arguments
"#)]
struct Cli {
    /// Number of notes to generate
    #[arg(short = 'n', long, default_value = "1", value_name = "N")]
    count: usize,

    /// Mark notes as test output and print a preview of each
    #[arg(short, long)]
    test: bool,

    /// Print the most recently generated note and exit
    #[arg(long, conflicts_with_all = ["count", "test"])]
    show_latest: bool,

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
    let config = Arc::new(Config::load_from(cli.config.as_deref())?);

    if cli.show_latest {
        return show_latest(&config);
    }

    if cli.count == 0 {
        return Err(RedcastError::InvalidInput(
            "--count must be at least 1".to_string(),
        ));
    }

    let mut generator = ContentGenerator::from_config(config.clone())?;

    let mut failed = 0;
    let mut last_error = None;
    for i in 1..=cli.count {
        info!("Generating note {}/{}", i, cli.count);
        let content = match generator.generate_content(cli.test).await {
            Ok(content) => content,
            Err(e) => {
                error!("Note {}/{} failed: {}", i, cli.count, e);
                failed += 1;
                last_error = Some(e);
                continue;
            }
        };
        let path = generator.save_content(&content, None)?;

        if cli.test {
            print_preview(&content);
        }
        println!("{}", path.display());
    }

    info!("Generated {} of {} note(s)", cli.count - failed, cli.count);
    match last_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn show_latest(config: &Config) -> Result<()> {
    let store = RecordStore::new(config.output_dir());
    let path = store.latest_content()?;
    let content = load_content(&path)?;

    println!("{}", path.display());
    print_preview(&content);
    Ok(())
}

fn print_preview(content: &GeneratedContent) {
    let tags = content
        .tags
        .iter()
        .map(|t| normalize_tag(t))
        .collect::<Vec<_>>()
        .join(" ");

    println!("{}", RULE);
    println!("[{} / {}]", content.content_type, content.template);
    println!("{}", content.title);
    println!();
    println!("{}", content.content);
    println!();
    println!("{}", tags);
    println!("{}", RULE);
}
