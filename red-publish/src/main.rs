//! red-publish - Publish or draft a generated marketing note

use clap::{ArgGroup, Parser};
use libredcast::logging::LoggingConfig;
use libredcast::storage::RecordStore;
use libredcast::{Config, PublishResult, PublishStatus, Publisher, RedcastError, Result};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "red-publish")]
#[command(version, about = "Publish or draft a generated marketing note")]
#[command(long_about = r#"Validate a saved note, append its hashtags, attach
placeholder image paths and publish it.

With publish.save_draft = true the note is written as draft_<timestamp>.json
for manual publication. Otherwise the result is "pending": no publishing
channel ships with redcast. Every attempt is appended to publish.log_path.

EXAMPLES:
    # Publish a specific record
    red-publish --file logs/content_20250314_090000_123.json

    # Publish the most recent record
    red-publish --latest

    # JSON result for scripting
    red-publish --latest --format json | jq -r .status

OUTPUT FORMATS:
    text - "<status>: <message>" (default)
    json - {"status": ..., "message": ...}

EXIT CODES:
    0 - draft_saved, pending or success
    1 - error (invalid record, storage failure)
    3 - Invalid arguments
"#)]
#[command(group(ArgGroup::new("source").required(true).args(["file", "latest"])))]
struct Cli {
    /// Saved content record to publish
    #[arg(short, long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Publish the most recent content record in the output directory
    #[arg(short, long)]
    latest: bool,

    /// Output format
    #[arg(long, default_value = "text", value_name = "FORMAT")]
    #[arg(value_parser = ["text", "json"])]
    format: String,

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

    match run(cli).await {
        Ok(result) if result.status == PublishStatus::Error => std::process::exit(1),
        Ok(_) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> Result<PublishResult> {
    let config = Arc::new(Config::load_from(cli.config.as_deref())?);

    let path = match cli.file {
        Some(path) => path,
        None => RecordStore::new(config.output_dir()).latest_content()?,
    };

    let publisher = Publisher::new(config);
    let result = publisher.publish_file(&path).await;

    print_result(&result, &cli.format)?;
    Ok(result)
}

fn print_result(result: &PublishResult, format: &str) -> Result<()> {
    match format {
        "json" => {
            let json = serde_json::to_string_pretty(result).map_err(|e| {
                RedcastError::InvalidInput(format!("Failed to serialize result: {}", e))
            })?;
            println!("{}", json);
        }
        _ => println!("{}: {}", result.status, result.message),
    }
    Ok(())
}
