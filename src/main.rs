//! Main entry point for the Issue Classifier CLI

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use issue_classifier::cli::commands::{self, Commands};
use issue_classifier::ClassifierConfig;

/// Issue Classifier - predict enhancement / bug / question for an issue
#[derive(Parser, Debug)]
#[command(name = "issue-classifier", version, about, long_about = None)]
struct Args {
    /// Configuration file (JSON, YAML or TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base URL of the classification service
    #[arg(long)]
    base_url: Option<String>,

    /// Request timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("issue_classifier={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = ClassifierConfig::load(args.config.as_deref())?;

    // Override config with CLI args if provided
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.timeout_ms = timeout_ms;
    }
    config.validate()?;

    // Execute command
    match args.command {
        Some(Commands::Predict {
            title,
            body,
            body_file,
        }) => {
            commands::handle_predict(config, title, body, body_file).await?;
        }
        Some(Commands::Detect { text }) => {
            commands::handle_detect(config, text).await?;
        }
        Some(Commands::Correct { id, label }) => {
            commands::handle_correct(config, id, label).await?;
        }
        None => {
            println!("Please specify a command. Use --help for more information.");
        }
    }

    Ok(())
}
