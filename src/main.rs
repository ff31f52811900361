//! podcast-rag CLI entry point.

use anyhow::Result;
use clap::Parser;
use podcast_rag::cli::{commands, Cli, Commands};
use podcast_rag::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // A .env file never overrides variables already set in the environment
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&Settings::expand_path(path)))?,
        None => Settings::load()?,
    };

    // Initialize logging
    let log_level = match (cli.verbose, settings.general.debug) {
        (0, false) => "info",
        (0, true) | (1, _) => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| {
            format!("podcast_rag={0},tower_http={0}", log_level)
        })))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Execute command
    match cli.command {
        Commands::Serve { host, port, degraded } => {
            commands::run_serve(host, port, degraded, settings).await?;
        }

        Commands::Ingest { chunks, timeout_secs } => {
            commands::run_ingest(chunks, timeout_secs, settings).await?;
        }

        Commands::Search { query, limit } => {
            commands::run_search(&query, limit, settings).await?;
        }

        Commands::Ask { question, limit } => {
            commands::run_ask(&question, limit, settings).await?;
        }

        Commands::Health => {
            commands::run_health(settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(&action, settings)?;
        }
    }

    Ok(())
}
