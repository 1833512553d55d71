//! repoprep CLI entry point.

use anyhow::Result;
use clap::Parser;
use repoprep::cli::{commands, Cli, Commands};
use repoprep::config::Settings;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Values from .env never override variables already set
    dotenv::dotenv().ok();

    let config_path = cli.config.as_ref().map(PathBuf::from);
    let mut settings = Settings::load_from(config_path.as_ref())?;

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.clone(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("repoprep={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    settings.apply_env_overrides();
    if let Some(strategy) = cli.strategy {
        settings.retrieval.strategy = strategy;
    }

    // Ensure data directories exist
    std::fs::create_dir_all(settings.data_dir())?;
    std::fs::create_dir_all(settings.temp_dir())?;

    // Execute command
    match &cli.command {
        Commands::Analyze { url } => {
            commands::run_analyze(url, settings).await?;
        }

        Commands::Generate { url, count, output } => {
            commands::run_generate(url, *count, output.clone(), settings).await?;
        }

        Commands::Ask { url, topic } => {
            commands::run_ask(url, topic.clone(), settings).await?;
        }

        Commands::Repl => {
            commands::run_repl(settings).await?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(host, *port, settings).await?;
        }

        Commands::List => {
            commands::run_list(settings).await?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings, config_path.as_deref())?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings, config_path)?;
        }
    }

    Ok(())
}
