//! minutes-relay - Meeting recordings in, PDF summaries out
//!
//! Entry point for the minutes-relay service and CLI.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use minutes_relay::cli::{Cli, Commands};
use minutes_relay::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    if let Commands::Completions { shell } = cli.command {
        minutes_relay::cli::completions::print(shell);
        return Ok(());
    }

    // Load configuration only for runtime commands.
    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };

    // Initialize logging
    let default_level = if cli.verbose {
        "debug".to_string()
    } else {
        settings.general.log_level.clone()
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Execute command
    match cli.command {
        Commands::Serve { bind } => {
            minutes_relay::server::run(&settings, bind).await?;
        }
        Commands::Process { event } => {
            minutes_relay::cli::commands::process_event(&settings, &event).await?;
        }
        Commands::Render { input, output } => {
            minutes_relay::cli::commands::render_file(&input, &output)?;
        }
        Commands::Config(config_cmd) => {
            minutes_relay::cli::commands::config_command(&settings, cli.config, config_cmd)?;
        }
        Commands::Completions { .. } => unreachable!(),
    }

    Ok(())
}
