//! CLI command implementations

use anyhow::{Context, Result};
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::cli::args::ConfigCommand;
use crate::config::Settings;
use crate::pipeline::Pipeline;
use crate::render;
use crate::RelayError;

/// Run the pipeline on a single event and print its status report
pub async fn process_event(settings: &Settings, event_path: &Path) -> Result<()> {
    let raw = read_input(event_path)?;
    let event: Value = serde_json::from_str(&raw).map_err(RelayError::Event)?;

    let pipeline = Pipeline::from_settings(settings)?;
    let result = pipeline.handle(&event).await;

    println!("{}", serde_json::to_string_pretty(&result.report())?);

    if result.is_failure() {
        anyhow::bail!("Pipeline failed");
    }
    Ok(())
}

/// Render a local text file to PDF
pub fn render_file(input: &Path, output: &Path) -> Result<()> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let pdf = render::render(&text)?;
    std::fs::write(output, &pdf)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "Rendered {} pages to: {}",
        render::layout(&text).len(),
        output.display()
    );
    Ok(())
}

/// Handle config subcommands
pub fn config_command(
    settings: &Settings,
    config_path: Option<PathBuf>,
    cmd: ConfigCommand,
) -> Result<()> {
    let path = match config_path {
        Some(path) => path,
        None => Settings::config_path()?,
    };

    match cmd {
        ConfigCommand::Show => {
            let toml = toml::to_string_pretty(&redacted(settings))?;
            println!("{}", toml);
        }
        ConfigCommand::Path => {
            println!("{}", path.display());
        }
        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at {}. Use --force to overwrite.",
                    path.display()
                );
            }
            Settings::write_default(&path)?;
            println!("Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

fn read_input(path: &Path) -> crate::Result<String> {
    if path.as_os_str() == "-" {
        let mut raw = String::new();
        std::io::stdin().read_to_string(&mut raw)?;
        return Ok(raw);
    }
    Ok(std::fs::read_to_string(path)?)
}

fn redacted(settings: &Settings) -> Settings {
    let mut settings = settings.clone();
    for secret in [&mut settings.llm.api_key, &mut settings.gcp.access_token] {
        if !secret.is_empty() {
            *secret = "********".to_string();
        }
    }
    settings
}
