//! minutes-relay - turns uploaded meeting recordings into PDF summaries
//!
//! A storage notification arrives, the referenced recording is transcribed,
//! summarized by Gemini, rendered to PDF and uploaded next to the other minutes.

pub mod auth;
pub mod cli;
pub mod config;
pub mod event;
pub mod llm;
pub mod pipeline;
pub mod render;
pub mod server;
pub mod storage;
pub mod transcription;

use thiserror::Error;

/// Main error type for minutes-relay
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid event payload: {0}")]
    Event(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RelayError>;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "minutes-relay";
