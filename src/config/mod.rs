//! Configuration module for minutes-relay
//!
//! Handles loading settings from TOML files and environment overrides.

mod settings;

pub use settings::{
    GcpSettings, GeneralSettings, LlmSettings, Settings, StorageSettings, SummarySettings,
    TranscriptionSettings,
};
