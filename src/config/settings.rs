//! Application settings management

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::RelayError;

/// Main application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// General settings
    #[serde(default)]
    pub general: GeneralSettings,

    /// Google Cloud project and credentials
    #[serde(default)]
    pub gcp: GcpSettings,

    /// Speech-to-Text batch recognition settings
    #[serde(default)]
    pub transcription: TranscriptionSettings,

    /// LLM settings
    #[serde(default)]
    pub llm: LlmSettings,

    /// Output storage settings
    #[serde(default)]
    pub storage: StorageSettings,

    /// Summary prompt settings
    #[serde(default)]
    pub summary: SummarySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Address the HTTP server binds to
    #[serde(default = "default_bind")]
    pub bind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GcpSettings {
    /// Google Cloud project id
    #[serde(default)]
    pub project_id: String,

    /// Static OAuth2 access token (empty = use the metadata server)
    #[serde(default)]
    pub access_token: String,

    /// Metadata server token endpoint
    #[serde(default = "default_metadata_endpoint")]
    pub metadata_endpoint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionSettings {
    /// Speech-to-Text location (global, us, eu, europe-west4, ...)
    #[serde(default = "default_speech_location")]
    pub location: String,

    /// BCP-47 language code of the recordings
    #[serde(default = "default_language")]
    pub language: String,

    /// Expected number of speakers for diarization
    #[serde(default = "default_speaker_count")]
    pub speaker_count: u32,

    /// Recognition model
    #[serde(default = "default_speech_model")]
    pub model: String,

    /// Upper bound on waiting for a batch operation
    #[serde(default = "default_transcription_timeout")]
    pub timeout_secs: u64,

    /// Delay between operation status polls
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// API endpoint override (empty = derived from location)
    #[serde(default)]
    pub endpoint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// LLM provider (gemini, vertex)
    #[serde(default = "default_llm_provider")]
    pub provider: String,

    /// API key (gemini provider only)
    #[serde(default)]
    pub api_key: String,

    /// Model name
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// API endpoint override
    #[serde(default)]
    pub endpoint: String,

    /// Vertex AI location
    #[serde(default = "default_llm_location")]
    pub location: String,

    /// Request timeout
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Bucket the rendered PDFs are uploaded to
    #[serde(default)]
    pub output_bucket: String,

    /// Cloud Storage JSON API endpoint
    #[serde(default = "default_storage_endpoint")]
    pub endpoint: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummarySettings {
    /// Extra instructions appended to the summary prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

// Default value functions

fn default_log_level() -> String {
    "info".to_string()
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_metadata_endpoint() -> String {
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token"
        .to_string()
}

fn default_speech_location() -> String {
    "global".to_string()
}

fn default_language() -> String {
    "ru-RU".to_string()
}

fn default_speaker_count() -> u32 {
    2
}

fn default_speech_model() -> String {
    "latest_long".to_string()
}

fn default_transcription_timeout() -> u64 {
    3600
}

fn default_poll_interval() -> u64 {
    10
}

fn default_llm_provider() -> String {
    "gemini".to_string()
}

fn default_llm_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_llm_location() -> String {
    "us-central1".to_string()
}

fn default_llm_timeout() -> u64 {
    300
}

fn default_storage_endpoint() -> String {
    "https://storage.googleapis.com".to_string()
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            bind: default_bind(),
        }
    }
}

impl Default for GcpSettings {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            access_token: String::new(),
            metadata_endpoint: default_metadata_endpoint(),
        }
    }
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            location: default_speech_location(),
            language: default_language(),
            speaker_count: default_speaker_count(),
            model: default_speech_model(),
            timeout_secs: default_transcription_timeout(),
            poll_interval_secs: default_poll_interval(),
            endpoint: String::new(),
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            api_key: String::new(),
            model: default_llm_model(),
            endpoint: String::new(),
            location: default_llm_location(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            output_bucket: String::new(),
            endpoint: default_storage_endpoint(),
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load settings from an explicit path, falling back to defaults when it is absent
    pub fn load_from(config_path: &Path) -> Result<Self> {
        Self::load_with(config_path, |key| std::env::var(key).ok())
    }

    /// Load settings from `config_path`, then apply overrides from `lookup`
    pub fn load_with<F>(config_path: &Path, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = if config_path.exists() {
            let content = std::fs::read_to_string(config_path).with_context(|| {
                format!("Failed to read config file: {}", config_path.display())
            })?;

            toml::from_str(&content).with_context(|| {
                format!("Failed to parse config file: {}", config_path.display())
            })?
        } else {
            tracing::debug!("No config file found, using defaults");
            Self::default()
        };

        settings.apply_env_overrides(lookup)?;

        Ok(settings)
    }

    /// Apply environment variable overrides.
    ///
    /// Values that are unset or blank leave the file setting untouched.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> crate::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(project) = var("GOOGLE_CLOUD_PROJECT") {
            self.gcp.project_id = project;
        }
        if let Some(token) = var("GOOGLE_OAUTH_ACCESS_TOKEN") {
            self.gcp.access_token = token;
        }
        if let Some(location) = var("SPEECH_LOCATION") {
            self.transcription.location = location;
        }
        if let Some(language) = var("TRANSCRIPTION_LANGUAGE") {
            self.transcription.language = language;
        }
        if let Some(count) = var("SPEAKER_COUNT") {
            self.transcription.speaker_count = count.trim().parse().map_err(|_| {
                RelayError::Config(format!("SPEAKER_COUNT must be a positive integer, got '{count}'"))
            })?;
        }
        if let Some(bucket) = var("PDF_BUCKET") {
            self.storage.output_bucket = bucket;
        }
        if let Some(model) = var("GENAI_MODEL") {
            self.llm.model = model;
        }
        if self.llm.api_key.trim().is_empty() {
            if let Some(key) = var("GEMINI_API_KEY") {
                self.llm.api_key = key;
            }
        }
        if let Some(instructions) = var("SUMMARY_INSTRUCTIONS") {
            self.summary.instructions = Some(instructions);
        }
        if let Some(port) = var("PORT") {
            let port: u16 = port.trim().parse().map_err(|_| {
                RelayError::Config(format!("PORT must be a TCP port number, got '{port}'"))
            })?;
            let host = self
                .general
                .bind
                .rsplit_once(':')
                .map(|(host, _)| host.to_string())
                .unwrap_or_else(|| "0.0.0.0".to_string());
            self.general.bind = format!("{host}:{port}");
        }

        Ok(())
    }

    /// Check the settings the pipeline cannot run without
    pub fn validate(&self) -> crate::Result<()> {
        if self.gcp.project_id.trim().is_empty() {
            return Err(RelayError::Config(
                "gcp.project_id is empty. Set it in config or GOOGLE_CLOUD_PROJECT.".to_string(),
            ));
        }
        if self.storage.output_bucket.trim().is_empty() {
            return Err(RelayError::Config(
                "storage.output_bucket is empty. Set it in config or PDF_BUCKET.".to_string(),
            ));
        }
        if self.transcription.speaker_count == 0 {
            return Err(RelayError::Config(
                "transcription.speaker_count must be at least 1".to_string(),
            ));
        }
        if self.transcription.timeout_secs == 0 {
            return Err(RelayError::Config(
                "transcription.timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.transcription.poll_interval_secs == 0 {
            return Err(RelayError::Config(
                "transcription.poll_interval_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("com", "minutes-relay", "minutes-relay")
            .context("Could not determine config directory")?;

        let config_dir = dirs.config_dir();
        Ok(config_dir.join("config.toml"))
    }

    /// Write default configuration to a file
    pub fn write_default(path: &Path) -> Result<()> {
        let settings = Self::default();
        let content = toml::to_string_pretty(&settings)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Instructions passed to the summarizer, or the canned directive
    pub fn summary_instructions(&self) -> String {
        match self.summary.instructions.as_deref() {
            Some(text) if !text.trim().is_empty() => text.to_string(),
            _ => crate::llm::DEFAULT_INSTRUCTIONS.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_deployment() {
        let settings = Settings::default();
        assert_eq!(settings.llm.model, "gemini-2.5-flash");
        assert_eq!(settings.transcription.location, "global");
        assert_eq!(settings.transcription.language, "ru-RU");
        assert_eq!(settings.transcription.speaker_count, 2);
        assert_eq!(settings.transcription.timeout_secs, 3600);
        assert_eq!(settings.general.bind, "0.0.0.0:8080");
    }

    #[test]
    fn env_overrides_replace_file_values() {
        let mut settings = Settings::default();
        settings
            .apply_env_overrides(env(&[
                ("GOOGLE_CLOUD_PROJECT", "acme"),
                ("SPEECH_LOCATION", "eu"),
                ("PDF_BUCKET", "minutes-out"),
                ("SPEAKER_COUNT", "4"),
                ("GENAI_MODEL", "gemini-2.5-pro"),
                ("PORT", "9090"),
            ]))
            .unwrap();

        assert_eq!(settings.gcp.project_id, "acme");
        assert_eq!(settings.transcription.location, "eu");
        assert_eq!(settings.storage.output_bucket, "minutes-out");
        assert_eq!(settings.transcription.speaker_count, 4);
        assert_eq!(settings.llm.model, "gemini-2.5-pro");
        assert_eq!(settings.general.bind, "0.0.0.0:9090");
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let mut settings = Settings::default();
        settings
            .apply_env_overrides(env(&[("GENAI_MODEL", "  ")]))
            .unwrap();
        assert_eq!(settings.llm.model, "gemini-2.5-flash");
    }

    #[test]
    fn invalid_speaker_count_is_a_config_error() {
        let mut settings = Settings::default();
        let err = settings
            .apply_env_overrides(env(&[("SPEAKER_COUNT", "two")]))
            .unwrap_err();
        assert!(matches!(err, RelayError::Config(_)));
        assert!(err.to_string().contains("SPEAKER_COUNT"));
    }

    #[test]
    fn validate_requires_project_and_bucket() {
        let mut settings = Settings::default();
        assert!(settings.validate().unwrap_err().to_string().contains("project_id"));

        settings.gcp.project_id = "acme".to_string();
        assert!(settings.validate().unwrap_err().to_string().contains("output_bucket"));

        settings.storage.output_bucket = "minutes-out".to_string();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn summary_instructions_fall_back_to_canned_directive() {
        let mut settings = Settings::default();
        assert_eq!(settings.summary_instructions(), crate::llm::DEFAULT_INSTRUCTIONS);

        settings.summary.instructions = Some("Answer in English.".to_string());
        assert_eq!(settings.summary_instructions(), "Answer in English.");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [gcp]
            project_id = "acme"

            [transcription]
            language = "en-US"
            "#,
        )
        .unwrap();

        assert_eq!(settings.gcp.project_id, "acme");
        assert_eq!(settings.transcription.language, "en-US");
        assert_eq!(settings.transcription.model, "latest_long");
        assert_eq!(settings.storage.endpoint, "https://storage.googleapis.com");
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_with(&dir.path().join("absent.toml"), env(&[])).unwrap();
        assert_eq!(settings.transcription.poll_interval_secs, 10);
        assert_eq!(settings.transcription.speaker_count, 2);
        assert!(settings.gcp.project_id.is_empty());
    }

    #[test]
    fn env_overrides_apply_on_top_of_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[gcp]\nproject_id = \"from-file\"\n\n[storage]\noutput_bucket = \"file-bucket\"\n",
        )
        .unwrap();

        let settings = Settings::load_with(&path, env(&[("PDF_BUCKET", "env-bucket")])).unwrap();
        assert_eq!(settings.gcp.project_id, "from-file");
        assert_eq!(settings.storage.output_bucket, "env-bucket");
    }

    #[test]
    fn validate_rejects_zero_timings() {
        let mut settings = Settings::default();
        settings.gcp.project_id = "acme".to_string();
        settings.storage.output_bucket = "minutes-out".to_string();

        settings.transcription.poll_interval_secs = 0;
        let err = settings.validate().unwrap_err();
        assert!(matches!(err, RelayError::Config(_)));
        assert!(err.to_string().contains("poll_interval_secs"));

        settings.transcription.poll_interval_secs = 10;
        settings.transcription.timeout_secs = 0;
        assert!(settings.validate().unwrap_err().to_string().contains("timeout_secs"));
    }

    #[test]
    fn written_defaults_parse_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        Settings::write_default(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let settings: Settings = toml::from_str(&content).unwrap();
        assert_eq!(settings.general.bind, "0.0.0.0:8080");
        assert_eq!(settings.transcription.speaker_count, 2);
        assert_eq!(settings.llm.model, "gemini-2.5-flash");
        assert!(settings.summary.instructions.is_none());
    }
}
