use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::auth::TokenSource;
use crate::config::Settings;
use crate::llm::client::LlmProvider;

const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

enum Auth {
    ApiKey(String),
    Bearer(Arc<TokenSource>),
}

pub struct GeminiClient {
    http: Client,
    auth: Auth,
    model_url: String,
}

impl GeminiClient {
    /// Client for the Generative Language API, authenticated by API key
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = settings.llm.api_key.trim().to_string();
        if api_key.is_empty() {
            anyhow::bail!(
                "Gemini API key is missing. Set llm.api_key in config or GEMINI_API_KEY."
            );
        }

        let endpoint = endpoint_or(settings, DEFAULT_GEMINI_ENDPOINT.to_string());
        let model_url = format!("{}/models/{}", endpoint, model_name(settings));

        Self::build(settings, Auth::ApiKey(api_key), model_url)
    }

    /// Client for Gemini on Vertex AI, authenticated by OAuth2 token
    pub fn vertex_from_settings(settings: &Settings, tokens: Arc<TokenSource>) -> Result<Self> {
        let project = settings.gcp.project_id.trim();
        if project.is_empty() {
            anyhow::bail!(
                "Vertex AI needs a Google Cloud project. Set gcp.project_id or GOOGLE_CLOUD_PROJECT."
            );
        }

        let location = settings.llm.location.trim();
        let endpoint = endpoint_or(
            settings,
            format!("https://{location}-aiplatform.googleapis.com/v1"),
        );
        let model_url = format!(
            "{}/projects/{}/locations/{}/publishers/google/models/{}",
            endpoint,
            project,
            location,
            model_name(settings)
        );

        Self::build(settings, Auth::Bearer(tokens), model_url)
    }

    fn build(settings: &Settings, auth: Auth, model_url: String) -> Result<Self> {
        Ok(Self {
            http: Client::builder()
                .timeout(Duration::from_secs(settings.llm.timeout_secs))
                .build()
                .context("Failed to build Gemini HTTP client")?,
            auth,
            model_url,
        })
    }

    fn request_url(&self) -> String {
        format!("{}:generateContent", self.model_url)
    }
}

fn model_name(settings: &Settings) -> String {
    if settings.llm.model.trim().is_empty() {
        DEFAULT_GEMINI_MODEL.to_string()
    } else {
        settings.llm.model.trim().to_string()
    }
}

fn endpoint_or(settings: &Settings, default: String) -> String {
    if settings.llm.endpoint.trim().is_empty() {
        default
    } else {
        settings
            .llm
            .endpoint
            .trim()
            .trim_end_matches('/')
            .to_string()
    }
}

#[async_trait]
impl LlmProvider for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = GeminiGenerateContentRequest {
            contents: vec![GeminiContent {
                role: "user",
                parts: vec![GeminiPart { text: prompt }],
            }],
        };

        let request = self.http.post(self.request_url()).json(&body);
        let request = match &self.auth {
            Auth::ApiKey(key) => request.header("x-goog-api-key", key.as_str()),
            Auth::Bearer(tokens) => request.bearer_auth(tokens.token().await?),
        };

        let response = request.send().await.context("Gemini request failed")?;

        let response = response
            .error_for_status()
            .context("Gemini returned an error status")?;

        let payload: GeminiGenerateContentResponse = response
            .json()
            .await
            .context("Failed to parse Gemini response")?;

        let candidate = payload
            .candidates
            .into_iter()
            .next()
            .context("Gemini response did not contain any candidates")?;

        // Blank text is returned as-is; the summarizer decides what it means.
        Ok(candidate
            .content
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect())
    }
}

#[derive(Debug, Serialize)]
struct GeminiGenerateContentRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    role: &'a str,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GeminiGenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: GeminiContentResponse,
}

#[derive(Debug, Default, Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
struct GeminiPartResponse {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gemini_url_uses_configured_model() {
        let mut settings = Settings::default();
        settings.llm.api_key = "key".to_string();
        settings.llm.model = "gemini-2.5-pro".to_string();

        let client = GeminiClient::from_settings(&settings).unwrap();
        assert_eq!(
            client.request_url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-pro:generateContent"
        );
    }

    #[test]
    fn vertex_url_is_regional() {
        let mut settings = Settings::default();
        settings.gcp.project_id = "acme".to_string();
        settings.llm.location = "europe-west4".to_string();

        let client = GeminiClient::vertex_from_settings(
            &settings,
            Arc::new(TokenSource::Static("t".into())),
        )
        .unwrap();
        assert_eq!(
            client.request_url(),
            "https://europe-west4-aiplatform.googleapis.com/v1/projects/acme/locations/europe-west4/publishers/google/models/gemini-2.5-flash:generateContent"
        );
    }
}
