use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::auth::TokenSource;
use crate::config::Settings;
use crate::llm::gemini::GeminiClient;

/// A text-generation backend. Returns the model output verbatim.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Build an LLM provider from runtime settings.
pub fn build_provider(
    settings: &Settings,
    tokens: Arc<TokenSource>,
) -> Result<Arc<dyn LlmProvider>> {
    match settings.llm.provider.to_lowercase().as_str() {
        "gemini" => Ok(Arc::new(GeminiClient::from_settings(settings)?)),
        "vertex" => Ok(Arc::new(GeminiClient::vertex_from_settings(settings, tokens)?)),
        other => anyhow::bail!(
            "Unsupported llm.provider '{}'. Supported providers: gemini, vertex",
            other
        ),
    }
}
