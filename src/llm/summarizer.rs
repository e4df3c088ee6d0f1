//! Meeting summary generation

use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::llm::client::LlmProvider;
use crate::llm::prompts::build_summary_prompt;

/// Errors raised while generating a summary
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Generation request failed: {0}")]
    Request(String),

    #[error("Model returned an empty summary")]
    Empty,
}

/// Summary generation request payload.
pub struct SummaryRequest<'a> {
    pub transcript: &'a str,
    pub instructions: &'a str,
}

/// Turns transcripts into meeting summaries through an [`LlmProvider`]
#[derive(Clone)]
pub struct SummaryComposer {
    provider: Arc<dyn LlmProvider>,
}

impl SummaryComposer {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    /// Generate a summary. The model output is returned verbatim.
    pub async fn summarize(&self, request: SummaryRequest<'_>) -> Result<String, GenerationError> {
        let prompt = build_summary_prompt(request.transcript, request.instructions);
        info!("Requesting summary ({} prompt chars)", prompt.chars().count());

        let summary = self
            .provider
            .generate(&prompt)
            .await
            .map_err(|e| GenerationError::Request(format!("{e:#}")))?;

        if summary.trim().is_empty() {
            return Err(GenerationError::Empty);
        }

        Ok(summary)
    }
}
