//! Runs one notification through every stage

use anyhow::Result;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, info_span, warn, Instrument};

use crate::auth::TokenSource;
use crate::config::Settings;
use crate::event::{is_supported_media, normalize, ObjectReference};
use crate::llm::{build_provider, SummaryComposer, SummaryRequest};
use crate::pipeline::result::{PipelineError, PipelineResult, SkipReason};
use crate::render;
use crate::storage::{ArtifactLocation, GcsClient, ObjectStore, PDF_CONTENT_TYPE};
use crate::transcription::{SpeechClient, Transcriber};

/// Pipeline with its external clients. Cheap to share behind an `Arc`.
pub struct Pipeline {
    transcriber: Arc<dyn Transcriber>,
    composer: SummaryComposer,
    store: Arc<dyn ObjectStore>,
    output_bucket: String,
    instructions: String,
}

impl Pipeline {
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        composer: SummaryComposer,
        store: Arc<dyn ObjectStore>,
        output_bucket: impl Into<String>,
        instructions: impl Into<String>,
    ) -> Self {
        Self {
            transcriber,
            composer,
            store,
            output_bucket: output_bucket.into(),
            instructions: instructions.into(),
        }
    }

    /// Build the pipeline against the real Google Cloud services
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        settings.validate()?;

        let tokens = Arc::new(TokenSource::from_settings(settings)?);
        let transcriber = Arc::new(SpeechClient::from_settings(settings, tokens.clone())?);
        let provider = build_provider(settings, tokens.clone())?;
        let store = Arc::new(GcsClient::from_settings(settings, tokens)?);

        Ok(Self::new(
            transcriber,
            SummaryComposer::new(provider),
            store,
            settings.storage.output_bucket.clone(),
            settings.summary_instructions(),
        ))
    }

    /// Handle one notification. Never panics on unexpected payloads.
    pub async fn handle(&self, event: &Value) -> PipelineResult {
        let invocation_id = uuid::Uuid::new_v4();
        let span = info_span!("invocation", id = %invocation_id);

        async {
            let Some(reference) = normalize(event) else {
                info!("Skipping event without an object reference");
                return PipelineResult::Skipped(SkipReason::Unrecognized);
            };

            if !is_supported_media(&reference.name) {
                info!("Skipping {}: unsupported media", reference.uri());
                return PipelineResult::Skipped(SkipReason::UnsupportedMedia {
                    name: reference.name,
                });
            }

            match self.run(&reference).await {
                Ok(location) => {
                    info!("Summary for {} stored at {}", reference.uri(), location.uri());
                    PipelineResult::Succeeded(location)
                }
                Err(err) => {
                    error!(stage = err.stage().as_str(), "Pipeline failed for {}: {}", reference.uri(), err);
                    PipelineResult::Failed(err)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run(&self, reference: &ObjectReference) -> Result<ArtifactLocation, PipelineError> {
        let transcript = self.transcriber.transcribe(&reference.uri()).await?;
        if transcript.is_empty() {
            warn!("No speech recognized in {}", reference.uri());
        }
        let transcript = transcript.text();

        let summary = self
            .composer
            .summarize(SummaryRequest {
                transcript: &transcript,
                instructions: &self.instructions,
            })
            .await?;

        let pdf = render::render(&summary)?;

        let location = ArtifactLocation::for_object(&self.output_bucket, &reference.name);
        self.store.upload(&location, pdf, PDF_CONTENT_TYPE).await?;

        Ok(location)
    }
}
