//! Pipeline outcomes and their wire representation

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm::GenerationError;
use crate::render::RenderError;
use crate::storage::{ArtifactLocation, UploadError};
use crate::transcription::TranscriptionError;

/// Pipeline stage that can fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Transcription,
    Generation,
    Render,
    Upload,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transcription => "transcription",
            Self::Generation => "generation",
            Self::Render => "render",
            Self::Upload => "upload",
        }
    }
}

/// A stage failure. Aborts the rest of the pipeline for that event.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Transcription(#[from] TranscriptionError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Upload(#[from] UploadError),
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            Self::Transcription(_) => Stage::Transcription,
            Self::Generation(_) => Stage::Generation,
            Self::Render(_) => Stage::Render,
            Self::Upload(_) => Stage::Upload,
        }
    }
}

/// Why an event was ignored
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The payload matched no known notification shape
    Unrecognized,

    /// The object is not a supported recording (e.g. our own PDF)
    UnsupportedMedia { name: String },
}

impl SkipReason {
    pub fn describe(&self) -> String {
        match self {
            Self::Unrecognized => "event does not reference a storage object".to_string(),
            Self::UnsupportedMedia { name } => format!("{name} is not an .mp4 recording"),
        }
    }
}

/// Outcome of handling one notification
#[derive(Debug)]
pub enum PipelineResult {
    Skipped(SkipReason),
    Succeeded(ArtifactLocation),
    Failed(PipelineError),
}

impl PipelineResult {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// JSON status returned to the notification sender
    pub fn report(&self) -> StatusReport {
        match self {
            Self::Skipped(reason) => StatusReport::Skipped {
                reason: reason.describe(),
            },
            Self::Succeeded(location) => StatusReport::Ok { pdf: location.uri() },
            Self::Failed(err) => StatusReport::Error {
                stage: err.stage(),
                error: err.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StatusReport {
    Skipped { reason: String },
    Ok { pdf: String },
    Error { stage: Stage, error: String },
}
