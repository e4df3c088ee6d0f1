//! Transcript model and the transcriber seam

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while transcribing a recording
#[derive(Debug, Error)]
pub enum TranscriptionError {
    #[error("Speech-to-Text request failed: {0}")]
    Request(String),

    #[error("Speech-to-Text reported an error: {0}")]
    Engine(String),

    #[error("Transcription did not finish within {secs}s")]
    Timeout { secs: u64 },
}

/// A recognized stretch of speech, top alternative only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Trimmed, non-empty text
    pub text: String,

    /// Engine confidence (0.0 - 1.0), when reported
    pub confidence: Option<f64>,
}

/// Ordered transcript of a whole recording
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    segments: Vec<TranscriptSegment>,
}

impl Transcript {
    /// Add a segment; whitespace is trimmed and empty text is dropped
    pub fn push(&mut self, text: &str, confidence: Option<f64>) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        self.segments.push(TranscriptSegment {
            text: text.to_string(),
            confidence,
        });
    }

    pub fn segments(&self) -> &[TranscriptSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segment texts joined by newlines, in engine order
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl<S: AsRef<str>> FromIterator<S> for Transcript {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut transcript = Transcript::default();
        for text in iter {
            transcript.push(text.as_ref(), None);
        }
        transcript
    }
}

/// Converts a stored recording into a transcript
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, object_uri: &str) -> Result<Transcript, TranscriptionError>;
}
