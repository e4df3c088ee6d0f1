//! Transcription module for minutes-relay
//!
//! Handles batch speech-to-text through Google Cloud Speech-to-Text v2.

mod speech;
mod transcript;

pub use speech::{flatten_response, BatchRecognizeResponse, SpeechClient, SpeechConfig};
pub use transcript::{Transcriber, Transcript, TranscriptSegment, TranscriptionError};
