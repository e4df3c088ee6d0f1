//! LLM module for minutes-relay
//!
//! Builds the meeting-summary prompt and sends it to Gemini.

mod client;
mod gemini;
mod prompts;
mod summarizer;

pub use client::{build_provider, LlmProvider};
pub use gemini::GeminiClient;
pub use prompts::{build_summary_prompt, DEFAULT_INSTRUCTIONS, MAX_TRANSCRIPT_CHARS};
pub use summarizer::{GenerationError, SummaryComposer, SummaryRequest};
