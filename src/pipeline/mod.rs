//! Pipeline orchestration
//!
//! Normalize → transcribe → summarize → render → upload, one event at a time.

mod coordinator;
mod result;

pub use coordinator::Pipeline;
pub use result::{PipelineError, PipelineResult, SkipReason, Stage, StatusReport};
