//! Storage module for minutes-relay
//!
//! Uploads rendered summaries to Cloud Storage.

mod gcs;
mod models;

pub use gcs::GcsClient;
pub use models::{artifact_name, ArtifactLocation, ObjectStore, UploadError, PDF_CONTENT_TYPE};
