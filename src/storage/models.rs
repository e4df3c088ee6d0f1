//! Artifact naming and the object store seam

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

#[derive(Debug, Error)]
#[error("Upload of {uri} failed: {reason}")]
pub struct UploadError {
    pub uri: String,
    pub reason: String,
}

/// Where a rendered summary is stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactLocation {
    pub bucket: String,
    pub name: String,
}

impl ArtifactLocation {
    /// Location of the summary for `object_name` inside `bucket`
    pub fn for_object(bucket: &str, object_name: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            name: artifact_name(object_name),
        }
    }

    pub fn uri(&self) -> String {
        format!("gs://{}/{}", self.bucket, self.name)
    }
}

/// Base filename of `object_name` with its extension replaced by `.pdf`
pub fn artifact_name(object_name: &str) -> String {
    let base = object_name.rsplit('/').next().unwrap_or(object_name);
    let stem = match base.rfind('.') {
        Some(idx) if idx > 0 => &base[..idx],
        _ => base,
    };
    format!("{stem}.pdf")
}

/// Destination for rendered artifacts. Uploads overwrite existing objects.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(
        &self,
        location: &ArtifactLocation,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), UploadError>;
}
