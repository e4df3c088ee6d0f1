//! Cloud Storage JSON API uploads

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::auth::TokenSource;
use crate::config::Settings;
use crate::storage::models::{ArtifactLocation, ObjectStore, UploadError};

pub struct GcsClient {
    http: Client,
    endpoint: String,
    tokens: Arc<TokenSource>,
}

impl GcsClient {
    pub fn new(endpoint: &str, tokens: Arc<TokenSource>) -> Result<Self> {
        Ok(Self {
            http: Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .context("Failed to build Cloud Storage HTTP client")?,
            endpoint: endpoint.trim().trim_end_matches('/').to_string(),
            tokens,
        })
    }

    pub fn from_settings(settings: &Settings, tokens: Arc<TokenSource>) -> Result<Self> {
        Self::new(&settings.storage.endpoint, tokens)
    }

    async fn put(&self, location: &ArtifactLocation, bytes: Vec<u8>, content_type: &str) -> Result<()> {
        let url = format!("{}/upload/storage/v1/b/{}/o", self.endpoint, location.bucket);
        let token = self.tokens.token().await?;

        self.http
            .post(url)
            .query(&[("uploadType", "media"), ("name", location.name.as_str())])
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .context("Cloud Storage request failed")?
            .error_for_status()
            .context("Cloud Storage returned an error status")?;

        Ok(())
    }
}

#[async_trait]
impl ObjectStore for GcsClient {
    async fn upload(
        &self,
        location: &ArtifactLocation,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), UploadError> {
        let size = bytes.len();
        self.put(location, bytes, content_type)
            .await
            .map_err(|e| UploadError {
                uri: location.uri(),
                reason: format!("{e:#}"),
            })?;

        info!("Uploaded {} ({} bytes)", location.uri(), size);
        Ok(())
    }
}
