//! OAuth2 bearer tokens for Google Cloud APIs
//!
//! On Cloud Run the service account token comes from the metadata server.
//! Locally a token minted with `gcloud auth print-access-token` can be supplied
//! through configuration instead.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::config::Settings;

/// Tokens are refreshed this long before the server-reported expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Source of access tokens shared by every Google API client
pub enum TokenSource {
    /// Fixed token from configuration
    Static(String),

    /// Service account token from the metadata server
    Metadata(MetadataTokenSource),
}

pub struct MetadataTokenSource {
    http: Client,
    endpoint: String,
    cached: RwLock<Option<CachedToken>>,
}

struct CachedToken {
    value: String,
    refresh_at: Instant,
}

#[derive(Debug, Deserialize)]
struct MetadataTokenResponse {
    access_token: String,
    expires_in: u64,
}

impl TokenSource {
    /// Pick the token source configured in settings
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let token = settings.gcp.access_token.trim();
        if !token.is_empty() {
            return Ok(Self::Static(token.to_string()));
        }

        Ok(Self::Metadata(MetadataTokenSource::new(
            &settings.gcp.metadata_endpoint,
        )?))
    }

    /// Return a valid access token
    pub async fn token(&self) -> Result<String> {
        match self {
            Self::Static(token) => Ok(token.clone()),
            Self::Metadata(source) => source.token().await,
        }
    }
}

impl MetadataTokenSource {
    pub fn new(endpoint: &str) -> Result<Self> {
        Ok(Self {
            http: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .context("Failed to build metadata HTTP client")?,
            endpoint: endpoint.to_string(),
            cached: RwLock::new(None),
        })
    }

    async fn token(&self) -> Result<String> {
        if let Some(cached) = self.cached.read().await.as_ref() {
            if Instant::now() < cached.refresh_at {
                return Ok(cached.value.clone());
            }
        }

        let mut guard = self.cached.write().await;
        // Another task may have refreshed while we waited for the lock.
        if let Some(cached) = guard.as_ref() {
            if Instant::now() < cached.refresh_at {
                return Ok(cached.value.clone());
            }
        }

        tracing::debug!("Fetching access token from metadata server");
        let payload: MetadataTokenResponse = self
            .http
            .get(&self.endpoint)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .context("Metadata server request failed")?
            .error_for_status()
            .context("Metadata server returned an error status")?
            .json()
            .await
            .context("Failed to parse metadata token response")?;

        let lifetime = Duration::from_secs(payload.expires_in).saturating_sub(EXPIRY_MARGIN);
        *guard = Some(CachedToken {
            value: payload.access_token.clone(),
            refresh_at: Instant::now() + lifetime,
        });

        Ok(payload.access_token)
    }
}
