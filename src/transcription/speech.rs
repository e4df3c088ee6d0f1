//! Google Cloud Speech-to-Text v2 batch recognition

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::auth::TokenSource;
use crate::config::Settings;
use crate::transcription::transcript::{Transcriber, Transcript, TranscriptionError};

/// Everything needed to issue and await a batch recognition
#[derive(Debug, Clone)]
pub struct SpeechConfig {
    pub project_id: String,
    pub location: String,
    pub language: String,
    pub speaker_count: u32,
    pub model: String,
    /// Base URL without the `/v2` suffix
    pub endpoint: String,
    /// Upper bound on waiting for the long-running operation
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl SpeechConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        let t = &settings.transcription;
        let endpoint = if t.endpoint.trim().is_empty() {
            default_endpoint(&t.location)
        } else {
            t.endpoint.trim().trim_end_matches('/').to_string()
        };

        Self {
            project_id: settings.gcp.project_id.clone(),
            location: t.location.clone(),
            language: t.language.clone(),
            speaker_count: t.speaker_count,
            model: t.model.clone(),
            endpoint,
            timeout: Duration::from_secs(t.timeout_secs),
            poll_interval: Duration::from_secs(t.poll_interval_secs),
        }
    }
}

/// Regional recognizers live behind regional hostnames.
fn default_endpoint(location: &str) -> String {
    if location == "global" {
        "https://speech.googleapis.com".to_string()
    } else {
        format!("https://{location}-speech.googleapis.com")
    }
}

/// Speech-to-Text client issuing `batchRecognize` operations
pub struct SpeechClient {
    http: Client,
    tokens: Arc<TokenSource>,
    config: SpeechConfig,
}

impl SpeechClient {
    pub fn new(config: SpeechConfig, tokens: Arc<TokenSource>) -> Result<Self> {
        Ok(Self {
            http: Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .context("Failed to build Speech-to-Text HTTP client")?,
            tokens,
            config,
        })
    }

    pub fn from_settings(settings: &Settings, tokens: Arc<TokenSource>) -> Result<Self> {
        Self::new(SpeechConfig::from_settings(settings), tokens)
    }

    fn recognizer(&self) -> String {
        format!(
            "projects/{}/locations/{}/recognizers/_",
            self.config.project_id, self.config.location
        )
    }

    fn build_request<'a>(&'a self, object_uri: &'a str) -> BatchRecognizeRequest<'a> {
        BatchRecognizeRequest {
            config: RecognitionConfig {
                auto_decoding_config: Empty {},
                language_codes: vec![self.config.language.as_str()],
                model: self.config.model.as_str(),
                features: RecognitionFeatures {
                    enable_automatic_punctuation: true,
                    enable_spoken_punctuation: true,
                    enable_word_time_offsets: true,
                    diarization_config: SpeakerDiarizationConfig {
                        min_speaker_count: self.config.speaker_count,
                        max_speaker_count: self.config.speaker_count,
                    },
                },
            },
            files: vec![FileMetadata { uri: object_uri }],
            recognition_output_config: RecognitionOutputConfig {
                inline_response_config: Empty {},
            },
        }
    }

    async fn submit(&self, object_uri: &str) -> Result<Operation> {
        let url = format!(
            "{}/v2/{}:batchRecognize",
            self.config.endpoint,
            self.recognizer()
        );
        let token = self.tokens.token().await?;

        self.http
            .post(url)
            .bearer_auth(token)
            .json(&self.build_request(object_uri))
            .send()
            .await
            .context("batchRecognize request failed")?
            .error_for_status()
            .context("batchRecognize returned an error status")?
            .json()
            .await
            .context("Failed to parse batchRecognize operation")
    }

    async fn fetch_operation(&self, name: &str) -> Result<Operation> {
        let url = format!("{}/v2/{}", self.config.endpoint, name);
        let token = self.tokens.token().await?;

        self.http
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .context("Operation status request failed")?
            .error_for_status()
            .context("Operation status returned an error status")?
            .json()
            .await
            .context("Failed to parse operation status")
    }

    /// Poll until the operation is done. Callers bound this with a timeout.
    async fn wait(&self, mut operation: Operation) -> Result<BatchRecognizeResponse, TranscriptionError> {
        loop {
            if operation.done {
                if let Some(status) = operation.error {
                    return Err(TranscriptionError::Engine(status.to_string()));
                }
                return operation.response.ok_or_else(|| {
                    TranscriptionError::Engine("operation finished without a response".to_string())
                });
            }

            tokio::time::sleep(self.config.poll_interval).await;
            debug!("Polling operation {}", operation.name);
            operation = self
                .fetch_operation(&operation.name)
                .await
                .map_err(request_error)?;
        }
    }
}

#[async_trait]
impl Transcriber for SpeechClient {
    async fn transcribe(&self, object_uri: &str) -> Result<Transcript, TranscriptionError> {
        let started = Instant::now();
        let operation = self.submit(object_uri).await.map_err(request_error)?;
        info!(operation = %operation.name, "Batch recognition started for {}", object_uri);

        let response = tokio::time::timeout(self.config.timeout, self.wait(operation))
            .await
            .map_err(|_| TranscriptionError::Timeout {
                secs: self.config.timeout.as_secs(),
            })??;

        if let Some((uri, status)) = response.first_file_error() {
            return Err(TranscriptionError::Engine(format!("{uri}: {status}")));
        }

        let transcript = flatten_response(&response);
        info!(
            "Transcription complete: {} segments in {}s",
            transcript.segments().len(),
            started.elapsed().as_secs()
        );

        Ok(transcript)
    }
}

fn request_error(err: anyhow::Error) -> TranscriptionError {
    TranscriptionError::Request(format!("{err:#}"))
}

/// Collapse a batch response into a linear transcript.
///
/// Files are visited in URI order, results in engine order, and only the
/// top-ranked alternative of each result is kept.
pub fn flatten_response(response: &BatchRecognizeResponse) -> Transcript {
    let mut transcript = Transcript::default();

    for file in response.results.values() {
        let Some(results) = file.recognition_results() else {
            continue;
        };
        for result in &results.results {
            if let Some(top) = result.alternatives.first() {
                transcript.push(&top.transcript, top.confidence);
            }
        }
    }

    transcript
}

// Request payloads

#[derive(Debug, Serialize)]
struct Empty {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchRecognizeRequest<'a> {
    config: RecognitionConfig<'a>,
    files: Vec<FileMetadata<'a>>,
    recognition_output_config: RecognitionOutputConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognitionConfig<'a> {
    auto_decoding_config: Empty,
    language_codes: Vec<&'a str>,
    model: &'a str,
    features: RecognitionFeatures,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognitionFeatures {
    enable_automatic_punctuation: bool,
    enable_spoken_punctuation: bool,
    enable_word_time_offsets: bool,
    diarization_config: SpeakerDiarizationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeakerDiarizationConfig {
    min_speaker_count: u32,
    max_speaker_count: u32,
}

#[derive(Debug, Serialize)]
struct FileMetadata<'a> {
    uri: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognitionOutputConfig {
    inline_response_config: Empty,
}

// Response payloads

#[derive(Debug, Deserialize)]
struct Operation {
    name: String,
    #[serde(default)]
    done: bool,
    error: Option<Status>,
    response: Option<BatchRecognizeResponse>,
}

#[derive(Debug, Deserialize)]
struct Status {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}

impl Status {
    fn is_error(&self) -> bool {
        self.code != 0 || !self.message.is_empty()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.trim().is_empty() {
            write!(f, "code {}", self.code)
        } else {
            write!(f, "{} (code {})", self.message, self.code)
        }
    }
}

/// `BatchRecognizeResponse` keyed by input file URI
#[derive(Debug, Default, Deserialize)]
pub struct BatchRecognizeResponse {
    #[serde(default)]
    results: BTreeMap<String, FileResult>,
}

impl BatchRecognizeResponse {
    fn first_file_error(&self) -> Option<(&str, &Status)> {
        self.results.iter().find_map(|(uri, file)| {
            file.error
                .as_ref()
                .filter(|status| status.is_error())
                .map(|status| (uri.as_str(), status))
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileResult {
    error: Option<Status>,
    inline_result: Option<InlineResult>,
    /// Deprecated location of inline results, still filled by some API versions
    transcript: Option<RecognitionResults>,
}

impl FileResult {
    fn recognition_results(&self) -> Option<&RecognitionResults> {
        self.inline_result
            .as_ref()
            .and_then(|inline| inline.transcript.as_ref())
            .or(self.transcript.as_ref())
    }
}

#[derive(Debug, Deserialize)]
struct InlineResult {
    transcript: Option<RecognitionResults>,
}

#[derive(Debug, Deserialize)]
struct RecognitionResults {
    #[serde(default)]
    results: Vec<RecognitionResult>,
}

#[derive(Debug, Deserialize)]
struct RecognitionResult {
    #[serde(default)]
    alternatives: Vec<Alternative>,
}

#[derive(Debug, Deserialize)]
struct Alternative {
    #[serde(default)]
    transcript: String,
    confidence: Option<f64>,
}
