#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use minutes_relay::llm::{LlmProvider, SummaryComposer};
use minutes_relay::pipeline::Pipeline;
use minutes_relay::storage::{ArtifactLocation, ObjectStore, UploadError};
use minutes_relay::transcription::{Transcriber, Transcript, TranscriptionError};

pub const OUTPUT_BUCKET: &str = "minutes-out";

const RELAY_ENV: &[&str] = &[
    "GOOGLE_CLOUD_PROJECT",
    "GOOGLE_OAUTH_ACCESS_TOKEN",
    "SPEECH_LOCATION",
    "TRANSCRIPTION_LANGUAGE",
    "SPEAKER_COUNT",
    "PDF_BUCKET",
    "GENAI_MODEL",
    "GEMINI_API_KEY",
    "SUMMARY_INSTRUCTIONS",
    "PORT",
];

pub fn run_relay(args: &[&str]) -> Output {
    TestEnv::new().run(args)
}

pub struct TestEnv {
    home: TempDir,
    config: TempDir,
    work: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            home: tempfile::tempdir().expect("create temporary HOME dir"),
            config: tempfile::tempdir().expect("create temporary XDG config dir"),
            work: tempfile::tempdir().expect("create temporary work dir"),
        }
    }

    pub fn run(&self, args: &[&str]) -> Output {
        self.run_with_env(args, &[])
    }

    pub fn run_with_env(&self, args: &[&str], env: &[(&str, &str)]) -> Output {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_minutes-relay"));
        cmd.args(args)
            .env("HOME", self.home.path())
            .env("XDG_CONFIG_HOME", self.config.path());
        for key in RELAY_ENV {
            cmd.env_remove(key);
        }
        for (key, value) in env {
            cmd.env(key, value);
        }
        cmd.output().expect("failed to execute minutes-relay binary")
    }

    /// Write a file into the scratch directory and return its path
    pub fn write_file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.work.path().join(name);
        std::fs::write(&path, contents).expect("write scratch file");
        path
    }

    pub fn work_dir(&self) -> &Path {
        self.work.path()
    }
}

pub fn describe(output: &Output) -> String {
    format!(
        "stdout:\n{}\nstderr:\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

/// Transcriber returning canned segments
pub struct FakeTranscriber {
    segments: Vec<String>,
    fail: bool,
    pub uris: Mutex<Vec<String>>,
}

impl FakeTranscriber {
    pub fn with_segments(segments: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            segments: segments.iter().map(|s| s.to_string()).collect(),
            fail: false,
            uris: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            segments: Vec::new(),
            fail: true,
            uris: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.uris.lock().unwrap().len()
    }
}

#[async_trait]
impl Transcriber for FakeTranscriber {
    async fn transcribe(&self, object_uri: &str) -> Result<Transcript, TranscriptionError> {
        self.uris.lock().unwrap().push(object_uri.to_string());
        if self.fail {
            return Err(TranscriptionError::Engine("Audio can't be decoded (code 3)".to_string()));
        }
        Ok(self.segments.iter().collect())
    }
}

/// Provider returning a fixed reply, or an error when the reply is `None`
pub struct FakeProvider {
    reply: Option<String>,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeProvider {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmProvider for FakeProvider {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply
            .clone()
            .ok_or_else(|| anyhow::anyhow!("Gemini returned an error status: 429"))
    }
}

/// In-memory object store with overwrite semantics
#[derive(Default)]
pub struct MemoryStore {
    fail: bool,
    pub objects: Mutex<BTreeMap<String, (Vec<u8>, String)>>,
    pub uploads: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn upload(
        &self,
        location: &ArtifactLocation,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), UploadError> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(UploadError {
                uri: location.uri(),
                reason: "403 Forbidden".to_string(),
            });
        }
        self.objects
            .lock()
            .unwrap()
            .insert(location.uri(), (bytes, content_type.to_string()));
        Ok(())
    }
}

pub fn pipeline(
    transcriber: Arc<FakeTranscriber>,
    provider: Arc<FakeProvider>,
    store: Arc<MemoryStore>,
) -> Pipeline {
    Pipeline::new(
        transcriber,
        SummaryComposer::new(provider),
        store,
        OUTPUT_BUCKET,
        "Answer in English.",
    )
}
