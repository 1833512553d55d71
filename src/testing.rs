//! In-memory collaborators for tests.

use crate::embedding::Embedder;
use crate::error::{PrepError, Result};
use crate::llm::{ChatMessage, ChatModel};
use crate::source::RepoFetcher;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const FAKE_DIMENSIONS: usize = 64;

/// Embeds text as a normalised histogram of its bytes.
pub struct FakeEmbedder {
    fail: bool,
}

impl FakeEmbedder {
    pub fn new() -> Self {
        Self { fail: false }
    }

    /// Every call fails with an embedding error.
    pub fn failing() -> Self {
        Self { fail: true }
    }

    fn vector(text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; FAKE_DIMENSIONS];
        for b in text.bytes() {
            v[b as usize % FAKE_DIMENSIONS] += 1.0;
        }
        v
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut out = self.embed_batch(&[text.to_string()]).await?;
        out.pop()
            .ok_or_else(|| PrepError::Embedding("no embedding".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if self.fail {
            return Err(PrepError::Embedding("rate limited".to_string()));
        }
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }

    fn dimensions(&self) -> usize {
        FAKE_DIMENSIONS
    }
}

/// Returns a canned reply and records every request.
pub struct FakeChatModel {
    reply: std::result::Result<String, String>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl FakeChatModel {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatModel for FakeChatModel {
    async fn complete(&self, messages: &[ChatMessage], _temperature: f32) -> Result<String> {
        self.calls.lock().unwrap().push(messages.to_vec());
        self.reply.clone().map_err(PrepError::Gateway)
    }
}

/// Writes a fixed set of files into the destination instead of cloning.
pub struct FakeFetcher {
    files: Vec<(String, Vec<u8>)>,
    error: Option<String>,
    destinations: Mutex<Vec<PathBuf>>,
}

impl FakeFetcher {
    pub fn with_files(files: &[(&str, &str)]) -> Self {
        Self {
            files: files
                .iter()
                .map(|(p, c)| (p.to_string(), c.as_bytes().to_vec()))
                .collect(),
            error: None,
            destinations: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            files: Vec::new(),
            error: Some(message.to_string()),
            destinations: Mutex::new(Vec::new()),
        }
    }

    /// Directories `fetch` was asked to populate.
    pub fn destinations(&self) -> Vec<PathBuf> {
        self.destinations.lock().unwrap().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.destinations.lock().unwrap().len()
    }
}

#[async_trait]
impl RepoFetcher for FakeFetcher {
    async fn fetch(&self, _url: &str, dest: &Path) -> Result<()> {
        self.destinations.lock().unwrap().push(dest.to_path_buf());

        if let Some(message) = &self.error {
            return Err(PrepError::Fetch(message.clone()));
        }

        for (rel, content) in &self.files {
            let path = dest.join(rel);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, content)?;
        }
        Ok(())
    }
}
