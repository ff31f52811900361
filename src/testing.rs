//! In-process fakes shared by unit tests.

use crate::embedding::Embedder;
use crate::error::{RagError, Result};
use crate::llm::ChatCompleter;
use crate::vector_store::{Distance, PayloadSchema, Point, ScoredPoint, VectorStore};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Embeds text as keyword occurrence counts, one dimension per keyword.
pub struct KeywordEmbedder {
    keywords: Vec<String>,
    loaded: AtomicBool,
    pub calls: AtomicUsize,
}

impl KeywordEmbedder {
    pub fn new(keywords: &[&str]) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            loaded: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.loaded.store(true, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);
        let text = text.to_lowercase();
        Ok(self
            .keywords
            .iter()
            .map(|k| text.matches(k.as_str()).count() as f32)
            .collect())
    }

    fn dimensions(&self) -> usize {
        self.keywords.len()
    }

    fn model(&self) -> &str {
        "keyword-test-model"
    }

    fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }
}

/// Returns a fixed answer (or error) and records every prompt it receives.
pub struct RecordingCompleter {
    reply: std::result::Result<String, String>,
    initialized: AtomicBool,
    pub prompts: Mutex<Vec<(String, String)>>,
}

impl RecordingCompleter {
    pub fn answering(answer: &str) -> Self {
        Self {
            reply: Ok(answer.to_string()),
            initialized: AtomicBool::new(false),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            initialized: AtomicBool::new(false),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatCompleter for RecordingCompleter {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        self.initialized.store(true, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap()
            .push((system.to_string(), user.to_string()));
        self.reply.clone().map_err(RagError::Llm)
    }

    fn model(&self) -> &str {
        "test-llm"
    }

    fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }
}

/// A vector store whose every call fails, as if the server were down.
pub struct UnreachableStore;

fn down() -> RagError {
    RagError::VectorStore("Qdrant list collections request failed: connection refused".to_string())
}

#[async_trait]
impl VectorStore for UnreachableStore {
    async fn list_collections(&self) -> Result<Vec<String>> {
        Err(down())
    }

    async fn create_collection(&self, _: &str, _: u64, _: Distance) -> Result<()> {
        Err(down())
    }

    async fn create_payload_index(&self, _: &str, _: &str, _: PayloadSchema) -> Result<()> {
        Err(down())
    }

    async fn upsert(&self, _: &str, _: &Point) -> Result<()> {
        Err(down())
    }

    async fn search(&self, _: &str, _: &[f32], _: u64) -> Result<Vec<ScoredPoint>> {
        Err(down())
    }

    async fn count(&self, _: &str) -> Result<u64> {
        Err(down())
    }
}
