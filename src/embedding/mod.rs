//! Embedding generation for semantic search and ingestion.
//!
//! Providers construct their model or client on first use and keep it for the
//! life of the process. `is_loaded` reports that state without triggering it.

#[cfg(feature = "local-embeddings")]
mod local;
mod openai;

#[cfg(feature = "local-embeddings")]
pub use local::LocalEmbedder;
pub use openai::OpenAIEmbedder;

use crate::config::{EmbeddingProvider, Settings};
use crate::error::{RagError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for embedding generation.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Get the embedding dimensions.
    fn dimensions(&self) -> usize;

    /// Model identifier, as configured.
    fn model(&self) -> &str;

    /// Whether the underlying model or client has been constructed.
    fn is_loaded(&self) -> bool;
}

/// Build the configured embedder. Nothing is loaded until the first `embed`.
pub fn create_embedder(settings: &Settings) -> Result<Arc<dyn Embedder>> {
    match settings.embedding.provider {
        EmbeddingProvider::Local => create_local(settings),
        EmbeddingProvider::OpenAI => Ok(Arc::new(OpenAIEmbedder::with_config(
            settings.openai_api_key().unwrap_or_default(),
            &settings.openai.base_url,
            &settings.embedding.model,
            settings.vector_store.vector_size as usize,
        ))),
    }
}

#[cfg(feature = "local-embeddings")]
fn create_local(settings: &Settings) -> Result<Arc<dyn Embedder>> {
    let embedder = LocalEmbedder::new(&settings.embedding.model)?;
    if embedder.dimensions() as u64 != settings.vector_store.vector_size {
        return Err(RagError::Config(format!(
            "Embedding model {} produces {}-dimensional vectors but VECTOR_SIZE is {}",
            settings.embedding.model,
            embedder.dimensions(),
            settings.vector_store.vector_size
        )));
    }
    Ok(Arc::new(embedder))
}

#[cfg(not(feature = "local-embeddings"))]
fn create_local(_settings: &Settings) -> Result<Arc<dyn Embedder>> {
    Err(RagError::Config(
        "local embeddings are not available in this build; enable the `local-embeddings` feature or set EMBEDDING_PROVIDER=openai"
            .to_string(),
    ))
}
