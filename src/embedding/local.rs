//! Local sentence-transformer embeddings via fastembed (ONNX runtime).

use super::Embedder;
use crate::error::{RagError, Result};
use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument};

/// Known model identifiers, their fastembed model and output size.
fn resolve_model(name: &str) -> Option<(EmbeddingModel, usize)> {
    let short = name.rsplit('/').next().unwrap_or(name);
    let resolved = match short.to_lowercase().as_str() {
        "paraphrase-multilingual-minilm-l12-v2" => (EmbeddingModel::ParaphraseMLMiniLML12V2, 384),
        "all-minilm-l6-v2" => (EmbeddingModel::AllMiniLML6V2, 384),
        "all-minilm-l12-v2" => (EmbeddingModel::AllMiniLML12V2, 384),
        "bge-small-en-v1.5" => (EmbeddingModel::BGESmallENV15, 384),
        "multilingual-e5-small" => (EmbeddingModel::MultilingualE5Small, 384),
        _ => return None,
    };
    Some(resolved)
}

/// Embedder backed by a locally executed ONNX model.
///
/// The model is downloaded (on first run) and loaded on the blocking pool the
/// first time `embed` is called. Concurrent first calls wait on one load.
pub struct LocalEmbedder {
    name: String,
    model: EmbeddingModel,
    dimensions: usize,
    inner: OnceCell<Arc<Mutex<TextEmbedding>>>,
}

impl LocalEmbedder {
    /// Create an embedder for a known model identifier.
    pub fn new(name: &str) -> Result<Self> {
        let (model, dimensions) = resolve_model(name).ok_or_else(|| {
            RagError::Config(format!("Unsupported local embedding model: {}", name))
        })?;

        info!("Embedding model deferred: {}", name);
        Ok(Self {
            name: name.to_string(),
            model,
            dimensions,
            inner: OnceCell::new(),
        })
    }

    async fn handle(&self) -> Result<Arc<Mutex<TextEmbedding>>> {
        let handle = self
            .inner
            .get_or_try_init(|| async {
                let model = self.model.clone();
                let loaded = tokio::task::spawn_blocking(move || {
                    TextEmbedding::try_new(
                        InitOptions::new(model).with_show_download_progress(false),
                    )
                })
                .await
                .map_err(|e| RagError::Embedding(format!("Model loader panicked: {}", e)))?
                .map_err(|e| {
                    RagError::Embedding(format!(
                        "Failed to load embedding model {}: {}",
                        self.name, e
                    ))
                })?;

                info!("Loaded embedding model: {}", self.name);
                Ok::<_, RagError>(Arc::new(Mutex::new(loaded)))
            })
            .await?;
        Ok(handle.clone())
    }
}

#[async_trait]
impl Embedder for LocalEmbedder {
    #[instrument(skip(self, text), fields(model = %self.name, len = text.len()))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let handle = self.handle().await?;
        let input = vec![text.to_string()];

        let mut vectors = tokio::task::spawn_blocking(move || {
            let mut model = handle
                .lock()
                .map_err(|_| RagError::Embedding("Embedding model lock poisoned".to_string()))?;
            model
                .embed(input, None)
                .map_err(|e| RagError::Embedding(e.to_string()))
        })
        .await
        .map_err(|e| RagError::Embedding(format!("Embedding task panicked: {}", e)))??;

        debug!("Generated local embedding");
        vectors
            .pop()
            .ok_or_else(|| RagError::Embedding("Empty embedding response".to_string()))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model(&self) -> &str {
        &self.name
    }

    fn is_loaded(&self) -> bool {
        self.inner.initialized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_models() {
        assert!(resolve_model("paraphrase-multilingual-MiniLM-L12-v2").is_some());
        assert!(resolve_model("sentence-transformers/paraphrase-multilingual-MiniLM-L12-v2").is_some());
        assert_eq!(resolve_model("all-MiniLM-L6-v2").map(|(_, d)| d), Some(384));
        assert!(resolve_model("no-such-model").is_none());
    }

    #[test]
    fn test_unknown_model_is_config_error() {
        assert!(matches!(LocalEmbedder::new("no-such-model"), Err(RagError::Config(_))));
    }

    #[test]
    fn test_new_does_not_load() {
        let embedder = LocalEmbedder::new("all-MiniLM-L6-v2").unwrap();
        assert!(!embedder.is_loaded());
        assert_eq!(embedder.dimensions(), 384);
        assert_eq!(embedder.model(), "all-MiniLM-L6-v2");
    }
}
