//! OpenAI embeddings implementation.

use super::Embedder;
use crate::error::{RagError, Result};
use crate::openai::create_client;
use async_openai::config::OpenAIConfig;
use async_openai::types::{CreateEmbeddingRequestArgs, EmbeddingInput};
use async_openai::Client;
use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument};

/// OpenAI-based embedder. The API client is built on first use.
pub struct OpenAIEmbedder {
    api_key: String,
    api_base: String,
    model: String,
    dimensions: usize,
    client: OnceCell<Client<OpenAIConfig>>,
}

impl OpenAIEmbedder {
    /// Create a new OpenAI embedder with custom model and dimensions.
    pub fn with_config(api_key: &str, api_base: &str, model: &str, dimensions: usize) -> Self {
        Self {
            api_key: api_key.to_string(),
            api_base: api_base.to_string(),
            model: model.to_string(),
            dimensions,
            client: OnceCell::new(),
        }
    }

    async fn client(&self) -> Result<&Client<OpenAIConfig>> {
        self.client
            .get_or_try_init(|| async {
                let client = create_client(&self.api_key, &self.api_base)?;
                info!("Initialized OpenAI embeddings client ({})", self.model);
                Ok::<_, RagError>(client)
            })
            .await
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    #[instrument(skip(self, text), fields(model = %self.model))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let client = self.client().await?;

        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.model)
            .input(EmbeddingInput::String(text.to_string()))
            .dimensions(self.dimensions as u32)
            .build()
            .map_err(|e| RagError::Embedding(format!("Failed to build request: {}", e)))?;

        let response = client
            .embeddings()
            .create(request)
            .await
            .map_err(|e| RagError::Embedding(format!("Embedding API error: {}", e)))?;

        debug!("Generated OpenAI embedding");
        response
            .data
            .into_iter()
            .min_by_key(|e| e.index)
            .map(|e| e.embedding)
            .ok_or_else(|| RagError::Embedding("Empty embedding response".to_string()))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn is_loaded(&self) -> bool {
        self.client.initialized()
    }
}
