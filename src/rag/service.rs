//! Retrieval and generation service.

use super::health::{ComponentHealth, ComponentState, Components, HealthReport, HealthStatus, QdrantHealth};
use super::{log_preview, prompt, ChatResponse, SearchResult, SourceInfo};
use crate::config::{Prompts, Settings};
use crate::embedding::{create_embedder, Embedder};
use crate::error::Result;
use crate::llm::{create_completer, ChatCompleter};
use crate::vector_store::{QdrantStore, VectorStore};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// Answers questions over the indexed podcast chunks.
///
/// Owns the vector-store handle, the embedder and the chat completer. The
/// embedder and completer build their clients on first use; the service never
/// forces that construction itself.
pub struct RagService {
    settings: Arc<Settings>,
    prompts: Prompts,
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    llm: Arc<dyn ChatCompleter>,
}

impl RagService {
    /// Create the service from settings. Performs no network I/O.
    pub fn new(settings: Arc<Settings>) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let store = Arc::new(QdrantStore::new(
            &settings.qdrant_url(),
            settings.vector_store.api_key.as_deref(),
        )?);
        info!("Qdrant client configured for {}", settings.qdrant_url());

        let embedder = create_embedder(&settings)?;
        let llm = create_completer(&settings);
        info!(
            "LLM backend: {} ({})",
            settings.llm.backend, settings.llm.model
        );

        Ok(Self::with_components(settings, prompts, store, embedder, llm))
    }

    /// Create a service with custom components.
    pub fn with_components(
        settings: Arc<Settings>,
        prompts: Prompts,
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        llm: Arc<dyn ChatCompleter>,
    ) -> Self {
        Self {
            settings,
            prompts,
            store,
            embedder,
            llm,
        }
    }

    /// Embed `query` and return the nearest chunks, best first.
    ///
    /// `limit` defaults to the configured search limit. Results keep the
    /// store's order.
    #[instrument(skip(self, query), fields(query = %log_preview(query)))]
    pub async fn search(&self, query: &str, limit: Option<u64>) -> Result<Vec<SearchResult>> {
        let limit = limit.unwrap_or(self.settings.search.default_limit);

        let outcome = async {
            let vector = self.embedder.embed(query).await?;
            self.store
                .search(&self.settings.vector_store.collection, &vector, limit)
                .await
        }
        .await;

        let hits = outcome.inspect_err(|e| error!("Error searching similar content: {}", e))?;
        let results: Vec<SearchResult> = hits.into_iter().map(SearchResult::from).collect();

        info!(
            "Found {} similar content chunks for query: {}...",
            results.len(),
            log_preview(query)
        );
        Ok(results)
    }

    /// Assemble the user prompt for `query` from `results`.
    pub fn build_prompt(&self, query: &str, results: &[SearchResult]) -> String {
        prompt::build_prompt(&self.prompts, query, results)
    }

    /// Ask the language model to answer `query` grounded on `results`.
    #[instrument(skip(self, query, results), fields(query = %log_preview(query), sources = results.len()))]
    pub async fn generate_answer(&self, query: &str, results: &[SearchResult]) -> Result<String> {
        let user_prompt = self.build_prompt(query, results);
        debug!("Prompt is {} bytes", user_prompt.len());

        let answer = self
            .llm
            .complete(&self.prompts.rag.system, &user_prompt)
            .await
            .inspect_err(|e| error!("Error generating answer: {}", e))?;

        info!("Generated answer for query: {}...", log_preview(query));
        Ok(answer)
    }

    /// Search, then answer. Skips the language model when nothing matches.
    #[instrument(skip(self, query), fields(query = %log_preview(query)))]
    pub async fn chat(&self, query: &str, limit: Option<u64>) -> Result<ChatResponse> {
        let results = self.search(query, limit).await?;

        if results.is_empty() {
            return Ok(ChatResponse {
                answer: self.prompts.rag.no_results.clone(),
                sources: Vec::new(),
                query: query.to_string(),
            });
        }

        let answer = self.generate_answer(query, &results).await?;
        let sources = results.iter().map(SourceInfo::from).collect();

        Ok(ChatResponse {
            answer,
            sources,
            query: query.to_string(),
        })
    }

    /// Report vector store reachability and the state of the lazy clients.
    pub async fn health_check(&self) -> HealthReport {
        let target = &self.settings.vector_store.collection;

        let qdrant = match self.store.list_collections().await {
            Ok(collections) => {
                let target_collection_exists = collections.iter().any(|c| c == target);
                QdrantHealth::Reachable {
                    status: HealthStatus::Healthy,
                    collections,
                    target_collection_exists,
                }
            }
            Err(e) => QdrantHealth::Unreachable {
                status: HealthStatus::Unhealthy,
                error: e.to_string(),
            },
        };

        let status = match qdrant {
            QdrantHealth::Reachable { .. } => HealthStatus::Healthy,
            QdrantHealth::Unreachable { .. } => HealthStatus::Unhealthy,
        };

        HealthReport {
            status,
            components: Components {
                qdrant,
                embedding_model: ComponentHealth {
                    status: ComponentState::from_loaded(self.embedder.is_loaded()),
                    model: self.embedder.model().to_string(),
                },
                openai: ComponentHealth {
                    status: ComponentState::from_loaded(self.llm.is_initialized()),
                    model: self.llm.model().to_string(),
                },
            },
        }
    }
}
