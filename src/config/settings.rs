//! Configuration settings for podcast-rag.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! environment variables. The resulting struct is immutable after startup and
//! handed to every component by reference.

use crate::error::{RagError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Placeholder printed in place of secrets.
const REDACTED: &str = "***";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub server: ServerSettings,
    pub openai: OpenAISettings,
    pub llm: LlmSettings,
    pub embedding: EmbeddingSettings,
    pub vector_store: VectorStoreSettings,
    pub search: SearchSettings,
    pub ingest: IngestSettings,
    pub sources: SourceSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Enables debug-level logging.
    pub debug: bool,
    /// Directory holding the static frontend bundle.
    pub frontend_dir: String,
    /// Keep serving (with 503s) when the service fails to start.
    pub allow_degraded_startup: bool,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            debug: false,
            frontend_dir: "frontend".to_string(),
            allow_degraded_startup: false,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8000,
        }
    }
}

/// OpenAI account settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAISettings {
    /// API key. The only required setting.
    pub api_key: Option<String>,
    /// API base URL, without the trailing endpoint path.
    pub base_url: String,
}

impl Default for OpenAISettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }
}

/// Strategy used to reach the chat-completion endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LlmBackend {
    /// The async-openai SDK client.
    #[default]
    Sdk,
    /// A raw HTTP POST with a bearer token.
    Http,
}

impl FromStr for LlmBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sdk" | "openai" => Ok(LlmBackend::Sdk),
            "http" | "raw" => Ok(LlmBackend::Http),
            _ => Err(format!("Unknown LLM backend: {}", s)),
        }
    }
}

impl std::fmt::Display for LlmBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmBackend::Sdk => write!(f, "sdk"),
            LlmBackend::Http => write!(f, "http"),
        }
    }
}

/// Language model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub backend: LlmBackend,
    /// Chat model identifier.
    pub model: String,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            backend: LlmBackend::Sdk,
            model: "gpt-4o-mini".to_string(),
        }
    }
}

/// Embedding provider type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Local ONNX sentence-transformer (fastembed).
    #[default]
    Local,
    /// OpenAI embeddings API.
    OpenAI,
}

impl FromStr for EmbeddingProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "fastembed" => Ok(EmbeddingProvider::Local),
            "openai" => Ok(EmbeddingProvider::OpenAI),
            _ => Err(format!("Unknown embedding provider: {}", s)),
        }
    }
}

impl std::fmt::Display for EmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbeddingProvider::Local => write!(f, "local"),
            EmbeddingProvider::OpenAI => write!(f, "openai"),
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub provider: EmbeddingProvider,
    /// Embedding model identifier.
    pub model: String,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Local,
            model: "paraphrase-multilingual-MiniLM-L12-v2".to_string(),
        }
    }
}

/// Vector store (Qdrant) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStoreSettings {
    pub host: String,
    /// REST port.
    pub port: u16,
    /// Optional `api-key` header for hosted clusters.
    pub api_key: Option<String>,
    /// Target collection name.
    pub collection: String,
    /// Collection vector dimensionality.
    pub vector_size: u64,
}

impl Default for VectorStoreSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6333,
            api_key: None,
            collection: "podcast_chunks".to_string(),
            vector_size: 384,
        }
    }
}

/// Retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Number of results when a request does not specify a limit.
    pub default_limit: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { default_limit: 5 }
    }
}

/// Ingestion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestSettings {
    /// Explicit chunk file; probed locations are used when unset.
    pub chunks_path: Option<String>,
    /// Chunk size used by the upstream chunker. Informational here.
    pub chunk_size: u32,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            chunks_path: None,
            chunk_size: 1000,
        }
    }
}

/// Knowledge-source credentials consumed by the upstream export tooling.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SourceSettings {
    pub notion_token: Option<String>,
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path (or the default location), then
    /// apply environment overrides.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let mut settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else if path.is_some() {
            return Err(RagError::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        } else {
            Settings::default()
        };

        settings.apply_env(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    /// Build settings from defaults plus the given variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();
        settings.apply_env(lookup)?;
        Ok(settings)
    }

    /// Overlay environment-style variables onto these settings.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("OPENAI_API_KEY") {
            self.openai.api_key = Some(v);
        }
        if let Some(v) = get("OPENAI_BASE_URL") {
            self.openai.base_url = v;
        }
        if let Some(v) = get("NOTION_TOKEN") {
            self.sources.notion_token = Some(v);
        }
        if let Some(v) = get("LLM_BACKEND") {
            self.llm.backend = parse_var("LLM_BACKEND", &v)?;
        }
        if let Some(v) = get("LLM_MODEL") {
            self.llm.model = v;
        }
        if let Some(v) = get("QDRANT_HOST") {
            self.vector_store.host = v;
        }
        if let Some(v) = get("QDRANT_PORT") {
            self.vector_store.port = parse_var("QDRANT_PORT", &v)?;
        }
        if let Some(v) = get("QDRANT_API_KEY") {
            self.vector_store.api_key = Some(v);
        }
        if let Some(v) = get("COLLECTION_NAME") {
            self.vector_store.collection = v;
        }
        if let Some(v) = get("VECTOR_SIZE") {
            self.vector_store.vector_size = parse_var("VECTOR_SIZE", &v)?;
        }
        if let Some(v) = get("EMBEDDING_PROVIDER") {
            self.embedding.provider = parse_var("EMBEDDING_PROVIDER", &v)?;
        }
        if let Some(v) = get("EMBEDDING_MODEL") {
            self.embedding.model = v;
        }
        if let Some(v) = get("DEFAULT_SEARCH_LIMIT") {
            self.search.default_limit = parse_var("DEFAULT_SEARCH_LIMIT", &v)?;
        }
        if let Some(v) = get("CHUNK_SIZE") {
            self.ingest.chunk_size = parse_var("CHUNK_SIZE", &v)?;
        }
        if let Some(v) = get("CHUNKS_PATH") {
            self.ingest.chunks_path = Some(v);
        }
        if let Some(v) = get("HOST") {
            self.server.host = v;
        }
        if let Some(v) = get("PORT") {
            self.server.port = parse_var("PORT", &v)?;
        }
        if let Some(v) = get("DEBUG") {
            self.general.debug = parse_flag(&v);
        }
        if let Some(v) = get("FRONTEND_DIR") {
            self.general.frontend_dir = v;
        }
        if let Some(v) = get("ALLOW_DEGRADED_STARTUP") {
            self.general.allow_degraded_startup = parse_flag(&v);
        }
        if let Some(v) = get("PROMPTS_DIR") {
            self.prompts.custom_dir = Some(v);
        }

        Ok(())
    }

    /// Check that all required settings are present.
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.openai_api_key().is_none() {
            missing.push("OPENAI_API_KEY");
        }

        if !missing.is_empty() {
            return Err(RagError::Config(format!(
                "Missing required environment variables: {}",
                missing.join(", ")
            )));
        }
        Ok(())
    }

    /// The OpenAI API key, if set and non-blank.
    pub fn openai_api_key(&self) -> Option<&str> {
        self.openai
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    /// Base URL of the Qdrant REST API.
    pub fn qdrant_url(&self) -> String {
        let host = self.vector_store.host.trim_end_matches('/');
        if host.contains("://") {
            format!("{}:{}", host, self.vector_store.port)
        } else {
            format!("http://{}:{}", host, self.vector_store.port)
        }
    }

    /// A copy with every secret replaced by a placeholder, for display.
    pub fn redacted(&self) -> Settings {
        let mut copy = self.clone();
        let hide = |v: &mut Option<String>| {
            if v.is_some() {
                *v = Some(REDACTED.to_string());
            }
        };
        hide(&mut copy.openai.api_key);
        hide(&mut copy.vector_store.api_key);
        hide(&mut copy.sources.notion_token);
        copy
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("podcast-rag")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded frontend directory path.
    pub fn frontend_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.frontend_dir)
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| RagError::Config(format!("Invalid value for {}: '{}' ({})", key, value, e)))
}

/// Only a case-insensitive "true" enables a flag.
fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}
