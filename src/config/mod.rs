//! Configuration module for podcast-rag.
//!
//! Handles loading application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, RagPrompts};
pub use settings::{
    EmbeddingProvider, EmbeddingSettings, GeneralSettings, IngestSettings, LlmBackend,
    LlmSettings, OpenAISettings, PromptSettings, SearchSettings, ServerSettings, Settings,
    SourceSettings, VectorStoreSettings,
};
