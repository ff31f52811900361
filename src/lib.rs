//! podcast-rag - Retrieval-augmented Q&A over podcast transcripts
//!
//! Embeds a question, pulls the nearest transcript chunks out of Qdrant and
//! asks an OpenAI chat model to answer from them, citing its sources.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Settings (TOML file + environment) and prompt templates
//! - `embedding` - Embedding generation (local fastembed model or OpenAI)
//! - `vector_store` - Vector database abstraction (Qdrant REST, in-memory)
//! - `llm` - Chat completion through the OpenAI SDK or raw HTTP
//! - `ingest` - Batch loading of chunk files into the vector store
//! - `rag` - Search, prompt assembly, answer generation and health checks
//! - `server` - HTTP API and static frontend
//!
//! # Example
//!
//! ```rust,no_run
//! use podcast_rag::config::Settings;
//! use podcast_rag::rag::RagService;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     settings.validate()?;
//!     let service = RagService::new(Arc::new(settings))?;
//!
//!     let response = service.chat("What did they say about black holes?", None).await?;
//!     println!("{}", response.answer);
//!     for source in &response.sources {
//!         println!("- {} ({})", source.title, source.score);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod ingest;
pub mod llm;
pub mod openai;
pub mod rag;
pub mod server;
pub mod vector_store;

#[cfg(test)]
mod testing;

pub use error::{RagError, Result};
