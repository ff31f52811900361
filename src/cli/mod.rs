//! CLI module for podcast-rag.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// podcast-rag - Ask questions about podcast episodes
///
/// Serves a retrieval-augmented Q&A API over podcast transcript chunks stored
/// in Qdrant, and loads those chunks into the index.
#[derive(Parser, Debug)]
#[command(name = "podcast-rag")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Host to bind to (defaults to HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Keep serving (with 503s) if the service fails to start
        #[arg(long)]
        degraded: bool,
    },

    /// Load chunk records into the vector store
    Ingest {
        /// Chunk file (JSON array); defaults to CHUNKS_PATH or qdrant_data/chunks.json
        #[arg(long)]
        chunks: Option<String>,

        /// Seconds to wait for Qdrant to become reachable
        #[arg(long, default_value_t = crate::ingest::READY_TIMEOUT.as_secs())]
        timeout_secs: u64,
    },

    /// Search for relevant podcast chunks
    Search {
        /// Search query
        query: String,

        /// Maximum number of results (defaults to DEFAULT_SEARCH_LIMIT)
        #[arg(short, long)]
        limit: Option<u64>,
    },

    /// Ask a question and get an answer with sources
    Ask {
        /// The question to ask
        question: String,

        /// Maximum number of context chunks to include
        #[arg(short, long)]
        limit: Option<u64>,
    },

    /// Check the vector store and model clients
    Health,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration (secrets redacted)
    Show,

    /// Show configuration file path
    Path,
}
