//! Ingest command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::ingest;
use anyhow::Result;
use std::time::Duration;

/// Run the ingest command.
pub async fn run_ingest(chunks: Option<String>, timeout_secs: u64, settings: Settings) -> Result<()> {
    let chunks = chunks.map(|p| Settings::expand_path(&p));

    Output::info(&format!(
        "Ingesting into '{}' at {}",
        settings.vector_store.collection,
        settings.qdrant_url()
    ));

    let report = ingest::run(
        &settings,
        chunks.as_deref(),
        Duration::from_secs(timeout_secs),
    )
    .await;

    match report {
        Ok(report) => {
            if report.collection_created {
                Output::kv("Collection", &format!("{} (created)", report.collection));
            } else {
                Output::kv("Collection", &report.collection);
            }
            Output::success(&format!("Ingested {} chunks", report.chunks_upserted));
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Ingestion failed: {}", e));
            Err(e.into())
        }
    }
}
