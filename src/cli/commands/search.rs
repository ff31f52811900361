//! Search command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::rag::RagService;
use anyhow::Result;
use std::sync::Arc;

/// Run the search command.
pub async fn run_search(query: &str, limit: Option<u64>, settings: Settings) -> Result<()> {
    if query.trim().is_empty() {
        anyhow::bail!("Query cannot be empty");
    }

    let service = RagService::new(Arc::new(settings))?;

    let spinner = Output::spinner("Searching...");
    let results = service.search(query, limit).await;
    spinner.finish_and_clear();

    match results {
        Ok(results) if results.is_empty() => {
            Output::warning("No results found matching your query.");
        }
        Ok(results) => {
            Output::success(&format!("Found {} results", results.len()));
            for (i, result) in results.iter().enumerate() {
                Output::search_result(i + 1, result);
            }
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
