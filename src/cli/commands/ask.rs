//! Ask command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::rag::RagService;
use anyhow::Result;
use std::sync::Arc;

/// Run the ask command.
pub async fn run_ask(question: &str, limit: Option<u64>, settings: Settings) -> Result<()> {
    if question.trim().is_empty() {
        anyhow::bail!("Query cannot be empty");
    }

    if let Err(e) = settings.validate() {
        Output::error(&e.to_string());
        Output::info("Set it in the environment or in a .env file.");
        return Err(e.into());
    }

    let service = RagService::new(Arc::new(settings))?;

    let spinner = Output::spinner("Searching podcasts...");
    let response = service.chat(question, limit).await;
    spinner.finish_and_clear();

    match response {
        Ok(response) => {
            println!("\n{}\n", response.answer);

            if !response.sources.is_empty() {
                Output::header("Sources");
                for source in &response.sources {
                    Output::source(source);
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
