//! Serve command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::rag::RagService;
use crate::server::{self, AppState};
use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info};

/// Run the HTTP API server.
pub async fn run_serve(
    host: Option<String>,
    port: Option<u16>,
    degraded: bool,
    settings: Settings,
) -> Result<()> {
    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);
    let degraded = degraded || settings.general.allow_degraded_startup;
    let frontend_dir = settings.frontend_dir();

    let state = match start_service(settings) {
        Ok(service) => {
            info!("RAG service initialized successfully");
            AppState::new(service)
        }
        Err(e) if degraded => {
            error!("Failed to initialize RAG service: {}", e);
            Output::warning("Service failed to start; API requests will get 503.");
            AppState::degraded()
        }
        Err(e) => {
            Output::error(&format!("Failed to initialize RAG service: {}", e));
            return Err(e.into());
        }
    };

    let addr = format!("{}:{}", host, port);

    Output::header("Podcast RAG API");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /api/health");
    Output::kv("Chat", "POST /api/chat");
    Output::kv("Search", "GET  /api/search?query=...");
    if frontend_dir.is_dir() {
        Output::kv("Frontend", &format!("GET  / ({})", frontend_dir.display()));
    }
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    server::serve(&addr, state, &frontend_dir).await?;

    Ok(())
}

fn start_service(settings: Settings) -> crate::Result<RagService> {
    settings.validate()?;
    RagService::new(Arc::new(settings))
}
