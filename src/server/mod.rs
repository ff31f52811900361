//! HTTP API over the RAG service.
//!
//! Routes:
//! - `GET  /api/health`
//! - `POST /api/chat`
//! - `GET  /api/search?query=...&limit=...`
//! - `GET  /` and `/static/*` for the frontend bundle, when its directory exists

mod error;
mod handlers;

pub use error::ApiError;
pub use handlers::{ChatRequest, SearchParams, SearchResponse};

use crate::rag::RagService;
use axum::{
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{info, warn};

/// Shared application state. `service` is `None` when startup ran degraded.
#[derive(Clone, Default)]
pub struct AppState {
    pub service: Option<Arc<RagService>>,
}

impl AppState {
    pub fn new(service: RagService) -> Self {
        Self {
            service: Some(Arc::new(service)),
        }
    }

    pub fn degraded() -> Self {
        Self::default()
    }
}

/// Build the application router.
pub fn router(state: AppState, frontend_dir: &Path) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/chat", post(handlers::chat))
        .route("/api/search", get(handlers::search))
        .with_state(state);

    api.merge(frontend(frontend_dir))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn frontend(dir: &Path) -> Router {
    if !dir.is_dir() {
        info!("Frontend directory {} not found; serving API only", dir.display());
        return Router::new();
    }

    let index = dir.join("index.html");
    Router::new()
        .route("/", get(move || serve_index(index.clone())))
        .nest_service("/static", ServeDir::new(dir))
}

async fn serve_index(path: PathBuf) -> Response {
    match tokio::fs::read_to_string(&path).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            warn!("Cannot read {}: {}", path.display(), e);
            Json(json!({
                "message": "Frontend not found. Please check the frontend directory."
            }))
            .into_response()
        }
    }
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: &str, state: AppState, frontend_dir: &Path) -> std::io::Result<()> {
    let app = router(state, frontend_dir);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await
}
