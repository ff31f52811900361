//! Request handlers for the `/api` routes.

use super::error::ApiError;
use super::AppState;
use crate::rag::{ChatResponse, HealthReport, RagService, SearchResult};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub query: String,
    #[serde(default)]
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Missing is treated the same as blank.
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub query: String,
}

fn service(state: &AppState) -> Result<&Arc<RagService>, ApiError> {
    state.service.as_ref().ok_or_else(ApiError::not_initialized)
}

fn require_query(query: &str) -> Result<(), ApiError> {
    if query.trim().is_empty() {
        return Err(ApiError::empty_query());
    }
    Ok(())
}

pub async fn health(State(state): State<AppState>) -> Result<Json<HealthReport>, ApiError> {
    let service = service(&state)?;
    Ok(Json(service.health_check().await))
}

pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let service = service(&state)?;
    let Json(req) = payload?;
    require_query(&req.query)?;

    debug!("chat request, limit={:?}", req.limit);
    let response = service.chat(&req.query, req.limit).await?;
    Ok(Json(response))
}

pub async fn search(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let service = service(&state)?;
    let Query(params) = params?;
    let query = params.query.unwrap_or_default();
    require_query(&query)?;

    let results = service.search(&query, params.limit).await?;
    Ok(Json(SearchResponse { results, query }))
}
