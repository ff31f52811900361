//! RAG (Retrieval-Augmented Generation) for question answering with sources.
//!
//! Holds the result and response shapes returned to callers, plus the
//! service that runs search, prompt assembly and answer generation.

mod health;
pub mod prompt;
mod service;

pub use health::{ComponentHealth, ComponentState, Components, HealthReport, HealthStatus, QdrantHealth};
pub use service::RagService;

use crate::vector_store::{PointId, ScoredPoint};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Longest content preview shown with a source, in characters.
pub const PREVIEW_CHARS: usize = 200;

/// A retrieved chunk, flattened from a vector-store hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: PointId,
    pub score: f32,
    /// Tag normalized to a single string.
    pub podcast_tag: String,
    pub podcast_title: String,
    pub content: String,
}

impl From<ScoredPoint> for SearchResult {
    fn from(point: ScoredPoint) -> Self {
        let payload = point.payload.unwrap_or_default();
        Self {
            id: point.id,
            score: point.score,
            podcast_tag: normalize_tag(payload.get("podcast_tag")),
            podcast_title: text_field(payload.get("podcast_title")),
            content: text_field(payload.get("content")),
        }
    }
}

/// A source cited in a chat answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub title: String,
    pub tag: String,
    /// Similarity rounded to three decimals.
    pub score: f64,
    pub content_preview: String,
}

impl From<&SearchResult> for SourceInfo {
    fn from(result: &SearchResult) -> Self {
        Self {
            title: result.podcast_title.clone(),
            tag: result.podcast_tag.clone(),
            score: round_score(result.score),
            content_preview: content_preview(&result.content),
        }
    }
}

/// Answer to a chat query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    pub sources: Vec<SourceInfo>,
    pub query: String,
}

/// Flatten a payload tag into one string.
///
/// Lists are joined with `", "` (null elements skipped), strings pass
/// through, a missing tag becomes empty, and other values use their JSON text.
pub fn normalize_tag(tag: Option<&Value>) -> String {
    match tag {
        None | Some(Value::Null) => String::new(),
        Some(Value::Array(items)) => items
            .iter()
            .filter(|v| !v.is_null())
            .map(scalar_text)
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => scalar_text(other),
    }
}

fn text_field(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(v) => scalar_text(v),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// First [`PREVIEW_CHARS`] characters of `content`, with `...` appended when cut.
pub fn content_preview(content: &str) -> String {
    match content.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_string(),
    }
}

/// Round a similarity score to three decimals.
pub fn round_score(score: f32) -> f64 {
    (f64::from(score) * 1000.0).round() / 1000.0
}

/// Short prefix of a query for log lines.
pub(crate) fn log_preview(text: &str) -> &str {
    match text.char_indices().nth(50) {
        Some((cut, _)) => &text[..cut],
        None => text,
    }
}
