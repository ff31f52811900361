//! Chunk records produced by the external chunker.

use crate::error::{RagError, Result};
use crate::vector_store::{Payload, Point, PointId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

/// Tag attached to a chunk: one label or several.
///
/// Lists may hold nulls; they are stored as-is and skipped when tags are
/// joined for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PodcastTag {
    Single(String),
    List(Vec<Option<String>>),
}

impl Default for PodcastTag {
    fn default() -> Self {
        PodcastTag::Single(String::new())
    }
}

/// A unit of transcript text with its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub id: PointId,
    pub podcast_title: String,
    pub podcast_tag: PodcastTag,
    pub content: String,
}

impl Chunk {
    /// Payload stored beside the vector. The tag keeps its original shape.
    pub fn payload(&self) -> Payload {
        let mut payload = Payload::new();
        payload.insert("podcast_title".into(), Value::String(self.podcast_title.clone()));
        payload.insert(
            "podcast_tag".into(),
            match &self.podcast_tag {
                PodcastTag::Single(tag) => Value::String(tag.clone()),
                PodcastTag::List(tags) => Value::Array(
                    tags.iter()
                        .map(|t| t.clone().map_or(Value::Null, Value::String))
                        .collect(),
                ),
            },
        );
        payload.insert("content".into(), Value::String(self.content.clone()));
        payload
    }

    pub fn into_point(self, vector: Vec<f32>) -> Point {
        Point {
            payload: self.payload(),
            id: self.id,
            vector,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawChunk {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    podcast_title: Option<String>,
    #[serde(default)]
    podcast_tag: Value,
    #[serde(default)]
    content: Option<String>,
}

fn parse_id(index: usize, id: &Value) -> Result<PointId> {
    let parsed = match id {
        Value::Number(n) => n.as_u64().map(PointId::Num),
        Value::String(s) => Uuid::parse_str(s).ok().map(PointId::Uuid),
        _ => None,
    };
    parsed.ok_or_else(|| {
        RagError::InvalidInput(format!(
            "chunk #{} has id {}; expected an unsigned integer or a UUID",
            index, id
        ))
    })
}

fn parse_tag(index: usize, tag: Value) -> Result<PodcastTag> {
    if tag.is_null() {
        return Ok(PodcastTag::default());
    }
    let shown = tag.to_string();
    serde_json::from_value(tag).map_err(|_| {
        RagError::InvalidInput(format!(
            "chunk #{} has podcast_tag {}; expected a string or a list of strings",
            index, shown
        ))
    })
}

/// Parse a JSON array of chunk records.
pub fn parse_chunks(json: &str) -> Result<Vec<Chunk>> {
    let raw: Vec<RawChunk> = serde_json::from_str(json)?;

    raw.into_iter()
        .enumerate()
        .map(|(i, r)| {
            Ok(Chunk {
                id: parse_id(i, &r.id)?,
                podcast_title: r.podcast_title.unwrap_or_default(),
                podcast_tag: parse_tag(i, r.podcast_tag)?,
                content: r.content.unwrap_or_default(),
            })
        })
        .collect()
}

/// Read chunk records from a JSON file.
pub fn load_chunks(path: &Path) -> Result<Vec<Chunk>> {
    let json = std::fs::read_to_string(path)?;
    let chunks = parse_chunks(&json)?;
    info!("Loaded {} chunks from {}", chunks.len(), path.display());
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_tag_shapes_and_defaults() {
        let chunks = parse_chunks(
            r#"[
                {"id": 1, "podcast_title": "Ep 1", "podcast_tag": "tech", "content": "hello"},
                {"id": "550e8400-e29b-41d4-a716-446655440000", "podcast_tag": ["a", "b"]},
                {"id": 3, "podcast_tag": null}
            ]"#,
        )
        .unwrap();

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].podcast_tag, PodcastTag::Single("tech".into()));
        assert!(matches!(chunks[1].id, PointId::Uuid(_)));
        assert_eq!(chunks[1].podcast_title, "");
        assert_eq!(chunks[1].content, "");
        assert_eq!(
            chunks[1].podcast_tag,
            PodcastTag::List(vec![Some("a".into()), Some("b".into())])
        );
        assert_eq!(chunks[2].podcast_tag, PodcastTag::default());
    }

    #[test]
    fn test_bad_id_names_record() {
        let err = parse_chunks(r#"[{"id": 1}, {"id": "not-a-uuid"}]"#).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("chunk #1"), "{msg}");
        assert!(msg.contains("not-a-uuid"), "{msg}");

        assert!(parse_chunks(r#"[{"content": "no id"}]"#).is_err());
        assert!(parse_chunks(r#"[{"id": -4}]"#).is_err());
    }

    #[test]
    fn test_payload_keeps_list_shape() {
        let chunk = Chunk {
            id: PointId::Num(7),
            podcast_title: "T".into(),
            podcast_tag: PodcastTag::List(vec![Some("x".into()), Some("y".into())]),
            content: "body".into(),
        };
        assert_eq!(
            Value::Object(chunk.payload()),
            json!({ "podcast_title": "T", "podcast_tag": ["x", "y"], "content": "body" })
        );
    }

    #[test]
    fn test_list_tag_with_nulls_is_kept() {
        let chunks =
            parse_chunks(r#"[{"id": 1, "podcast_tag": ["a", null, "b"], "content": "x"}]"#).unwrap();
        assert_eq!(
            chunks[0].podcast_tag,
            PodcastTag::List(vec![Some("a".into()), None, Some("b".into())])
        );

        let payload = Value::Object(chunks[0].payload());
        assert_eq!(payload["podcast_tag"], json!(["a", null, "b"]));
        assert_eq!(
            crate::rag::normalize_tag(payload.get("podcast_tag")),
            "a, b"
        );
    }

    #[test]
    fn test_bad_tag_names_record() {
        let err = parse_chunks(r#"[{"id": 1, "podcast_tag": "ok"}, {"id": 2, "podcast_tag": {"k": 1}}]"#)
            .unwrap_err();
        assert!(matches!(err, RagError::InvalidInput(_)));
        let msg = err.to_string();
        assert!(msg.contains("chunk #1"), "{msg}");
        assert!(msg.contains("podcast_tag"), "{msg}");

        assert!(parse_chunks(r#"[{"id": 1, "podcast_tag": [1, 2]}]"#).is_err());
    }

    #[test]
    fn test_load_chunks_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chunks.json");
        std::fs::write(&path, r#"[{"id": 1, "content": "a"}]"#).unwrap();
        assert_eq!(load_chunks(&path).unwrap().len(), 1);

        assert!(load_chunks(&dir.path().join("missing.json")).is_err());
    }
}
