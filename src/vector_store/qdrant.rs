//! Qdrant vector store over the REST API.

use super::{Distance, PayloadSchema, Point, ScoredPoint, VectorStore};
use crate::error::{RagError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Default timeout for Qdrant requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Qdrant client speaking the REST API.
///
/// Constructing the client does not touch the network; the first request does.
#[derive(Clone)]
pub struct QdrantStore {
    client: Client,
    base: Url,
}

impl QdrantStore {
    /// Create a client for the given base URL (e.g. `http://localhost:6333`).
    pub fn new(base_url: &str, api_key: Option<&str>) -> Result<Self> {
        Self::with_timeout(base_url, api_key, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client with a custom request timeout.
    pub fn with_timeout(base_url: &str, api_key: Option<&str>, timeout: Duration) -> Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| RagError::Config(format!("Invalid Qdrant URL '{}': {}", base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(RagError::Config(format!("Invalid Qdrant URL '{}'", base_url)));
        }

        let mut headers = HeaderMap::new();
        if let Some(key) = api_key.map(str::trim).filter(|k| !k.is_empty()) {
            let value = HeaderValue::from_str(key)
                .map_err(|_| RagError::Config("Invalid QDRANT_API_KEY".to_string()))?;
            headers.insert("api-key", value);
        }

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, base })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| RagError::Config(format!("Invalid Qdrant URL '{}'", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn call<B, T>(&self, method: Method, url: Url, body: Option<&B>, op: &str) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("Qdrant {} {}", method, url);

        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            RagError::VectorStore(format!("Qdrant {} request failed: {}", op, e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(RagError::VectorStore(format!(
                "Qdrant {} failed ({}): {}",
                op,
                status,
                error_message(&body)
            )));
        }

        let envelope: Envelope<T> = response.json().await.map_err(|e| {
            RagError::VectorStore(format!("Failed to parse Qdrant {} response: {}", op, e))
        })?;
        envelope
            .result
            .ok_or_else(|| RagError::VectorStore(format!("Qdrant {} response missing result", op)))
    }
}

/// Standard Qdrant response wrapper.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct CollectionsResult {
    collections: Vec<CollectionDescription>,
}

#[derive(Debug, Deserialize)]
struct CollectionDescription {
    name: String,
}

#[derive(Debug, Deserialize)]
struct CountResult {
    count: u64,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    points: [&'a Point; 1],
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    vector: &'a [f32],
    limit: u64,
    with_payload: bool,
}

/// Pull the human-readable message out of a Qdrant error body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("status")
                .and_then(|s| s.get("error"))
                .and_then(|e| e.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl VectorStore for QdrantStore {
    #[instrument(skip(self))]
    async fn list_collections(&self) -> Result<Vec<String>> {
        let url = self.endpoint(&["collections"])?;
        let result: CollectionsResult = self
            .call::<(), _>(Method::GET, url, None, "list collections")
            .await?;
        Ok(result.collections.into_iter().map(|c| c.name).collect())
    }

    #[instrument(skip(self))]
    async fn create_collection(&self, name: &str, size: u64, distance: Distance) -> Result<()> {
        let url = self.endpoint(&["collections", name])?;
        let body = json!({ "vectors": { "size": size, "distance": distance } });
        let _: bool = self
            .call(Method::PUT, url, Some(&body), "create collection")
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn create_payload_index(
        &self,
        collection: &str,
        field: &str,
        schema: PayloadSchema,
    ) -> Result<()> {
        let mut url = self.endpoint(&["collections", collection, "index"])?;
        url.query_pairs_mut().append_pair("wait", "true");
        let body = json!({ "field_name": field, "field_schema": schema });
        let _: serde_json::Value = self
            .call(Method::PUT, url, Some(&body), "create payload index")
            .await?;
        Ok(())
    }

    #[instrument(skip(self, point), fields(id = %point.id))]
    async fn upsert(&self, collection: &str, point: &Point) -> Result<()> {
        let mut url = self.endpoint(&["collections", collection, "points"])?;
        url.query_pairs_mut().append_pair("wait", "true");
        let body = UpsertRequest { points: [point] };
        let _: serde_json::Value = self.call(Method::PUT, url, Some(&body), "upsert").await?;
        Ok(())
    }

    #[instrument(skip(self, vector))]
    async fn search(&self, collection: &str, vector: &[f32], limit: u64) -> Result<Vec<ScoredPoint>> {
        let url = self.endpoint(&["collections", collection, "points", "search"])?;
        let body = SearchRequest {
            vector,
            limit,
            with_payload: true,
        };
        self.call(Method::POST, url, Some(&body), "search").await
    }

    #[instrument(skip(self))]
    async fn count(&self, collection: &str) -> Result<u64> {
        let url = self.endpoint(&["collections", collection, "points", "count"])?;
        let body = json!({ "exact": true });
        let result: CountResult = self.call(Method::POST, url, Some(&body), "count").await?;
        Ok(result.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::PointId;

    #[test]
    fn test_endpoint_building() {
        let store = QdrantStore::new("http://localhost:6333", None).unwrap();
        let url = store.endpoint(&["collections", "podcast_chunks", "points", "search"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:6333/collections/podcast_chunks/points/search"
        );

        let store = QdrantStore::new("https://cloud.example:6333/", Some("key")).unwrap();
        let url = store.endpoint(&["collections", "a b"]).unwrap();
        assert_eq!(url.as_str(), "https://cloud.example:6333/collections/a%20b");
    }

    #[test]
    fn test_invalid_url_is_config_error() {
        assert!(matches!(
            QdrantStore::new("not a url", None),
            Err(RagError::Config(_))
        ));
    }

    #[test]
    fn test_parse_collections_envelope() {
        let body = r#"{"result":{"collections":[{"name":"podcast_chunks"},{"name":"other"}]},"status":"ok","time":0.0001}"#;
        let env: Envelope<CollectionsResult> = serde_json::from_str(body).unwrap();
        let names: Vec<String> = env.result.unwrap().collections.into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["podcast_chunks", "other"]);
    }

    #[test]
    fn test_parse_search_envelope() {
        let body = r#"{"result":[
            {"id":3,"version":1,"score":0.91,"payload":{"podcast_title":"Ep 3","podcast_tag":["a","b"],"content":"hi"}},
            {"id":"5c56c793-69f3-4fbf-87e6-c4bf54c28c26","version":2,"score":0.5,"payload":null}
        ],"status":"ok","time":0.002}"#;
        let env: Envelope<Vec<ScoredPoint>> = serde_json::from_str(body).unwrap();
        let hits = env.result.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, PointId::Num(3));
        assert!((hits[0].score - 0.91).abs() < 1e-6);
        assert!(hits[1].payload.is_none());
    }

    #[test]
    fn test_upsert_body_shape() {
        let point = Point {
            id: PointId::Num(1),
            vector: vec![0.5, 0.25],
            payload: serde_json::Map::new(),
        };
        let body = serde_json::to_value(UpsertRequest { points: [&point] }).unwrap();
        assert_eq!(body, json!({ "points": [{ "id": 1, "vector": [0.5, 0.25], "payload": {} }] }));
    }

    #[test]
    fn test_error_message_extraction() {
        let body = r#"{"status":{"error":"Not found: Collection `x` doesn't exist!"},"time":0.0}"#;
        assert_eq!(error_message(body), "Not found: Collection `x` doesn't exist!");
        assert_eq!(error_message("plain text"), "plain text");
    }

    async fn stub_qdrant(router: axum::Router) -> QdrantStore {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        QdrantStore::new(&format!("http://{}", addr), None).unwrap()
    }

    #[tokio::test]
    async fn test_search_error_reports_qdrant_message() {
        use axum::{http::StatusCode, routing::post, Json, Router};

        let store = stub_qdrant(Router::new().route(
            "/collections/missing/points/search",
            post(|| async {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({
                        "status": { "error": "Not found: Collection `missing` doesn't exist!" },
                        "time": 0.0
                    })),
                )
            }),
        ))
        .await;

        match store.search("missing", &[0.1, 0.2], 3).await {
            Err(RagError::VectorStore(msg)) => {
                assert!(msg.contains("search"), "{msg}");
                assert!(msg.contains("404"), "{msg}");
                assert!(msg.contains("Collection `missing` doesn't exist!"), "{msg}");
                assert!(!msg.contains("\"time\""), "{msg}");
            }
            other => panic!("expected vector store error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_search_reads_result_envelope() {
        use axum::{routing::post, Json, Router};

        let store = stub_qdrant(Router::new().route(
            "/collections/podcast_chunks/points/search",
            post(|| async {
                Json(json!({
                    "result": [{ "id": 9, "version": 0, "score": 0.8, "payload": { "content": "hi" } }],
                    "status": "ok",
                    "time": 0.001
                }))
            }),
        ))
        .await;

        let hits = store.search("podcast_chunks", &[0.1, 0.2], 3).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, PointId::Num(9));
    }
}
