//! Batch ingestion of chunk files into the vector store.
//!
//! Waits for the store, makes sure the target collection exists, then embeds
//! and upserts every chunk one point at a time. Re-running with the same file
//! overwrites points by id.

mod chunk;

pub use chunk::{load_chunks, parse_chunks, Chunk, PodcastTag};

use crate::config::Settings;
use crate::embedding::{create_embedder, Embedder};
use crate::error::{RagError, Result};
use crate::vector_store::{Distance, PayloadSchema, QdrantStore, VectorStore};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// How long to wait for the vector store to answer.
pub const READY_TIMEOUT: Duration = Duration::from_secs(60);

/// Delay between readiness probes.
pub const READY_INTERVAL: Duration = Duration::from_secs(2);

/// Payload field that gets a keyword index.
pub const TAG_FIELD: &str = "podcast_tag";

const CHUNKS_FILE: &str = "chunks.json";

/// Outcome of an ingestion run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub collection: String,
    pub chunks_upserted: usize,
    pub collection_created: bool,
}

/// Poll the store until it lists its collections, or fail after `timeout`.
pub async fn wait_until_ready(
    store: &dyn VectorStore,
    timeout: Duration,
    interval: Duration,
) -> Result<Vec<String>> {
    let started = Instant::now();
    loop {
        match store.list_collections().await {
            Ok(collections) => {
                info!("Qdrant is ready ({} collections)", collections.len());
                return Ok(collections);
            }
            Err(e) if started.elapsed() + interval > timeout => {
                return Err(RagError::VectorStore(format!(
                    "Qdrant did not become ready in time ({}s): {}",
                    timeout.as_secs(),
                    e
                )));
            }
            Err(e) => {
                info!("Waiting for Qdrant to be ready... ({})", e);
                tokio::time::sleep(interval).await;
            }
        }
    }
}

/// Create `name` with cosine distance unless it already exists.
///
/// Returns whether the collection was created. A failed tag index is only
/// logged.
pub async fn ensure_collection(store: &dyn VectorStore, name: &str, size: u64) -> Result<bool> {
    let collections = store.list_collections().await?;
    if collections.iter().any(|c| c == name) {
        info!("Collection '{}' already exists", name);
        return Ok(false);
    }

    info!("Creating collection '{}' ({} dims, cosine)", name, size);
    store.create_collection(name, size, Distance::Cosine).await?;

    if let Err(e) = store
        .create_payload_index(name, TAG_FIELD, PayloadSchema::Keyword)
        .await
    {
        warn!("Could not create payload index on {}: {}", TAG_FIELD, e);
    }
    Ok(true)
}

/// Default places to look for the chunk file, in probe order.
pub fn default_chunk_locations() -> Vec<PathBuf> {
    let mut candidates = vec![Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("qdrant_data")
        .join(CHUNKS_FILE)];
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join("..").join("qdrant_data").join(CHUNKS_FILE));
        candidates.push(cwd.join("qdrant_data").join(CHUNKS_FILE));
    }
    candidates.push(PathBuf::from("/app/qdrant_data").join(CHUNKS_FILE));
    candidates
}

/// Resolve the chunk file: the explicit path if given, else the first
/// existing default location.
pub fn locate_chunks(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) if path.exists() => Ok(path.to_path_buf()),
        Some(path) => Err(RagError::NotFound(format!(
            "Chunk file not found: {}",
            path.display()
        ))),
        None => first_existing(&default_chunk_locations()),
    }
}

fn first_existing(candidates: &[PathBuf]) -> Result<PathBuf> {
    candidates
        .iter()
        .find(|p| p.exists())
        .cloned()
        .ok_or_else(|| {
            let tried: Vec<String> = candidates.iter().map(|p| p.display().to_string()).collect();
            RagError::NotFound(format!(
                "Chunk file not found; tried: {}",
                tried.join(", ")
            ))
        })
}

fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("  {spinner:.green} Ingesting [{bar:30.cyan/blue}] {pos}/{len}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

/// Embed and upsert each chunk in order. Stops at the first failure;
/// points already written stay written.
pub async fn upsert_chunks(
    store: &dyn VectorStore,
    embedder: &dyn Embedder,
    chunks: Vec<Chunk>,
    collection: &str,
) -> Result<usize> {
    let pb = progress_bar(chunks.len() as u64);
    let mut written = 0;

    for chunk in chunks {
        let result = async {
            let vector = embedder.embed(&chunk.content).await?;
            store.upsert(collection, &chunk.into_point(vector)).await
        }
        .await;

        if let Err(e) = result {
            pb.abandon();
            return Err(e);
        }
        written += 1;
        pb.inc(1);
    }

    pb.finish_and_clear();
    info!("Upserted {} chunks into '{}'", written, collection);
    Ok(written)
}

/// Run ingestion against explicit components.
pub async fn run_with(
    store: &dyn VectorStore,
    embedder: &dyn Embedder,
    collection: &str,
    vector_size: u64,
    chunks_path: Option<&Path>,
    timeout: Duration,
) -> Result<IngestReport> {
    wait_until_ready(store, timeout, READY_INTERVAL.min(timeout)).await?;
    let collection_created = ensure_collection(store, collection, vector_size).await?;

    let path = locate_chunks(chunks_path)?;
    let chunks = load_chunks(&path)?;
    let chunks_upserted = upsert_chunks(store, embedder, chunks, collection).await?;

    Ok(IngestReport {
        collection: collection.to_string(),
        chunks_upserted,
        collection_created,
    })
}

/// Run ingestion with the store and embedder described by `settings`.
///
/// `chunks_path` falls back to the configured `CHUNKS_PATH`, then to the
/// default locations.
pub async fn run(
    settings: &Settings,
    chunks_path: Option<&Path>,
    timeout: Duration,
) -> Result<IngestReport> {
    let store = QdrantStore::new(&settings.qdrant_url(), settings.vector_store.api_key.as_deref())?;
    let embedder: Arc<dyn Embedder> = create_embedder(settings)?;

    let configured = settings.ingest.chunks_path.as_deref().map(Settings::expand_path);
    let path = chunks_path.map(Path::to_path_buf).or(configured);

    info!("Ingesting into {} at {}", settings.vector_store.collection, settings.qdrant_url());
    run_with(
        &store,
        embedder.as_ref(),
        &settings.vector_store.collection,
        settings.vector_store.vector_size,
        path.as_deref(),
        timeout,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{KeywordEmbedder, UnreachableStore};
    use crate::vector_store::{MemoryVectorStore, Point, PointId, ScoredPoint};
    use async_trait::async_trait;

    const KEYWORDS: &[&str] = &["rust", "python", "space"];

    fn write_chunks(dir: &Path) -> PathBuf {
        let path = dir.join("chunks.json");
        std::fs::write(
            &path,
            r#"[
                {"id": 1, "podcast_title": "Ep 1", "podcast_tag": ["tech", "rust"], "content": "rust ownership"},
                {"id": 2, "podcast_title": "Ep 2", "podcast_tag": "science", "content": "space probes"},
                {"id": 3, "podcast_title": "Ep 3", "podcast_tag": "tech", "content": "python typing"}
            ]"#,
        )
        .unwrap();
        path
    }

    #[tokio::test]
    async fn test_rerun_keeps_point_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_chunks(dir.path());
        let store = MemoryVectorStore::new();
        let embedder = KeywordEmbedder::new(KEYWORDS);

        let first = run_with(&store, &embedder, "podcast_chunks", 3, Some(path.as_path()), Duration::from_secs(1))
            .await
            .unwrap();
        assert!(first.collection_created);
        assert_eq!(first.chunks_upserted, 3);

        let second = run_with(&store, &embedder, "podcast_chunks", 3, Some(path.as_path()), Duration::from_secs(1))
            .await
            .unwrap();
        assert!(!second.collection_created);
        assert_eq!(store.count("podcast_chunks").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_ensure_collection_creates_index_once() {
        let store = MemoryVectorStore::new();
        assert!(ensure_collection(&store, "c", 3).await.unwrap());
        assert_eq!(store.indexed_fields("c").unwrap(), vec![TAG_FIELD.to_string()]);

        assert!(!ensure_collection(&store, "c", 3).await.unwrap());
    }

    #[tokio::test]
    async fn test_existing_collection_is_left_alone() {
        let store = MemoryVectorStore::new();
        store.create_collection("c", 3, Distance::Cosine).await.unwrap();

        assert!(!ensure_collection(&store, "c", 3).await.unwrap());
        assert!(store.indexed_fields("c").unwrap().is_empty());
    }

    /// Accepts everything except payload indexes.
    struct NoIndexStore(MemoryVectorStore);

    #[async_trait]
    impl VectorStore for NoIndexStore {
        async fn list_collections(&self) -> Result<Vec<String>> {
            self.0.list_collections().await
        }
        async fn create_collection(&self, name: &str, size: u64, distance: Distance) -> Result<()> {
            self.0.create_collection(name, size, distance).await
        }
        async fn create_payload_index(&self, _: &str, _: &str, _: PayloadSchema) -> Result<()> {
            Err(RagError::VectorStore("index not supported".to_string()))
        }
        async fn upsert(&self, collection: &str, point: &Point) -> Result<()> {
            self.0.upsert(collection, point).await
        }
        async fn search(&self, collection: &str, vector: &[f32], limit: u64) -> Result<Vec<ScoredPoint>> {
            self.0.search(collection, vector, limit).await
        }
        async fn count(&self, collection: &str) -> Result<u64> {
            self.0.count(collection).await
        }
    }

    #[tokio::test]
    async fn test_index_failure_is_not_fatal() {
        let store = NoIndexStore(MemoryVectorStore::new());
        assert!(ensure_collection(&store, "c", 3).await.unwrap());
        assert_eq!(store.list_collections().await.unwrap(), vec!["c".to_string()]);
    }

    #[tokio::test]
    async fn test_readiness_times_out() {
        let err = wait_until_ready(
            &UnreachableStore,
            Duration::from_millis(50),
            Duration::from_millis(10),
        )
        .await
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("did not become ready in time"), "{msg}");
        assert!(msg.contains("connection refused"), "{msg}");
    }

    #[tokio::test]
    async fn test_upsert_stops_at_first_failure() {
        let store = MemoryVectorStore::new();
        store.create_collection("c", 3, Distance::Cosine).await.unwrap();
        let chunks = parse_chunks(r#"[{"id": 1, "content": "rust"}, {"id": 2, "content": "space"}]"#).unwrap();

        // Two-dimensional vectors don't fit a three-dimensional collection.
        let narrow = KeywordEmbedder::new(&["rust", "space"]);
        assert!(upsert_chunks(&store, &narrow, chunks, "c").await.is_err());
        assert_eq!(store.count("c").await.unwrap(), 0);
    }

    /// Rejects the point with id 2.
    struct RejectIdStore(MemoryVectorStore);

    #[async_trait]
    impl VectorStore for RejectIdStore {
        async fn list_collections(&self) -> Result<Vec<String>> {
            self.0.list_collections().await
        }
        async fn create_collection(&self, name: &str, size: u64, distance: Distance) -> Result<()> {
            self.0.create_collection(name, size, distance).await
        }
        async fn create_payload_index(&self, collection: &str, field: &str, schema: PayloadSchema) -> Result<()> {
            self.0.create_payload_index(collection, field, schema).await
        }
        async fn upsert(&self, collection: &str, point: &Point) -> Result<()> {
            if point.id == PointId::Num(2) {
                return Err(RagError::VectorStore("point 2 rejected".to_string()));
            }
            self.0.upsert(collection, point).await
        }
        async fn search(&self, collection: &str, vector: &[f32], limit: u64) -> Result<Vec<ScoredPoint>> {
            self.0.search(collection, vector, limit).await
        }
        async fn count(&self, collection: &str) -> Result<u64> {
            self.0.count(collection).await
        }
    }

    #[tokio::test]
    async fn test_upsert_keeps_points_written_before_failure() {
        let store = RejectIdStore(MemoryVectorStore::new());
        store.create_collection("c", 3, Distance::Cosine).await.unwrap();
        let chunks = parse_chunks(
            r#"[{"id": 1, "content": "rust"}, {"id": 2, "content": "python"}, {"id": 3, "content": "space"}]"#,
        )
        .unwrap();
        let embedder = KeywordEmbedder::new(KEYWORDS);

        let err = upsert_chunks(&store, &embedder, chunks, "c").await.unwrap_err();
        assert!(err.to_string().contains("point 2 rejected"), "{err}");
        assert_eq!(store.count("c").await.unwrap(), 1);
    }

    #[test]
    fn test_locate_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_chunks(dir.path());
        assert_eq!(locate_chunks(Some(path.as_path())).unwrap(), path);

        let missing = dir.path().join("nope.json");
        assert!(matches!(locate_chunks(Some(missing.as_path())), Err(RagError::NotFound(_))));
    }

    #[test]
    fn test_first_existing_respects_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.json");
        let b = dir.path().join("b.json");
        std::fs::write(&b, "[]").unwrap();
        std::fs::write(&a, "[]").unwrap();

        let missing = dir.path().join("missing.json");
        assert_eq!(first_existing(&[missing.clone(), b.clone(), a]).unwrap(), b);
        assert!(matches!(first_existing(&[missing]), Err(RagError::NotFound(_))));
    }

    #[test]
    fn test_default_locations_end_with_container_path() {
        let candidates = default_chunk_locations();
        assert_eq!(
            candidates.last().unwrap(),
            &PathBuf::from("/app/qdrant_data/chunks.json")
        );
    }
}
