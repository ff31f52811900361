//! In-memory vector store implementation.
//!
//! Useful for testing and offline runs. Scores are cosine similarities
//! regardless of the configured distance.

use super::{cosine_similarity, Distance, PayloadSchema, Point, PointId, ScoredPoint, VectorStore};
use crate::error::{RagError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

struct MemoryCollection {
    size: u64,
    indexed_fields: Vec<String>,
    points: HashMap<PointId, Point>,
}

/// In-memory vector store.
pub struct MemoryVectorStore {
    collections: RwLock<HashMap<String, MemoryCollection>>,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }

    /// Payload fields indexed on a collection.
    pub fn indexed_fields(&self, collection: &str) -> Result<Vec<String>> {
        let collections = self.read()?;
        let coll = lookup(&collections, collection)?;
        Ok(coll.indexed_fields.clone())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, MemoryCollection>>> {
        self.collections
            .read()
            .map_err(|_| RagError::VectorStore("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, MemoryCollection>>> {
        self.collections
            .write()
            .map_err(|_| RagError::VectorStore("memory store lock poisoned".to_string()))
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

fn lookup<'a>(
    collections: &'a HashMap<String, MemoryCollection>,
    name: &str,
) -> Result<&'a MemoryCollection> {
    collections
        .get(name)
        .ok_or_else(|| RagError::NotFound(format!("Collection `{}` doesn't exist", name)))
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn list_collections(&self) -> Result<Vec<String>> {
        let collections = self.read()?;
        let mut names: Vec<String> = collections.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn create_collection(&self, name: &str, size: u64, _distance: Distance) -> Result<()> {
        let mut collections = self.write()?;
        if collections.contains_key(name) {
            return Err(RagError::VectorStore(format!(
                "Collection `{}` already exists",
                name
            )));
        }
        collections.insert(
            name.to_string(),
            MemoryCollection {
                size,
                indexed_fields: Vec::new(),
                points: HashMap::new(),
            },
        );
        Ok(())
    }

    async fn create_payload_index(
        &self,
        collection: &str,
        field: &str,
        _schema: PayloadSchema,
    ) -> Result<()> {
        let mut collections = self.write()?;
        let coll = collections
            .get_mut(collection)
            .ok_or_else(|| RagError::NotFound(format!("Collection `{}` doesn't exist", collection)))?;
        if !coll.indexed_fields.iter().any(|f| f == field) {
            coll.indexed_fields.push(field.to_string());
        }
        Ok(())
    }

    async fn upsert(&self, collection: &str, point: &Point) -> Result<()> {
        let mut collections = self.write()?;
        let coll = collections
            .get_mut(collection)
            .ok_or_else(|| RagError::NotFound(format!("Collection `{}` doesn't exist", collection)))?;
        if point.vector.len() as u64 != coll.size {
            return Err(RagError::VectorStore(format!(
                "Wrong input: Vector dimension error: expected dim: {}, got {}",
                coll.size,
                point.vector.len()
            )));
        }
        coll.points.insert(point.id.clone(), point.clone());
        Ok(())
    }

    async fn search(&self, collection: &str, vector: &[f32], limit: u64) -> Result<Vec<ScoredPoint>> {
        let collections = self.read()?;
        let coll = lookup(&collections, collection)?;

        let mut results: Vec<ScoredPoint> = coll
            .points
            .values()
            .map(|p| ScoredPoint {
                id: p.id.clone(),
                score: cosine_similarity(vector, &p.vector),
                payload: Some(p.payload.clone()),
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        results.truncate(limit as usize);

        Ok(results)
    }

    async fn count(&self, collection: &str) -> Result<u64> {
        let collections = self.read()?;
        Ok(lookup(&collections, collection)?.points.len() as u64)
    }
}
