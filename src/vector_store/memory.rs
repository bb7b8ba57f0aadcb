//! In-memory vector store implementation.
//!
//! Useful for testing and local development without a Qdrant instance.

use super::{cosine_similarity, SearchResult, StoredChunk, VectorStore};
use crate::error::{KildeError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory vector store with one bucket per collection.
pub struct MemoryVectorStore {
    collections: RwLock<HashMap<String, Vec<StoredChunk>>>,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn ensure_collection(&self, collection: &str, _dimensions: usize) -> Result<()> {
        let mut collections = self.collections.write().unwrap();
        collections.entry(collection.to_string()).or_default();
        Ok(())
    }

    async fn collection_exists(&self, collection: &str) -> Result<bool> {
        let collections = self.collections.read().unwrap();
        Ok(collections.contains_key(collection))
    }

    async fn upsert_batch(&self, collection: &str, chunks: &[StoredChunk]) -> Result<usize> {
        let mut collections = self.collections.write().unwrap();
        let bucket = collections
            .get_mut(collection)
            .ok_or_else(|| KildeError::UnknownCollection(collection.to_string()))?;
        bucket.extend(chunks.iter().cloned());
        Ok(chunks.len())
    }

    async fn search(
        &self,
        collection: &str,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        let collections = self.collections.read().unwrap();
        let bucket = collections
            .get(collection)
            .ok_or_else(|| KildeError::UnknownCollection(collection.to_string()))?;

        let mut results: Vec<SearchResult> = bucket
            .iter()
            .map(|chunk| SearchResult {
                chunk: chunk.clone(),
                score: cosine_similarity(query_embedding, &chunk.embedding),
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(limit);

        Ok(results)
    }

    async fn chunk_count(&self, collection: &str) -> Result<usize> {
        let collections = self.collections.read().unwrap();
        Ok(collections.get(collection).map(|b| b.len()).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::Chunk;
    use crate::loader::UnitMetadata;
    use crate::source::SourceKind;

    fn stored(content: &str, embedding: Vec<f32>) -> StoredChunk {
        StoredChunk::from_chunk(
            Chunk {
                content: content.to_string(),
                metadata: UnitMetadata::new(SourceKind::Text, "user_input"),
                chunk_index: 0,
            },
            embedding,
        )
    }

    #[tokio::test]
    async fn test_search_unknown_collection_fails() {
        let store = MemoryVectorStore::new();
        let err = store.search("text-collection", &[1.0], 3).await.unwrap_err();
        assert!(matches!(err, KildeError::UnknownCollection(_)));
    }

    #[tokio::test]
    async fn test_upsert_and_search() {
        let store = MemoryVectorStore::new();
        store.ensure_collection("text-collection", 3).await.unwrap();

        store
            .upsert_batch(
                "text-collection",
                &[
                    stored("about cats", vec![1.0, 0.0, 0.0]),
                    stored("about dogs", vec![0.0, 1.0, 0.0]),
                    stored("about fish", vec![0.0, 0.0, 1.0]),
                ],
            )
            .await
            .unwrap();

        assert_eq!(store.chunk_count("text-collection").await.unwrap(), 3);

        let results = store
            .search("text-collection", &[0.9, 0.1, 0.0], 2)
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.content, "about cats");
        assert!(results[0].score > results[1].score);
    }

    #[tokio::test]
    async fn test_collections_are_isolated() {
        let store = MemoryVectorStore::new();
        store.ensure_collection("text-collection", 3).await.unwrap();
        store.ensure_collection("web-collection", 3).await.unwrap();

        store
            .upsert_batch("text-collection", &[stored("text chunk", vec![1.0, 0.0, 0.0])])
            .await
            .unwrap();

        assert_eq!(store.chunk_count("text-collection").await.unwrap(), 1);
        assert_eq!(store.chunk_count("web-collection").await.unwrap(), 0);

        let results = store
            .search("web-collection", &[1.0, 0.0, 0.0], 3)
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_ingestion_accumulates() {
        let store = MemoryVectorStore::new();
        store.ensure_collection("text-collection", 3).await.unwrap();

        let chunk = stored("same content", vec![1.0, 0.0, 0.0]);
        store
            .upsert_batch("text-collection", &[chunk.clone()])
            .await
            .unwrap();
        store
            .upsert_batch("text-collection", &[stored("same content", vec![1.0, 0.0, 0.0])])
            .await
            .unwrap();

        // Append-only: duplicates are kept.
        assert_eq!(store.chunk_count("text-collection").await.unwrap(), 2);
    }
}
