//! Vector store abstraction for Kilde.
//!
//! Provides a trait-based interface over named collections, one per source
//! kind. Collections are append-only and created lazily on first ingest.

mod memory;
mod qdrant;

pub use memory::MemoryVectorStore;
pub use qdrant::QdrantVectorStore;

use crate::chunking::Chunk;
use crate::error::Result;
use crate::loader::UnitMetadata;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A chunk stored in a vector collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredChunk {
    /// Unique chunk ID.
    pub id: Uuid,
    /// Text content of this chunk.
    pub content: String,
    /// Metadata inherited from the loaded unit.
    pub metadata: UnitMetadata,
    /// Order of this chunk within its source.
    pub chunk_index: usize,
    /// Embedding vector.
    pub embedding: Vec<f32>,
    /// When this chunk was indexed.
    pub indexed_at: DateTime<Utc>,
}

impl StoredChunk {
    /// Pair a chunk with its embedding, assigning a fresh ID.
    pub fn from_chunk(chunk: Chunk, embedding: Vec<f32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: chunk.content,
            metadata: chunk.metadata,
            chunk_index: chunk.chunk_index,
            embedding,
            indexed_at: Utc::now(),
        }
    }
}

/// A search result with score.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The matched chunk.
    pub chunk: StoredChunk,
    /// Similarity score (higher is better).
    pub score: f32,
}

/// Trait for vector store implementations.
///
/// Every operation addresses a single named collection; nothing ever
/// searches across collections.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create a collection if it does not exist yet.
    async fn ensure_collection(&self, collection: &str, dimensions: usize) -> Result<()>;

    /// Check whether a collection exists.
    async fn collection_exists(&self, collection: &str) -> Result<bool>;

    /// Append chunks with their embeddings to a collection.
    async fn upsert_batch(&self, collection: &str, chunks: &[StoredChunk]) -> Result<usize>;

    /// Search a collection for the nearest chunks.
    ///
    /// Fails with `UnknownCollection` when the collection does not exist.
    async fn search(
        &self,
        collection: &str,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>>;

    /// Number of chunks stored in a collection. Zero if it does not exist.
    async fn chunk_count(&self, collection: &str) -> Result<usize>;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceKind;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_stored_chunk_from_chunk() {
        let chunk = Chunk {
            content: "Paris is the capital.".to_string(),
            metadata: UnitMetadata::new(SourceKind::Text, "user_input"),
            chunk_index: 0,
        };

        let stored = StoredChunk::from_chunk(chunk, vec![0.1, 0.2]);
        assert_eq!(stored.content, "Paris is the capital.");
        assert_eq!(stored.embedding, vec![0.1, 0.2]);
        assert_eq!(stored.metadata.source, "user_input");
    }
}
