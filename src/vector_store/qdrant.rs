//! Qdrant vector store implementation.
//!
//! Talks to a Qdrant instance over its REST API. Collections are created
//! with cosine distance; chunk text and metadata travel in the point payload.

use super::{SearchResult, StoredChunk, VectorStore};
use crate::error::{KildeError, Result};
use crate::loader::UnitMetadata;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Qdrant-backed vector store.
pub struct QdrantVectorStore {
    client: reqwest::Client,
    base_url: String,
}

/// Point payload as stored in Qdrant. The embedding itself lives in the
/// point vector and is not read back on search.
#[derive(Debug, Serialize, Deserialize)]
struct ChunkPayload {
    content: String,
    metadata: UnitMetadata,
    chunk_index: usize,
    indexed_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct Point<'a> {
    id: Uuid,
    vector: &'a [f32],
    payload: ChunkPayload,
}

#[derive(Deserialize)]
struct QueryResponse {
    result: Option<QueryResult>,
}

#[derive(Deserialize)]
struct QueryResult {
    points: Vec<ScoredPoint>,
}

#[derive(Deserialize)]
struct ScoredPoint {
    id: Uuid,
    score: f32,
    payload: Option<ChunkPayload>,
}

#[derive(Deserialize)]
struct CountResponse {
    result: Option<CountResult>,
}

#[derive(Deserialize)]
struct CountResult {
    count: usize,
}

impl QdrantVectorStore {
    /// Create a store against the Qdrant instance at `base_url`.
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/collections/{}", self.base_url, collection)
    }

    async fn check_status(response: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(KildeError::VectorStore(format!(
                "{} failed with status {}: {}",
                context, status, body
            )))
        }
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    #[instrument(skip(self))]
    async fn ensure_collection(&self, collection: &str, dimensions: usize) -> Result<()> {
        if self.collection_exists(collection).await? {
            return Ok(());
        }

        debug!("Creating collection {}", collection);
        let body = json!({
            "vectors": { "size": dimensions, "distance": "Cosine" }
        });
        let response = self
            .client
            .put(self.collection_url(collection))
            .json(&body)
            .send()
            .await?;
        Self::check_status(response, "Collection create").await?;
        Ok(())
    }

    async fn collection_exists(&self, collection: &str) -> Result<bool> {
        let response = self
            .client
            .get(self.collection_url(collection))
            .send()
            .await?;
        Ok(response.status().is_success())
    }

    #[instrument(skip(self, chunks), fields(count = chunks.len()))]
    async fn upsert_batch(&self, collection: &str, chunks: &[StoredChunk]) -> Result<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let points: Vec<Point> = chunks
            .iter()
            .map(|c| Point {
                id: c.id,
                vector: &c.embedding,
                payload: ChunkPayload {
                    content: c.content.clone(),
                    metadata: c.metadata.clone(),
                    chunk_index: c.chunk_index,
                    indexed_at: c.indexed_at,
                },
            })
            .collect();

        let url = format!("{}/points?wait=true", self.collection_url(collection));
        let response = self
            .client
            .put(url)
            .json(&json!({ "points": points }))
            .send()
            .await?;
        Self::check_status(response, "Points upsert").await?;

        debug!("Upserted {} points into {}", chunks.len(), collection);
        Ok(chunks.len())
    }

    #[instrument(skip(self, query_embedding))]
    async fn search(
        &self,
        collection: &str,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        if !self.collection_exists(collection).await? {
            return Err(KildeError::UnknownCollection(collection.to_string()));
        }

        let url = format!("{}/points/query", self.collection_url(collection));
        let body = json!({
            "query": query_embedding,
            "limit": limit,
            "with_payload": true,
        });

        let response = self.client.post(url).json(&body).send().await?;
        let response = Self::check_status(response, "Points query").await?;
        let parsed: QueryResponse = response.json().await?;

        let points = parsed.result.map(|r| r.points).unwrap_or_default();
        let results = points
            .into_iter()
            .filter_map(|p| {
                let payload = p.payload?;
                Some(SearchResult {
                    chunk: StoredChunk {
                        id: p.id,
                        content: payload.content,
                        metadata: payload.metadata,
                        chunk_index: payload.chunk_index,
                        embedding: Vec::new(),
                        indexed_at: payload.indexed_at,
                    },
                    score: p.score,
                })
            })
            .collect();

        Ok(results)
    }

    async fn chunk_count(&self, collection: &str) -> Result<usize> {
        if !self.collection_exists(collection).await? {
            return Ok(0);
        }

        let url = format!("{}/points/count", self.collection_url(collection));
        let response = self
            .client
            .post(url)
            .json(&json!({ "exact": true }))
            .send()
            .await?;
        let response = Self::check_status(response, "Points count").await?;
        let parsed: CountResponse = response.json().await?;
        Ok(parsed.result.map(|r| r.count).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalization() {
        let store = QdrantVectorStore::new("http://localhost:6333/");
        assert_eq!(
            store.collection_url("pdf-collection"),
            "http://localhost:6333/collections/pdf-collection"
        );
    }

    #[test]
    fn test_payload_roundtrip() {
        use crate::source::SourceKind;

        let payload = ChunkPayload {
            content: "chunk text".to_string(),
            metadata: UnitMetadata::new(SourceKind::Files, "doc.pdf").with_page(7),
            chunk_index: 2,
            indexed_at: Utc::now(),
        };

        let value = serde_json::to_value(&payload).unwrap();
        let parsed: ChunkPayload = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.content, "chunk text");
        assert_eq!(parsed.metadata.page, Some(7));
        assert_eq!(parsed.chunk_index, 2);
    }
}
