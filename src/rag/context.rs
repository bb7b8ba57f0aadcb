//! Context building for RAG responses.

use super::ContextChunk;
use crate::embedding::Embedder;
use crate::error::Result;
use crate::source::SourceKind;
use crate::vector_store::VectorStore;
use std::sync::Arc;

/// Builds retrieval context for a query, scoped to one source kind.
pub struct ContextBuilder {
    vector_store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    top_k: usize,
}

impl ContextBuilder {
    /// Create a new context builder.
    pub fn new(vector_store: Arc<dyn VectorStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            vector_store,
            embedder,
            top_k: 3,
        }
    }

    /// Set the number of nearest chunks to retrieve.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Build context for a query against the collection of `kind`.
    ///
    /// Fails with `UnknownCollection` when that kind was never ingested.
    pub async fn build(&self, query: &str, kind: SourceKind) -> Result<Vec<ContextChunk>> {
        let query_embedding = self.embedder.embed(query).await?;

        let results = self
            .vector_store
            .search(kind.collection_name(), &query_embedding, self.top_k)
            .await?;

        Ok(results.into_iter().map(ContextChunk::from).collect())
    }
}

/// Format context chunks for inclusion in a prompt.
pub fn format_context_for_prompt(chunks: &[ContextChunk]) -> String {
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            let mut header = format!("[{}] {}", i + 1, chunk.source);
            if let Some(title) = &chunk.title {
                header.push_str(&format!(" ({})", title));
            }
            if let Some(page) = chunk.page {
                header.push_str(&format!(", page {}", page));
            }
            format!("---\n{}\n{}\n---", header, chunk.content)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::Chunk;
    use crate::ingest::test_support::FakeEmbedder;
    use crate::loader::UnitMetadata;
    use crate::vector_store::{MemoryVectorStore, StoredChunk};

    fn chunk(content: &str, page: Option<u32>) -> ContextChunk {
        ContextChunk {
            source: "doc.pdf".to_string(),
            title: None,
            page,
            content: content.to_string(),
            score: 0.9,
        }
    }

    #[tokio::test]
    async fn test_build_caps_results_at_top_k() {
        let embedder = Arc::new(FakeEmbedder::new());
        let store = Arc::new(MemoryVectorStore::new());
        store.ensure_collection("text-collection", 32).await.unwrap();

        // Five indexed chunks, all similar to the query.
        let mut stored = Vec::new();
        for i in 0..5 {
            let content = format!("Paris fact number {}", i);
            let embedding = embedder.embed(&content).await.unwrap();
            stored.push(StoredChunk::from_chunk(
                Chunk {
                    content,
                    metadata: UnitMetadata::new(SourceKind::Text, "user_input"),
                    chunk_index: i,
                },
                embedding,
            ));
        }
        store.upsert_batch("text-collection", &stored).await.unwrap();

        let builder = ContextBuilder::new(store, embedder);
        let chunks = builder
            .build("Tell me about Paris", SourceKind::Text)
            .await
            .unwrap();
        assert_eq!(chunks.len(), 3);
    }

    #[test]
    fn test_format_includes_page_numbers() {
        let formatted = format_context_for_prompt(&[chunk("First excerpt", Some(4))]);
        assert!(formatted.contains("page 4"));
        assert!(formatted.contains("First excerpt"));
        assert!(formatted.contains("[1] doc.pdf"));
    }

    #[test]
    fn test_format_numbers_chunks_in_order() {
        let formatted =
            format_context_for_prompt(&[chunk("one", None), chunk("two", None)]);
        let one = formatted.find("[1]").unwrap();
        let two = formatted.find("[2]").unwrap();
        assert!(one < two);
    }

    #[test]
    fn test_format_empty_context() {
        assert!(format_context_for_prompt(&[]).is_empty());
    }
}
