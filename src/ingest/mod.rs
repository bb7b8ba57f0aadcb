//! Ingestion pipeline for Kilde.
//!
//! Coordinates the flow from source descriptor to indexed collection:
//! load, chunk, embed, upsert. All steps run sequentially within one
//! request; failures propagate without retry or rollback.

use crate::chunking::TextSplitter;
use crate::config::Settings;
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{KildeError, Result};
use crate::loader::create_loader;
use crate::source::SourceDescriptor;
use crate::vector_store::{MemoryVectorStore, QdrantVectorStore, StoredChunk, VectorStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument};

/// Result of a successful ingestion.
#[derive(Debug, Clone)]
pub struct IngestResult {
    /// Collection the chunks were indexed into.
    pub collection: String,
    /// Number of chunks indexed.
    pub chunks_indexed: usize,
}

/// The ingestion orchestrator.
pub struct Ingestor {
    settings: Settings,
    splitter: TextSplitter,
    embedder: Arc<dyn Embedder>,
    vector_store: Arc<dyn VectorStore>,
    uploads_dir: PathBuf,
}

impl Ingestor {
    /// Create a new ingestor with components built from configuration.
    pub fn new(settings: Settings) -> Result<Self> {
        let embedder: Arc<dyn Embedder> =
            Arc::new(OpenAIEmbedder::from_settings(&settings.embedding));

        let vector_store: Arc<dyn VectorStore> = match settings.vector_store.provider.as_str() {
            "qdrant" => Arc::new(QdrantVectorStore::new(&settings.vector_store.qdrant_url)),
            "memory" => Arc::new(MemoryVectorStore::new()),
            other => {
                return Err(KildeError::Config(format!(
                    "Unknown vector store provider: {}",
                    other
                )))
            }
        };

        Self::with_components(settings, embedder, vector_store)
    }

    /// Create an ingestor with injected components.
    pub fn with_components(
        settings: Settings,
        embedder: Arc<dyn Embedder>,
        vector_store: Arc<dyn VectorStore>,
    ) -> Result<Self> {
        let splitter = TextSplitter::new(
            settings.chunking.chunk_size,
            settings.chunking.chunk_overlap,
        );
        let uploads_dir = settings.uploads_dir();
        std::fs::create_dir_all(&uploads_dir)?;

        Ok(Self {
            settings,
            splitter,
            embedder,
            vector_store,
            uploads_dir,
        })
    }

    /// Get a reference to the vector store.
    pub fn vector_store(&self) -> Arc<dyn VectorStore> {
        self.vector_store.clone()
    }

    /// Get a reference to the embedder.
    pub fn embedder(&self) -> Arc<dyn Embedder> {
        self.embedder.clone()
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Get the uploads directory.
    pub fn uploads_dir(&self) -> &PathBuf {
        &self.uploads_dir
    }

    /// Ingest one source: load, chunk, embed, and index into the
    /// collection matching the descriptor's kind.
    #[instrument(skip(self), fields(kind = %descriptor.kind()))]
    pub async fn ingest(&self, descriptor: &SourceDescriptor) -> Result<IngestResult> {
        let kind = descriptor.kind();
        let collection = kind.collection_name();

        let loader = create_loader(descriptor, &self.uploads_dir);
        let units = loader.load().await?;
        if units.is_empty() {
            return Err(KildeError::NoContent(format!(
                "Source yielded no content for mode {}",
                kind
            )));
        }

        let chunks = self.splitter.split_units(&units);
        if chunks.is_empty() {
            return Err(KildeError::NoContent(format!(
                "Source yielded no chunks for mode {}",
                kind
            )));
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != chunks.len() {
            return Err(KildeError::Embedding(format!(
                "Expected {} embeddings, got {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        let stored: Vec<StoredChunk> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| StoredChunk::from_chunk(chunk, embedding))
            .collect();

        // Lazy collection creation on first ingest into this kind.
        self.vector_store
            .ensure_collection(collection, self.embedder.dimensions())
            .await?;
        let chunks_indexed = self.vector_store.upsert_batch(collection, &stored).await?;

        info!("Indexed {} chunks into {}", chunks_indexed, collection);

        Ok(IngestResult {
            collection: collection.to_string(),
            chunks_indexed,
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::embedding::Embedder;
    use crate::error::Result;
    use async_trait::async_trait;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Deterministic embedder for tests: buckets words into a small vector
    /// so texts sharing terms land near each other, no network involved.
    pub struct FakeEmbedder {
        pub calls: AtomicUsize,
    }

    impl FakeEmbedder {
        pub fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }

        fn embed_one(text: &str) -> Vec<f32> {
            let mut vector = vec![0.0f32; 32];
            for word in text.to_lowercase().split_whitespace() {
                let word = word.trim_matches(|c: char| !c.is_alphanumeric());
                if word.is_empty() {
                    continue;
                }
                let mut hasher = DefaultHasher::new();
                word.hash(&mut hasher);
                let idx = (hasher.finish() % 32) as usize;
                vector[idx] += 1.0;
            }
            vector
        }
    }

    #[async_trait]
    impl Embedder for FakeEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Self::embed_one(text))
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts.iter().map(|t| Self::embed_one(t)).collect())
        }

        fn dimensions(&self) -> usize {
            32
        }
    }
}
