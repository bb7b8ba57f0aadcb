//! RAG (Retrieval-Augmented Generation) for mode-scoped question answering.
//!
//! Retrieval is restricted to the single collection matching the requested
//! source kind; answers are grounded in the retrieved chunks only.

pub mod context;
mod response;

pub use context::ContextBuilder;
pub use response::{RagEngine, RagResponse};

use crate::vector_store::SearchResult;

/// A retrieved chunk formatted for prompting and display.
#[derive(Debug, Clone)]
pub struct ContextChunk {
    /// Origin of the chunk (filename, URL, or "user_input").
    pub source: String,
    /// Title of the source, if it has one.
    pub title: Option<String>,
    /// Page number for document-derived chunks.
    pub page: Option<u32>,
    /// Text content.
    pub content: String,
    /// Similarity score.
    pub score: f32,
}

impl From<SearchResult> for ContextChunk {
    fn from(result: SearchResult) -> Self {
        Self {
            source: result.chunk.metadata.source.clone(),
            title: result.chunk.metadata.title.clone(),
            page: result.chunk.metadata.page,
            content: result.chunk.content,
            score: result.score,
        }
    }
}
