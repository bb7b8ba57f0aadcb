//! Kilde - Retrieval-Augmented Chat Backend
//!
//! A backend for grounded question answering over user-supplied context.
//!
//! The name "Kilde" comes from the Norwegian/Scandinavian word for "source."
//!
//! # Overview
//!
//! Kilde allows you to:
//! - Index context from uploaded PDF documents, websites, pasted text, and
//!   YouTube transcripts into per-source vector collections
//! - Ask questions scoped to one source kind and get answers grounded in
//!   the indexed context, with page citations for document sources
//! - Serve the whole flow over a small HTTP API
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `source` - Source kind and descriptor model
//! - `loader` - Content loading strategies (PDF, website, text, YouTube)
//! - `chunking` - Fixed-size text splitting
//! - `embedding` - Embedding generation
//! - `vector_store` - Vector database abstraction (Qdrant, in-memory)
//! - `rag` - Retrieval and answer generation
//! - `ingest` - Ingestion pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use kilde::config::Settings;
//! use kilde::ingest::Ingestor;
//! use kilde::source::SourceDescriptor;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let ingestor = Ingestor::new(settings)?;
//!
//!     let descriptor = SourceDescriptor::Text {
//!         content: "The capital of France is Paris.".to_string(),
//!     };
//!     let result = ingestor.ingest(&descriptor).await?;
//!     println!("Indexed {} chunks into {}", result.chunks_indexed, result.collection);
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod ingest;
pub mod loader;
pub mod openai;
pub mod rag;
pub mod source;
pub mod vector_store;

pub use error::{KildeError, Result};
