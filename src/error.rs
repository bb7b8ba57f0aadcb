//! Error types for Kilde.

use thiserror::Error;

/// Library-level error type for Kilde operations.
#[derive(Error, Debug)]
pub enum KildeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No content found: {0}")]
    NoContent(String),

    #[error("Vector store collection not found: {0}")]
    UnknownCollection(String),

    #[error("Loader error: {0}")]
    Loader(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("RAG error: {0}")]
    Rag(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),
}

impl KildeError {
    /// Whether this error was caused by the caller's request rather than
    /// an upstream service failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            KildeError::InvalidInput(_)
                | KildeError::NoContent(_)
                | KildeError::UnknownCollection(_)
        )
    }
}

/// Result type alias for Kilde operations.
pub type Result<T> = std::result::Result<T, KildeError>;
