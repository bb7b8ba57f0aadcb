//! Source kind and descriptor model.
//!
//! Every piece of ingested context belongs to exactly one of four source
//! kinds, and each kind is backed by its own vector store collection. Chat
//! requests select a kind ("mode") and retrieval never crosses collections.

use crate::error::{KildeError, Result};
use serde::{Deserialize, Serialize};

/// Kind of context source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Uploaded PDF documents.
    Files,
    /// Raw text pasted by the user.
    Text,
    /// Website pages fetched by URL.
    Website,
    /// YouTube video transcripts.
    Youtube,
}

/// All source kinds, in a fixed order.
pub const ALL_SOURCE_KINDS: [SourceKind; 4] = [
    SourceKind::Files,
    SourceKind::Text,
    SourceKind::Website,
    SourceKind::Youtube,
];

/// Per-kind collection configuration.
#[derive(Debug, Clone, Copy)]
pub struct CollectionSpec {
    /// Collection name in the vector store.
    pub collection: &'static str,
    /// Short description of the source, used in the retrieval prompt.
    pub prompt_hint: &'static str,
}

impl SourceKind {
    /// Look up the collection configuration for this kind.
    pub fn collection_spec(&self) -> CollectionSpec {
        match self {
            SourceKind::Files => CollectionSpec {
                collection: "pdf-collection",
                prompt_hint: "a PDF file with page numbers",
            },
            SourceKind::Text => CollectionSpec {
                collection: "text-collection",
                prompt_hint: "text provided by the user",
            },
            SourceKind::Website => CollectionSpec {
                collection: "web-collection",
                prompt_hint: "a website page",
            },
            SourceKind::Youtube => CollectionSpec {
                collection: "youtube-collection",
                prompt_hint: "a YouTube video transcript",
            },
        }
    }

    /// Collection name in the vector store.
    pub fn collection_name(&self) -> &'static str {
        self.collection_spec().collection
    }
}

impl std::str::FromStr for SourceKind {
    type Err = KildeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "files" => Ok(SourceKind::Files),
            "text" => Ok(SourceKind::Text),
            "website" => Ok(SourceKind::Website),
            "youtube" => Ok(SourceKind::Youtube),
            _ => Err(KildeError::InvalidInput(format!("Unknown mode: {}", s))),
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Files => write!(f, "files"),
            SourceKind::Text => write!(f, "text"),
            SourceKind::Website => write!(f, "website"),
            SourceKind::Youtube => write!(f, "youtube"),
        }
    }
}

/// What to ingest. Exactly one variant per ingestion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceDescriptor {
    /// An uploaded file, identified by the filename returned from upload.
    File { filename: String },
    /// A website to fetch and index.
    Website { url: String },
    /// Raw text content.
    Text { content: String },
    /// A YouTube video whose transcript should be indexed.
    Youtube { url: String },
}

impl SourceDescriptor {
    /// Build a descriptor from the optional fields of an indexing request.
    ///
    /// Exactly one field must be present and non-empty; anything else is
    /// rejected before any network call is made.
    pub fn from_fields(
        filename: Option<String>,
        website_url: Option<String>,
        text_content: Option<String>,
        youtube_url: Option<String>,
    ) -> Result<Self> {
        let non_empty = |s: Option<String>| s.filter(|v| !v.trim().is_empty());

        let mut descriptors = Vec::new();
        if let Some(filename) = non_empty(filename) {
            descriptors.push(SourceDescriptor::File { filename });
        }
        if let Some(url) = non_empty(website_url) {
            descriptors.push(SourceDescriptor::Website { url });
        }
        if let Some(content) = non_empty(text_content) {
            descriptors.push(SourceDescriptor::Text { content });
        }
        if let Some(url) = non_empty(youtube_url) {
            descriptors.push(SourceDescriptor::Youtube { url });
        }

        match descriptors.len() {
            0 => Err(KildeError::InvalidInput(
                "One of filename, websiteUrl, textContent or youtubeUrl is required".to_string(),
            )),
            1 => Ok(descriptors.remove(0)),
            _ => Err(KildeError::InvalidInput(
                "Only one context source may be indexed per request".to_string(),
            )),
        }
    }

    /// The source kind this descriptor ingests into.
    pub fn kind(&self) -> SourceKind {
        match self {
            SourceDescriptor::File { .. } => SourceKind::Files,
            SourceDescriptor::Website { .. } => SourceKind::Website,
            SourceDescriptor::Text { .. } => SourceKind::Text,
            SourceDescriptor::Youtube { .. } => SourceKind::Youtube,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_mode_parsing() {
        assert_eq!(SourceKind::from_str("files").unwrap(), SourceKind::Files);
        assert_eq!(SourceKind::from_str("TEXT").unwrap(), SourceKind::Text);
        assert_eq!(
            SourceKind::from_str("website").unwrap(),
            SourceKind::Website
        );
        assert_eq!(
            SourceKind::from_str("youtube").unwrap(),
            SourceKind::Youtube
        );
        assert!(SourceKind::from_str("podcast").is_err());
    }

    #[test]
    fn test_collection_names_are_disjoint() {
        let names: Vec<&str> = ALL_SOURCE_KINDS
            .iter()
            .map(|k| k.collection_name())
            .collect();
        let mut unique = names.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(names.len(), unique.len());
        assert_eq!(SourceKind::Files.collection_name(), "pdf-collection");
        assert_eq!(SourceKind::Text.collection_name(), "text-collection");
        assert_eq!(SourceKind::Website.collection_name(), "web-collection");
        assert_eq!(SourceKind::Youtube.collection_name(), "youtube-collection");
    }

    #[test]
    fn test_descriptor_requires_exactly_one_field() {
        let err = SourceDescriptor::from_fields(None, None, None, None).unwrap_err();
        assert!(matches!(err, crate::KildeError::InvalidInput(_)));

        // Whitespace-only fields count as missing.
        let err =
            SourceDescriptor::from_fields(None, None, Some("   ".to_string()), None).unwrap_err();
        assert!(matches!(err, crate::KildeError::InvalidInput(_)));

        let err = SourceDescriptor::from_fields(
            Some("a.pdf".to_string()),
            Some("https://example.com".to_string()),
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, crate::KildeError::InvalidInput(_)));
    }

    #[test]
    fn test_descriptor_kind_mapping() {
        let desc = SourceDescriptor::from_fields(Some("a.pdf".to_string()), None, None, None)
            .unwrap();
        assert_eq!(desc.kind(), SourceKind::Files);

        let desc =
            SourceDescriptor::from_fields(None, None, Some("hello".to_string()), None).unwrap();
        assert_eq!(desc.kind(), SourceKind::Text);

        let desc = SourceDescriptor::from_fields(
            None,
            None,
            None,
            Some("https://youtube.com/watch?v=abc".to_string()),
        )
        .unwrap();
        assert_eq!(desc.kind(), SourceKind::Youtube);
    }
}
