//! Content loading strategies for Kilde.
//!
//! Provides a trait-based interface for turning a source descriptor into a
//! sequence of text units ready for chunking.

mod pdf;
mod text;
mod web;
mod youtube;

pub use pdf::PdfLoader;
pub use text::TextLoader;
pub use web::WebsiteLoader;
pub use youtube::YoutubeLoader;

use crate::error::Result;
use crate::source::{SourceDescriptor, SourceKind};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Metadata attached to a loaded unit and inherited by its chunks.
///
/// A small closed schema rather than an open bag: each source kind fills
/// only the fields it actually has.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitMetadata {
    /// Kind of source this unit came from.
    pub source_kind: SourceKind,
    /// Origin of the unit (filename, URL, or "user_input").
    pub source: String,
    /// Title, if the source carries one (page title, video title).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// 1-based page number for document-derived units.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl UnitMetadata {
    /// Create metadata for a source with no page or title.
    pub fn new(source_kind: SourceKind, source: impl Into<String>) -> Self {
        Self {
            source_kind,
            source: source.into(),
            title: None,
            page: None,
        }
    }

    /// Attach a page number.
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Attach a title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// A loaded unit of text with its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentUnit {
    /// Text content of this unit.
    pub text: String,
    /// Source-specific metadata.
    pub metadata: UnitMetadata,
}

impl DocumentUnit {
    pub fn new(text: impl Into<String>, metadata: UnitMetadata) -> Self {
        Self {
            text: text.into(),
            metadata,
        }
    }
}

/// Trait for content loading implementations.
#[async_trait]
pub trait Loader: Send + Sync {
    /// Load the source into text units. An empty result means the source
    /// had no usable content.
    async fn load(&self) -> Result<Vec<DocumentUnit>>;
}

/// Create the loader matching a source descriptor.
///
/// `uploads_dir` is where uploaded files live; only file descriptors use it.
pub fn create_loader(descriptor: &SourceDescriptor, uploads_dir: &Path) -> Box<dyn Loader> {
    match descriptor {
        SourceDescriptor::File { filename } => {
            Box::new(PdfLoader::new(uploads_dir.join(filename)))
        }
        SourceDescriptor::Website { url } => Box::new(WebsiteLoader::new(url.clone())),
        SourceDescriptor::Text { content } => Box::new(TextLoader::new(content.clone())),
        SourceDescriptor::Youtube { url } => Box::new(YoutubeLoader::new(url.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_builders() {
        let meta = UnitMetadata::new(SourceKind::Files, "report.pdf")
            .with_page(3)
            .with_title("Quarterly Report");
        assert_eq!(meta.page, Some(3));
        assert_eq!(meta.title.as_deref(), Some("Quarterly Report"));
        assert_eq!(meta.source, "report.pdf");
        assert_eq!(meta.source_kind, SourceKind::Files);
    }

    #[test]
    fn test_create_loader_dispatch() {
        let uploads = Path::new("/tmp/uploads");
        // Dispatch is exhaustive over the descriptor; just check it builds
        // a loader for every variant.
        for descriptor in [
            SourceDescriptor::File {
                filename: "a.pdf".to_string(),
            },
            SourceDescriptor::Website {
                url: "https://example.com".to_string(),
            },
            SourceDescriptor::Text {
                content: "hello".to_string(),
            },
            SourceDescriptor::Youtube {
                url: "https://youtube.com/watch?v=dQw4w9WgXcQ".to_string(),
            },
        ] {
            let _loader = create_loader(&descriptor, uploads);
        }
    }
}
