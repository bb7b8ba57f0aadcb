//! Raw text loading implementation.

use super::{DocumentUnit, Loader, UnitMetadata};
use crate::error::Result;
use crate::source::SourceKind;
use async_trait::async_trait;

/// Loader for text pasted directly by the user.
pub struct TextLoader {
    content: String,
}

impl TextLoader {
    /// Create a loader wrapping the given text.
    pub fn new(content: String) -> Self {
        Self { content }
    }
}

#[async_trait]
impl Loader for TextLoader {
    async fn load(&self) -> Result<Vec<DocumentUnit>> {
        let trimmed = self.content.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }

        let metadata = UnitMetadata::new(SourceKind::Text, "user_input");
        Ok(vec![DocumentUnit::new(trimmed.to_string(), metadata)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_text_loader_wraps_content() {
        let loader = TextLoader::new("  The capital of France is Paris.  ".to_string());
        let units = loader.load().await.unwrap();
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].text, "The capital of France is Paris.");
        assert_eq!(units[0].metadata.source, "user_input");
        assert_eq!(units[0].metadata.source_kind, SourceKind::Text);
        assert!(units[0].metadata.page.is_none());
    }

    #[tokio::test]
    async fn test_blank_text_yields_no_units() {
        let loader = TextLoader::new("   \n\t ".to_string());
        let units = loader.load().await.unwrap();
        assert!(units.is_empty());
    }
}
