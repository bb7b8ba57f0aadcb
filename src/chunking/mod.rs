//! Fixed-size text splitting for breaking loaded units into indexable chunks.

use crate::loader::{DocumentUnit, UnitMetadata};
use serde::{Deserialize, Serialize};

/// A chunk of content derived from a document unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Text content of this chunk.
    pub content: String,
    /// Metadata inherited from the unit this chunk was cut from.
    pub metadata: UnitMetadata,
    /// Order of this chunk within its source.
    pub chunk_index: usize,
}

/// Fixed-size character-window splitter with overlap.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    /// Create a splitter with the given window and overlap lengths.
    ///
    /// An overlap at or above the window size is clamped to a quarter of it.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_overlap = if chunk_size > 0 && chunk_overlap >= chunk_size {
            chunk_size / 4
        } else {
            chunk_overlap
        };
        Self {
            chunk_size,
            chunk_overlap,
        }
    }

    /// Split raw text into overlapping windows.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        if self.chunk_size == 0 {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Vec::new();
            }
            return vec![trimmed.to_string()];
        }

        let chars: Vec<char> = text.chars().collect();
        let len = chars.len();
        let mut chunks = Vec::new();
        let mut start = 0usize;

        while start < len {
            let end = (start + self.chunk_size).min(len);
            let window: String = chars[start..end].iter().collect();
            let trimmed = window.trim();
            if !trimmed.is_empty() {
                chunks.push(trimmed.to_string());
            }
            if end == len {
                break;
            }
            start = end.saturating_sub(self.chunk_overlap);
        }

        chunks
    }

    /// Split loaded units into chunks, inheriting each unit's metadata.
    ///
    /// Chunk indexes run across the whole source, so ordering survives
    /// indexing and retrieval.
    pub fn split_units(&self, units: &[DocumentUnit]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        for unit in units {
            for content in self.split_text(&unit.text) {
                let chunk_index = chunks.len();
                chunks.push(Chunk {
                    content,
                    metadata: unit.metadata.clone(),
                    chunk_index,
                });
            }
        }
        chunks
    }
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self::new(1000, 200)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceKind;

    #[test]
    fn test_short_text_is_one_chunk() {
        let splitter = TextSplitter::default();
        let chunks = splitter.split_text("The capital of France is Paris.");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], "The capital of France is Paris.");
    }

    #[test]
    fn test_long_text_overlaps() {
        let splitter = TextSplitter::new(10, 4);
        let text = "abcdefghijklmnopqrstuvwxyz";
        let chunks = splitter.split_text(text);

        assert!(chunks.len() > 1);
        // Each window except the last starts chunk_size - overlap after the previous.
        assert_eq!(chunks[0], "abcdefghij");
        assert_eq!(chunks[1], "ghijklmnop");
        // All input text is covered.
        let joined: String = chunks.concat();
        for c in text.chars() {
            assert!(joined.contains(c));
        }
    }

    #[test]
    fn test_overlap_clamped_when_too_large() {
        // overlap >= size would never advance; it must be clamped.
        let splitter = TextSplitter::new(8, 8);
        let chunks = splitter.split_text("abcdefghijklmnop");
        assert!(chunks.len() >= 2);
        assert!(chunks.len() < 100);
    }

    #[test]
    fn test_whitespace_only_yields_nothing() {
        let splitter = TextSplitter::default();
        assert!(splitter.split_text("   \n\t  ").is_empty());
    }

    #[test]
    fn test_units_inherit_metadata() {
        use crate::loader::{DocumentUnit, UnitMetadata};

        let splitter = TextSplitter::new(10, 0);
        let units = vec![
            DocumentUnit::new(
                "page one text here",
                UnitMetadata::new(SourceKind::Files, "doc.pdf").with_page(1),
            ),
            DocumentUnit::new(
                "page two text here",
                UnitMetadata::new(SourceKind::Files, "doc.pdf").with_page(2),
            ),
        ];

        let chunks = splitter.split_units(&units);
        assert!(chunks.len() >= 4);
        assert!(chunks.iter().any(|c| c.metadata.page == Some(1)));
        assert!(chunks.iter().any(|c| c.metadata.page == Some(2)));
        // Indexes are sequential across the whole source.
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.chunk_index, i);
        }
    }
}
