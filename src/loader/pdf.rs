//! PDF loading implementation.
//!
//! Extracts text from an uploaded PDF one page at a time so chunks can
//! carry page-number citations.

use super::{DocumentUnit, Loader, UnitMetadata};
use crate::error::{KildeError, Result};
use crate::source::SourceKind;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{debug, instrument};

/// Loader for uploaded PDF files.
pub struct PdfLoader {
    path: PathBuf,
}

impl PdfLoader {
    /// Create a loader for the PDF at `path`.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl Loader for PdfLoader {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> Result<Vec<DocumentUnit>> {
        if !self.path.exists() {
            return Err(KildeError::Loader(format!(
                "Uploaded file not found: {}",
                self.path.display()
            )));
        }

        let filename = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string());

        // pdf-extract is synchronous and CPU-bound; keep it off the runtime.
        let path = self.path.clone();
        let pages = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_by_pages(&path)
        })
        .await
        .map_err(|e| KildeError::Loader(format!("PDF extraction task failed: {}", e)))?
        .map_err(|e| KildeError::Loader(format!("PDF extraction failed: {}", e)))?;

        debug!("Extracted {} pages from {}", pages.len(), filename);

        let units = pages
            .into_iter()
            .enumerate()
            .filter(|(_, text)| !text.trim().is_empty())
            .map(|(i, text)| {
                let metadata = UnitMetadata::new(SourceKind::Files, filename.clone())
                    .with_page(i as u32 + 1);
                DocumentUnit::new(text.trim().to_string(), metadata)
            })
            .collect();

        Ok(units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_loader_error() {
        let loader = PdfLoader::new(PathBuf::from("/nonexistent/uploads/missing.pdf"));
        let err = loader.load().await.unwrap_err();
        assert!(matches!(err, KildeError::Loader(_)));
    }
}
