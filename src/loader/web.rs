//! Website loading implementation.
//!
//! Fetches a page over HTTP and reduces its HTML to visible text.

use super::{DocumentUnit, Loader, UnitMetadata};
use crate::error::{KildeError, Result};
use crate::source::SourceKind;
use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::{debug, instrument};
use url::Url;

/// Loader for website URLs.
pub struct WebsiteLoader {
    url: String,
    client: reqwest::Client,
}

impl WebsiteLoader {
    /// Create a loader for the page at `url`.
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }

    /// Extract the page title and visible body text from an HTML document.
    fn extract_text(html: &str) -> (Option<String>, String) {
        let document = Html::parse_document(html);

        let title = Selector::parse("title")
            .ok()
            .and_then(|sel| document.select(&sel).next())
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty());

        // Scripts and styles are not visible text; body covers the rest.
        let body_selector = Selector::parse("body").expect("valid selector");
        let skip_selector = Selector::parse("script, style, noscript").expect("valid selector");

        let mut skipped = std::collections::HashSet::new();
        for el in document.select(&skip_selector) {
            for node in el.descendants() {
                skipped.insert(node.id());
            }
        }

        let mut parts: Vec<String> = Vec::new();
        if let Some(body) = document.select(&body_selector).next() {
            for node in body.descendants() {
                if skipped.contains(&node.id()) {
                    continue;
                }
                if let Some(text) = node.value().as_text() {
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        parts.push(trimmed.to_string());
                    }
                }
            }
        }

        (title, parts.join(" "))
    }
}

#[async_trait]
impl Loader for WebsiteLoader {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn load(&self) -> Result<Vec<DocumentUnit>> {
        let url = Url::parse(&self.url)
            .map_err(|e| KildeError::InvalidInput(format!("Invalid website URL: {}", e)))?;

        let response = self
            .client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()
            .map_err(|e| KildeError::Loader(format!("Failed to fetch {}: {}", self.url, e)))?;

        let html = response.text().await?;
        let (title, text) = Self::extract_text(&html);

        debug!("Extracted {} characters from {}", text.len(), self.url);

        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let mut metadata = UnitMetadata::new(SourceKind::Website, url.to_string());
        if let Some(title) = title {
            metadata = metadata.with_title(title);
        }

        Ok(vec![DocumentUnit::new(text, metadata)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_skips_scripts_and_styles() {
        let html = r#"<html><head><title>Test Page</title>
            <style>body { color: red; }</style></head>
            <body><h1>Heading</h1><script>var x = 1;</script>
            <p>Visible paragraph.</p></body></html>"#;

        let (title, text) = WebsiteLoader::extract_text(html);
        assert_eq!(title.as_deref(), Some("Test Page"));
        assert!(text.contains("Heading"));
        assert!(text.contains("Visible paragraph."));
        assert!(!text.contains("var x"));
        assert!(!text.contains("color: red"));
    }

    #[test]
    fn test_extract_text_empty_body() {
        let (title, text) = WebsiteLoader::extract_text("<html><body></body></html>");
        assert!(title.is_none());
        assert!(text.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_url_is_rejected() {
        let loader = WebsiteLoader::new("not a url".to_string());
        let err = loader.load().await.unwrap_err();
        assert!(matches!(err, KildeError::InvalidInput(_)));
    }
}
