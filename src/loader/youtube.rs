//! YouTube transcript loading implementation.
//!
//! Fetches the watch page, locates the caption track list embedded in the
//! player response, downloads the timedtext XML for the English track and
//! strips it down to plain transcript text. No API key required.

use super::{DocumentUnit, Loader, UnitMetadata};
use crate::error::{KildeError, Result};
use crate::source::SourceKind;
use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, instrument};

/// Loader for YouTube video transcripts.
pub struct YoutubeLoader {
    url: String,
    client: reqwest::Client,
    video_id_regex: Regex,
}

impl YoutubeLoader {
    /// Create a loader for the video at `url`.
    pub fn new(url: String) -> Self {
        // Matches various YouTube URL formats and bare video IDs
        let video_id_regex = Regex::new(
            r"(?x)
            (?:
                (?:https?://)?
                (?:www\.)?
                (?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/v/)
                ([a-zA-Z0-9_-]{11})
            )
            |
            ^([a-zA-Z0-9_-]{11})$
        ",
        )
        .expect("Invalid regex");

        Self {
            url,
            client: reqwest::Client::new(),
            video_id_regex,
        }
    }

    /// Extract the video ID from a YouTube URL or bare ID.
    fn extract_video_id(&self, input: &str) -> Option<String> {
        let caps = self.video_id_regex.captures(input.trim())?;
        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().to_string())
    }

    /// Pull the caption track list and video title out of the watch page.
    ///
    /// The player response is a JSON blob inlined into the page; we only
    /// need two fields from it, so targeted extraction beats parsing the
    /// whole document.
    fn parse_watch_page(html: &str) -> (Option<String>, Vec<CaptionTrack>) {
        let title = Regex::new(r#""title":\{"simpleText":"((?:[^"\\]|\\.)*)"\}"#)
            .ok()
            .and_then(|re| re.captures(html))
            .and_then(|caps| caps.get(1).map(|m| unescape_json(m.as_str())));

        let tracks = Regex::new(r#""captionTracks":(\[.*?\])"#)
            .ok()
            .and_then(|re| re.captures(html))
            .and_then(|caps| {
                serde_json::from_str::<Vec<CaptionTrack>>(&caps[1]).ok()
            })
            .unwrap_or_default();

        (title, tracks)
    }

    /// Choose the best caption track: manual English first, then
    /// auto-generated English, then whatever is first.
    fn select_track(tracks: &[CaptionTrack]) -> Option<&CaptionTrack> {
        tracks
            .iter()
            .find(|t| t.language_code.starts_with("en") && t.kind.as_deref() != Some("asr"))
            .or_else(|| tracks.iter().find(|t| t.language_code.starts_with("en")))
            .or_else(|| tracks.first())
    }

    /// Strip a timedtext XML document down to plain transcript text.
    fn transcript_from_timedtext(xml: &str) -> String {
        // <text start="..." dur="...">caption</text>
        let tag_re = Regex::new(r"<[^>]+>").expect("Invalid regex");
        let mut parts = Vec::new();
        for segment in xml.split("<text") {
            if let Some(end) = segment.find('>') {
                let inner = &segment[end + 1..];
                let inner = inner.split("</text>").next().unwrap_or("");
                let cleaned = tag_re.replace_all(inner, " ");
                let cleaned = unescape_xml(cleaned.trim());
                if !cleaned.is_empty() {
                    parts.push(cleaned);
                }
            }
        }
        parts.join(" ")
    }
}

/// One entry of the watch page's caption track list.
#[derive(Debug, Clone, serde::Deserialize)]
struct CaptionTrack {
    #[serde(rename = "baseUrl")]
    base_url: String,
    #[serde(rename = "languageCode", default)]
    language_code: String,
    #[serde(default)]
    kind: Option<String>,
}

fn unescape_json(s: &str) -> String {
    s.replace("\\u0026", "&")
        .replace("\\\"", "\"")
        .replace("\\/", "/")
        .replace("\\\\", "\\")
}

fn unescape_xml(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&#39;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
}

#[async_trait]
impl Loader for YoutubeLoader {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn load(&self) -> Result<Vec<DocumentUnit>> {
        let video_id = self.extract_video_id(&self.url).ok_or_else(|| {
            KildeError::InvalidInput(format!("Could not parse YouTube URL: {}", self.url))
        })?;

        let watch_url = format!("https://www.youtube.com/watch?v={}", video_id);
        let html = self
            .client
            .get(&watch_url)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| KildeError::Loader(format!("Failed to fetch watch page: {}", e)))?
            .text()
            .await?;

        let (title, tracks) = Self::parse_watch_page(&html);

        let track = Self::select_track(&tracks).ok_or_else(|| {
            KildeError::Loader(format!("No caption tracks found for video {}", video_id))
        })?;

        debug!(
            "Using caption track {} for video {}",
            track.language_code, video_id
        );

        let timedtext_url = unescape_json(&track.base_url);
        let xml = self
            .client
            .get(&timedtext_url)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| KildeError::Loader(format!("Failed to fetch captions: {}", e)))?
            .text()
            .await?;

        let transcript = Self::transcript_from_timedtext(&xml);
        if transcript.trim().is_empty() {
            return Ok(Vec::new());
        }

        let mut metadata = UnitMetadata::new(SourceKind::Youtube, watch_url);
        if let Some(title) = title {
            metadata = metadata.with_title(title);
        }

        Ok(vec![DocumentUnit::new(transcript, metadata)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_video_id() {
        let loader = YoutubeLoader::new(String::new());
        assert_eq!(
            loader.extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            loader.extract_video_id("https://youtu.be/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            loader.extract_video_id("dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(loader.extract_video_id("https://example.com"), None);
    }

    #[test]
    fn test_transcript_from_timedtext() {
        let xml = r#"<?xml version="1.0"?><transcript>
            <text start="0" dur="2.5">Hello world</text>
            <text start="2.5" dur="3">it&#39;s a &amp; test</text>
        </transcript>"#;

        let transcript = YoutubeLoader::transcript_from_timedtext(xml);
        assert_eq!(transcript, "Hello world it's a & test");
    }

    #[test]
    fn test_parse_watch_page_caption_tracks() {
        let html = r#"..."captionTracks":[{"baseUrl":"https://www.youtube.com/api/timedtext?v=x&lang=en","languageCode":"en"},{"baseUrl":"https://www.youtube.com/api/timedtext?v=x&lang=de","languageCode":"de"}],"other":1..."#;
        let (_, tracks) = YoutubeLoader::parse_watch_page(html);
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].language_code, "en");

        let selected = YoutubeLoader::select_track(&tracks).unwrap();
        assert_eq!(selected.language_code, "en");
    }

    #[test]
    fn test_select_track_prefers_manual_english() {
        let tracks = vec![
            CaptionTrack {
                base_url: "auto".to_string(),
                language_code: "en".to_string(),
                kind: Some("asr".to_string()),
            },
            CaptionTrack {
                base_url: "manual".to_string(),
                language_code: "en".to_string(),
                kind: None,
            },
        ];
        let selected = YoutubeLoader::select_track(&tracks).unwrap();
        assert_eq!(selected.base_url, "manual");
    }
}
