//! The payload handed from the dispatcher to the sequencer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// Maximum characters of a text snippet shown in display labels.
/// The submitted snippet itself is never truncated.
const SNIPPET_TITLE_CHARS: usize = 77;

/// Which kind of source drives the import workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Import a web page by URL
    Url,
    /// Import a pasted text snippet
    Text,
}

/// A single summarization request, created by the dispatcher at trigger time
/// and consumed exactly once by the sequencer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummarizationRequest {
    /// URL of the page to import, if this is a URL-driven request
    pub target_url: Option<String>,
    /// Selected text to import, if this is a text-driven request
    pub selected_text: Option<String>,
    /// Advisory display title for the source
    pub source_title: Option<String>,
    /// When the trigger fired
    pub created_at: DateTime<Utc>,
}

impl SummarizationRequest {
    pub fn for_url(url: impl Into<String>, title: Option<String>) -> Self {
        SummarizationRequest {
            target_url: Some(url.into()),
            selected_text: None,
            source_title: title,
            created_at: Utc::now(),
        }
    }

    pub fn for_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let title = snippet_title(&text);
        SummarizationRequest {
            target_url: None,
            selected_text: Some(text),
            source_title: Some(title),
            created_at: Utc::now(),
        }
    }

    /// The source kind driving the workflow. A URL wins when both are
    /// present; a selection riding alongside a URL is advisory only.
    pub fn kind(&self) -> Option<SourceKind> {
        if self.target_url.as_deref().is_some_and(|u| !u.is_empty()) {
            Some(SourceKind::Url)
        } else if self.selected_text.as_deref().is_some_and(|t| !t.is_empty()) {
            Some(SourceKind::Text)
        } else {
            None
        }
    }

    /// Human-readable label for status messages and the tab title.
    pub fn display_title(&self) -> String {
        if let Some(title) = self.source_title.as_deref() {
            let trimmed = title.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }
        match (&self.target_url, &self.selected_text) {
            (Some(url), _) => readable_source_title(url, None),
            (None, Some(text)) => snippet_title(text),
            (None, None) => "Page".to_string(),
        }
    }
}

/// Display title for a text snippet: the first 77 characters followed by an
/// ellipsis when the snippet is longer. Character based, so multibyte text
/// never splits mid-codepoint.
pub fn snippet_title(text: &str) -> String {
    ellipsize(text.trim(), SNIPPET_TITLE_CHARS)
}

/// Shorten text to at most `max_chars` characters plus an ellipsis marker.
pub fn ellipsize(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars).collect();
        format!("{head}…")
    } else {
        text.to_string()
    }
}

/// Best-effort human-readable label for a source URL: an injected page title
/// when one was carried along, otherwise the host plus the trailing path
/// segment, otherwise the raw URL.
pub fn readable_source_title(url: &str, injected: Option<&str>) -> String {
    if let Some(title) = injected {
        let trimmed = title.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    match Url::parse(url) {
        Ok(parsed) => {
            let host = parsed
                .host_str()
                .unwrap_or("")
                .trim_start_matches("www.")
                .to_string();
            if host.is_empty() {
                return url.to_string();
            }
            let segment = parsed
                .path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
                .unwrap_or("");
            if segment.is_empty() {
                host
            } else {
                format!("{host} • {segment}")
            }
        }
        Err(_) => url.to_string(),
    }
}

#[cfg(test)]
#[path = "request_test.rs"]
mod request_test;
