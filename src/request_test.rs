// Unit tests for the summarization request payload

use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_snippet_title_truncates_long_selections() {
    let text = "a".repeat(120);
    let title = snippet_title(&text);
    assert_eq!(title.chars().count(), 78); // 77 chars + ellipsis
    assert!(title.ends_with('…'));
    assert_eq!(&title[..77], &text[..77]);
}

#[test]
fn test_snippet_title_keeps_short_selections_intact() {
    assert_eq!(snippet_title("short selection"), "short selection");
    let exactly_77 = "b".repeat(77);
    assert_eq!(snippet_title(&exactly_77), exactly_77);
}

#[test]
fn test_snippet_title_counts_characters_not_bytes() {
    let text = "é".repeat(100);
    let title = snippet_title(&text);
    assert_eq!(title.chars().count(), 78);
    assert!(title.starts_with('é'));
}

#[test]
fn test_text_request_truncates_title_but_not_value() {
    let text = "c".repeat(120);
    let request = SummarizationRequest::for_text(text.clone());
    assert_eq!(request.selected_text.as_deref(), Some(text.as_str()));
    assert_eq!(request.source_title.unwrap().chars().count(), 78);
}

#[test]
fn test_readable_title_prefers_injected_title() {
    assert_eq!(
        readable_source_title("https://example.com/articles/42", Some("  My Article  ")),
        "My Article"
    );
    // Blank injected titles are ignored
    assert_eq!(
        readable_source_title("https://example.com/", Some("   ")),
        "example.com"
    );
}

#[test]
fn test_readable_title_from_host_and_path() {
    assert_eq!(
        readable_source_title("https://www.example.com/articles/42", None),
        "example.com • 42"
    );
    assert_eq!(
        readable_source_title("https://example.com/", None),
        "example.com"
    );
    assert_eq!(
        readable_source_title("https://blog.rust-lang.org/2024/post.html", None),
        "blog.rust-lang.org • post.html"
    );
}

#[test]
fn test_readable_title_falls_back_to_raw_url() {
    assert_eq!(readable_source_title("not a url", None), "not a url");
}

#[test]
fn test_kind_url_wins_over_selection() {
    let mut request = SummarizationRequest::for_url("https://example.com", None);
    request.selected_text = Some("carried alongside".to_string());
    assert_eq!(request.kind(), Some(SourceKind::Url));
}

#[test]
fn test_kind_text_when_only_selection() {
    let request = SummarizationRequest::for_text("some selection");
    assert_eq!(request.kind(), Some(SourceKind::Text));
}

#[test]
fn test_kind_none_when_empty() {
    let request = SummarizationRequest {
        target_url: None,
        selected_text: None,
        source_title: None,
        created_at: chrono::Utc::now(),
    };
    assert_eq!(request.kind(), None);

    let blank = SummarizationRequest {
        target_url: Some(String::new()),
        selected_text: Some(String::new()),
        source_title: None,
        created_at: chrono::Utc::now(),
    };
    assert_eq!(blank.kind(), None);
}

#[test]
fn test_display_title_for_url_request() {
    let request = SummarizationRequest::for_url("https://example.com/articles/42", None);
    assert_eq!(request.display_title(), "example.com • 42");

    let titled =
        SummarizationRequest::for_url("https://example.com/articles/42", Some("Article".into()));
    assert_eq!(titled.display_title(), "Article");
}
