// Unit tests for the handoff store

use super::*;
use crate::request::SummarizationRequest;
use pretty_assertions::assert_eq;

#[test]
fn test_stash_and_peek() {
    let dir = tempfile::tempdir().unwrap();
    let store = HandoffStore::new(dir.path());

    let request = SummarizationRequest::for_url("https://example.com/articles/42", None);
    store.stash(&request).unwrap();

    let read = store.peek().expect("payload should be readable");
    assert_eq!(read, request);

    // Peek does not consume
    assert!(store.peek().is_some());
}

#[test]
fn test_peek_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = HandoffStore::new(dir.path());
    assert!(store.peek().is_none());
}

#[test]
fn test_peek_malformed_payload() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("handoff.json"), "garbage").unwrap();
    let store = HandoffStore::new(dir.path());
    assert!(store.peek().is_none());
}

#[test]
fn test_clear_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = HandoffStore::new(dir.path());
    store.clear();
    store.clear();

    store
        .stash(&SummarizationRequest::for_text("snippet"))
        .unwrap();
    store.clear();
    assert!(store.peek().is_none());
    store.clear();
}

#[test]
fn test_clear_if_url_removes_matching_payload() {
    let dir = tempfile::tempdir().unwrap();
    let store = HandoffStore::new(dir.path());

    let request = SummarizationRequest::for_url("https://example.com/a", None);
    store.stash(&request).unwrap();
    store.clear_if_url("https://example.com/a");
    assert!(store.peek().is_none());
}

#[test]
fn test_clear_if_url_keeps_foreign_payload() {
    let dir = tempfile::tempdir().unwrap();
    let store = HandoffStore::new(dir.path());

    // A second trigger overwrote the stash before the first consumer cleared it
    let other = SummarizationRequest::for_url("https://other.example/b", None);
    store.stash(&other).unwrap();
    store.clear_if_url("https://example.com/a");
    assert_eq!(store.peek(), Some(other));
}

#[test]
fn test_stash_replaces_previous_payload() {
    let dir = tempfile::tempdir().unwrap();
    let store = HandoffStore::new(dir.path());

    store
        .stash(&SummarizationRequest::for_url("https://example.com/1", None))
        .unwrap();
    let second = SummarizationRequest::for_url("https://example.com/2", None);
    store.stash(&second).unwrap();
    assert_eq!(store.peek(), Some(second));
}
