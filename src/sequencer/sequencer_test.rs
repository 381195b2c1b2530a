// Workflow state machine tests against the scripted fake page

use super::*;
use crate::page::fake::{FakeElement, FakePage};
use pretty_assertions::assert_eq;
use std::time::Duration;

fn test_timings() -> Timings {
    Timings {
        step_timeout: Duration::from_millis(200),
        poll_interval: Duration::from_millis(10),
        submit_retry_delay: Duration::from_millis(10),
        heading_change_timeout: Duration::from_millis(50),
        submit_attempt_ceiling: 3,
        generation_appear_timeout: Duration::from_millis(100),
        generation_disappear_timeout: Duration::from_millis(300),
        success_linger: Duration::from_millis(10),
        error_linger: Duration::from_millis(10),
        page_load_timeout: Duration::from_millis(500),
    }
}

fn store_in(dir: &tempfile::TempDir) -> HandoffStore {
    HandoffStore::new(dir.path())
}

/// Seed the page with everything the URL import path interacts with
fn seed_url_page(page: &FakePage) {
    page.insert(selectors::ADD_SOURCE_BUTTON);
    page.insert(selectors::WEBSITE_CHIP);
    page.insert(selectors::URL_INPUT);
    page.insert(selectors::IMPORT_SUBMIT);
    page.insert(selectors::PROMPT_INPUT);
    page.insert_with(
        selectors::NOTEBOOK_TITLE,
        FakeElement {
            text: "Untitled notebook".to_string(),
            ..FakeElement::default()
        },
    );
}

fn sequencer(page: &std::sync::Arc<FakePage>, store: HandoffStore) -> Sequencer {
    Sequencer::new(
        page.clone(),
        store,
        Preferences::default(),
        test_timings(),
    )
}

#[tokio::test(start_paused = true)]
async fn test_url_workflow_runs_to_done() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    let page = FakePage::new();
    seed_url_page(&page);
    // The host accepts the prompt on the second submit click
    page.clear_value_after_clicks(selectors::PROMPT_SUBMIT, selectors::PROMPT_INPUT, 2);
    // Generation indicator comes and goes
    FakePage::insert_later(&page, selectors::GENERATION_INDICATOR, Duration::from_millis(30));
    FakePage::remove_later(&page, selectors::GENERATION_INDICATOR, Duration::from_millis(120));

    let url = "https://example.com/articles/42";
    store
        .stash(&SummarizationRequest::for_url(url, None))
        .unwrap();

    let state = sequencer(&page, store_in(&dir)).run().await;
    assert_eq!(state, WorkflowState::Done);

    // The URL path clicked its own controls and never the text path's
    assert_eq!(page.click_count(selectors::ADD_SOURCE_BUTTON), 1);
    assert_eq!(page.click_count(selectors::WEBSITE_CHIP), 1);
    assert_eq!(page.click_count(selectors::TEXT_CHIP), 0);
    assert!(page.value(selectors::TEXT_INPUT).is_none());

    // Full URL submitted, prompt entered with the default preference
    assert_eq!(page.value(selectors::URL_INPUT).as_deref(), Some(url));
    assert_eq!(page.value(selectors::PROMPT_INPUT).as_deref(), Some(""));

    // Consumed payload cleared, since it matched the submitted URL
    assert!(store_in(&dir).peek().is_none());

    // Final observable state: success toast and success title
    let log = page.status_log.lock().unwrap().clone();
    assert_eq!(log.last().unwrap().1, IconKind::Success);
    let titles = page.titles.lock().unwrap().clone();
    assert!(titles.last().unwrap().starts_with("✅"));
    assert_eq!(*page.status_clears.lock().unwrap(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_injected_globals_win_over_stashed_payload() {
    let dir = tempfile::tempdir().unwrap();
    let page = FakePage::new();
    seed_url_page(&page);
    page.clear_value_after_clicks(selectors::PROMPT_SUBMIT, selectors::PROMPT_INPUT, 2);

    page.set_global(crate::page::GLOBAL_URL, "https://injected.example/a");
    page.set_global(crate::page::GLOBAL_SOURCE_TITLE, "Injected Page");

    // A different, concurrently-stashed payload sits in the store
    let other = SummarizationRequest::for_url("https://other.example/b", None);
    store_in(&dir).stash(&other).unwrap();

    let state = sequencer(&page, store_in(&dir)).run().await;
    assert_eq!(state, WorkflowState::Done);

    assert_eq!(
        page.value(selectors::URL_INPUT).as_deref(),
        Some("https://injected.example/a")
    );
    // The foreign payload was not clobbered by cleanup
    assert_eq!(store_in(&dir).peek(), Some(other));
}

#[tokio::test(start_paused = true)]
async fn test_text_workflow_submits_full_snippet() {
    let dir = tempfile::tempdir().unwrap();
    let page = FakePage::new();
    page.insert(selectors::ADD_SOURCE_BUTTON);
    page.insert(selectors::TEXT_CHIP);
    page.insert(selectors::TEXT_INPUT);
    page.insert(selectors::TEXT_IMPORT_SUBMIT);
    page.insert(selectors::PROMPT_INPUT);
    page.insert(selectors::PROMPT_SUBMIT);
    page.clear_value_after_clicks(selectors::PROMPT_SUBMIT, selectors::PROMPT_INPUT, 1);

    let snippet = "x".repeat(120);
    store_in(&dir)
        .stash(&SummarizationRequest::for_text(snippet.clone()))
        .unwrap();

    let state = sequencer(&page, store_in(&dir)).run().await;
    assert_eq!(state, WorkflowState::Done);

    // The submitted value is the intact 120-character snippet
    assert_eq!(page.value(selectors::TEXT_INPUT).as_deref(), Some(snippet.as_str()));
    assert_eq!(page.click_count(selectors::TEXT_CHIP), 1);
    assert_eq!(page.click_count(selectors::TEXT_IMPORT_SUBMIT), 1);
    assert_eq!(page.click_count(selectors::WEBSITE_CHIP), 0);
    assert!(page.value(selectors::URL_INPUT).is_none());

    // The text path clears its payload unconditionally
    assert!(store_in(&dir).peek().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_prepopulated_prompt_takes_already_imported_branch() {
    let dir = tempfile::tempdir().unwrap();
    let page = FakePage::new();
    seed_url_page(&page);
    page.insert_with(
        selectors::PROMPT_INPUT,
        FakeElement {
            value: "TL;DR".to_string(),
            ..FakeElement::default()
        },
    );

    store_in(&dir)
        .stash(&SummarizationRequest::for_url("https://example.com/a", None))
        .unwrap();

    let state = sequencer(&page, store_in(&dir)).run().await;
    assert_eq!(state, WorkflowState::Done);

    // No prompt entry, no submit loop: the only submit click was the import
    assert_eq!(page.value(selectors::PROMPT_INPUT).as_deref(), Some("TL;DR"));
    assert_eq!(page.click_count(selectors::PROMPT_SUBMIT), 1);

    let log = page.status_log.lock().unwrap().clone();
    let last = log.last().unwrap();
    assert_eq!(last.0, "Source imported successfully!");
    assert_eq!(last.1, IconKind::Success);
}

#[tokio::test(start_paused = true)]
async fn test_submit_loop_stops_at_attempt_ceiling() {
    let dir = tempfile::tempdir().unwrap();
    let page = FakePage::new();
    seed_url_page(&page);
    // No clear rule: the prompt box never empties

    store_in(&dir)
        .stash(&SummarizationRequest::for_url("https://example.com/a", None))
        .unwrap();

    let state = sequencer(&page, store_in(&dir)).run().await;

    // The loop exits at the ceiling without an error and the workflow
    // still brackets the (absent) generation indicator and succeeds
    assert_eq!(state, WorkflowState::Done);
    // One import click plus exactly `submit_attempt_ceiling` loop clicks
    assert_eq!(
        page.click_count(selectors::PROMPT_SUBMIT),
        1 + test_timings().submit_attempt_ceiling as usize
    );
    assert_eq!(page.value(selectors::PROMPT_INPUT).as_deref(), Some("TL;DR"));
}

#[tokio::test(start_paused = true)]
async fn test_missing_add_source_button_fails_workflow() {
    let dir = tempfile::tempdir().unwrap();
    let page = FakePage::new();
    // Page renders nothing the workflow needs

    store_in(&dir)
        .stash(&SummarizationRequest::for_url("https://example.com/a", None))
        .unwrap();

    let state = sequencer(&page, store_in(&dir)).run().await;
    assert_eq!(state, WorkflowState::Failed);

    assert!(page.clicks.lock().unwrap().is_empty());
    let log = page.status_log.lock().unwrap().clone();
    assert_eq!(log.last().unwrap().1, IconKind::Error);
    let titles = page.titles.lock().unwrap().clone();
    assert!(titles.last().unwrap().starts_with("⚠️"));
    // The indicator was removed after its linger
    assert_eq!(*page.status_clears.lock().unwrap(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_missing_payload_fails_before_touching_the_page() {
    let dir = tempfile::tempdir().unwrap();
    let page = FakePage::new();
    seed_url_page(&page);

    let state = sequencer(&page, store_in(&dir)).run().await;
    assert_eq!(state, WorkflowState::Failed);
    assert!(page.clicks.lock().unwrap().is_empty());

    let log = page.status_log.lock().unwrap().clone();
    assert_eq!(log.last().unwrap().1, IconKind::Error);
}

#[tokio::test(start_paused = true)]
async fn test_notebook_heading_becomes_the_title_label() {
    let dir = tempfile::tempdir().unwrap();
    let page = FakePage::new();
    seed_url_page(&page);
    page.clear_value_after_clicks(selectors::PROMPT_SUBMIT, selectors::PROMPT_INPUT, 2);
    page.set_text(selectors::NOTEBOOK_TITLE, "Rust in Practice");

    store_in(&dir)
        .stash(&SummarizationRequest::for_url("https://example.com/a", None))
        .unwrap();

    let state = sequencer(&page, store_in(&dir)).run().await;
    assert_eq!(state, WorkflowState::Done);

    let titles = page.titles.lock().unwrap().clone();
    assert!(titles
        .iter()
        .any(|t| t.contains("Rust in Practice") && t.starts_with("✨")));
}
