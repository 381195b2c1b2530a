// Unit tests for the wait primitives, run against the scripted fake page
// with a paused clock so timing assertions are exact.

use super::*;
use crate::page::fake::FakePage;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_millis(1000);
const POLL: Duration = Duration::from_millis(50);

#[tokio::test(start_paused = true)]
async fn test_present_element_resolves_immediately() {
    let page = FakePage::new();
    page.insert("button.go");

    let start = Instant::now();
    let found = wait_for_element(page.as_ref(), "button.go", TIMEOUT, POLL).await;

    assert_eq!(found.unwrap().selector, "button.go");
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_absent_element_resolves_to_sentinel_at_timeout() {
    let page = FakePage::new();

    let start = Instant::now();
    let found = wait_for_element(page.as_ref(), ".never", TIMEOUT, POLL).await;

    assert!(found.is_none());
    // No earlier than the timeout, no later than one poll interval past it
    assert!(start.elapsed() >= TIMEOUT);
    assert!(start.elapsed() <= TIMEOUT + POLL);
}

#[tokio::test(start_paused = true)]
async fn test_element_inserted_mid_wait_is_found() {
    let page = FakePage::new();
    FakePage::insert_later(&page, ".late", Duration::from_millis(300));

    let start = Instant::now();
    let found = wait_for_element(page.as_ref(), ".late", TIMEOUT, POLL).await;

    assert!(found.is_some());
    assert!(start.elapsed() >= Duration::from_millis(300));
    assert!(start.elapsed() < TIMEOUT);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_shorter_than_poll_interval() {
    let page = FakePage::new();

    let start = Instant::now();
    let found = wait_for_element(page.as_ref(), ".never", Duration::from_millis(10), POLL).await;

    assert!(found.is_none());
    assert!(start.elapsed() >= Duration::from_millis(10));
    assert!(start.elapsed() <= Duration::from_millis(10) + POLL);
}

#[tokio::test(start_paused = true)]
async fn test_bracket_completes_when_indicator_comes_and_goes() {
    let page = FakePage::new();
    FakePage::insert_later(&page, ".loading", Duration::from_millis(200));
    FakePage::remove_later(&page, ".loading", Duration::from_millis(600));

    let outcome = wait_for_appearance_then_disappearance(
        page.as_ref(),
        ".loading",
        TIMEOUT,
        Duration::from_millis(2000),
        POLL,
    )
    .await;

    assert_eq!(outcome, BracketOutcome::Completed);
}

#[tokio::test(start_paused = true)]
async fn test_bracket_never_appeared_is_not_an_error() {
    let page = FakePage::new();

    let start = Instant::now();
    let outcome = wait_for_appearance_then_disappearance(
        page.as_ref(),
        ".loading",
        TIMEOUT,
        Duration::from_millis(2000),
        POLL,
    )
    .await;

    assert_eq!(outcome, BracketOutcome::NeverAppeared);
    // Only the appear window was spent
    assert!(start.elapsed() >= TIMEOUT);
    assert!(start.elapsed() < TIMEOUT + Duration::from_millis(500));
}

#[tokio::test(start_paused = true)]
async fn test_bracket_times_out_while_still_visible() {
    let page = FakePage::new();
    page.insert(".loading");

    let outcome = wait_for_appearance_then_disappearance(
        page.as_ref(),
        ".loading",
        TIMEOUT,
        Duration::from_millis(800),
        POLL,
    )
    .await;

    assert_eq!(outcome, BracketOutcome::TimedOutWhileVisible);
}

#[tokio::test(start_paused = true)]
async fn test_bracket_element_already_present_then_removed() {
    let page = FakePage::new();
    page.insert(".loading");
    FakePage::remove_later(&page, ".loading", Duration::from_millis(150));

    let outcome = wait_for_appearance_then_disappearance(
        page.as_ref(),
        ".loading",
        TIMEOUT,
        Duration::from_millis(2000),
        POLL,
    )
    .await;

    assert_eq!(outcome, BracketOutcome::Completed);
}
