//! The wait primitives gating every DOM-dependent step
//!
//! A wait resolves exactly once, to the matched element or to an absence
//! sentinel; it never errors. Absence is a normal outcome and each caller
//! decides whether it is fatal for that step. The page's mutation stream is
//! not observable from outside the page, so readiness is a condition poll:
//! an immediate check, bounded-interval re-checks, and a final check when
//! the deadline lands.

use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::page::{ElementProbe, PageDriver};

/// Wait for `selector` to match, up to `timeout`. Resolves immediately when
/// the element is already present. `None` is the absence sentinel.
pub async fn wait_for_element(
    page: &dyn PageDriver,
    selector: &str,
    timeout: Duration,
    poll: Duration,
) -> Option<ElementProbe> {
    if let Some(found) = page.query(selector).await {
        return Some(found);
    }

    let deadline = Instant::now() + timeout;
    loop {
        let now = Instant::now();
        if now >= deadline {
            // Last chance: the element may have landed with the deadline
            let found = page.query(selector).await;
            if found.is_none() {
                debug!(
                    "Element \"{}\" not found after {:?}, continuing",
                    selector, timeout
                );
            }
            return found;
        }
        tokio::time::sleep_until(std::cmp::min(now + poll, deadline)).await;
        if let Some(found) = page.query(selector).await {
            return Some(found);
        }
    }
}

/// Outcome of bracketing a transient element's lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketOutcome {
    /// Observed present at least once, then observed gone
    Completed,
    /// Never appeared within the appear window; treated as not applicable
    NeverAppeared,
    /// Appeared but was still present when the disappear window closed
    TimedOutWhileVisible,
}

/// Wait for `selector` to appear, then for it to go away again. Used to
/// bound "generation in progress" by its loading indicator instead of
/// guessing a fixed delay. Never raises; the outer workflow continues on
/// any outcome.
pub async fn wait_for_appearance_then_disappearance(
    page: &dyn PageDriver,
    selector: &str,
    appear_timeout: Duration,
    disappear_timeout: Duration,
    poll: Duration,
) -> BracketOutcome {
    if wait_for_element(page, selector, appear_timeout, poll)
        .await
        .is_none()
    {
        debug!("\"{}\" never appeared, nothing to bracket", selector);
        return BracketOutcome::NeverAppeared;
    }

    let deadline = Instant::now() + disappear_timeout;
    loop {
        if page.query(selector).await.is_none() {
            return BracketOutcome::Completed;
        }
        let now = Instant::now();
        if now >= deadline {
            debug!(
                "\"{}\" still present after {:?}, continuing",
                selector, disappear_timeout
            );
            return BracketOutcome::TimedOutWhileVisible;
        }
        tokio::time::sleep_until(std::cmp::min(now + poll, deadline)).await;
    }
}

#[cfg(test)]
#[path = "wait_test.rs"]
mod wait_test;
