//! Status indicator and tab-title side channel
//!
//! At most one status indicator is live per page. [`StatusSlot`] owns that
//! single slot: acquire-or-update via `set`, idempotent release.

use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::page::{IconKind, PageDriver};
use crate::sequencer::selectors;

/// Coarse workflow phase reflected into the tab title
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Importing,
    Generating,
    Success,
    Error,
}

impl Phase {
    fn glyph(&self) -> &'static str {
        match self {
            Phase::Loading | Phase::Importing => "⏳",
            Phase::Generating => "✨",
            Phase::Success => "✅",
            Phase::Error => "⚠️",
        }
    }
}

/// Tab title for a phase. The brand suffix stays last so multiple tabs
/// group by source.
pub fn phase_title(phase: Phase, source_label: &str) -> String {
    let label = if source_label.trim().is_empty() {
        "Page"
    } else {
        source_label
    };
    format!("{} {} – {}", phase.glyph(), label, selectors::TITLE_SUFFIX)
}

/// Single-slot owner of the page's status indicator
pub struct StatusSlot {
    page: Arc<dyn PageDriver>,
    live: bool,
}

impl StatusSlot {
    pub fn new(page: Arc<dyn PageDriver>) -> Self {
        StatusSlot { page, live: false }
    }

    /// Show the indicator, or update it in place when already live.
    /// Presentation failures are logged, never fatal.
    pub async fn set(&mut self, message: &str, icon: IconKind) {
        if let Err(e) = self.page.show_status(message, icon).await {
            warn!("Could not render status indicator: {}", e);
            return;
        }
        self.live = true;
    }

    /// Remove the indicator immediately. Idempotent.
    pub async fn release_now(&mut self) {
        if !self.live {
            return;
        }
        if let Err(e) = self.page.clear_status().await {
            warn!("Could not remove status indicator: {}", e);
        }
        self.live = false;
    }

    /// Leave the indicator visible for `delay`, then remove it. Idempotent.
    pub async fn release_after(&mut self, delay: Duration) {
        if !self.live {
            return;
        }
        tokio::time::sleep(delay).await;
        self.release_now().await;
    }
}

#[cfg(test)]
#[path = "status_test.rs"]
mod status_test;
