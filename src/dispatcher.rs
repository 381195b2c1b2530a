//! Trigger intake and destination launch
//!
//! The dispatcher turns a user trigger into a [`SummarizationRequest`],
//! stashes it for the sequencer, opens the destination in a fresh tab,
//! waits for the first complete load there, injects the same-process
//! handoff globals, and hands control to the sequencer.

use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::browser::{Browser, BrowserType};
use crate::config::{Preferences, Timings};
use crate::handoff::HandoffStore;
use crate::page::WebDriverPage;
use crate::request::SummarizationRequest;
use crate::sequencer::{Sequencer, WorkflowState};

/// The user gestures that can start a run
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    /// Toolbar-button style trigger on the current page
    Toolbar {
        url: Option<String>,
        title: Option<String>,
    },
    /// Context-menu style trigger, possibly on a link or a selection
    Menu {
        link_url: Option<String>,
        page_url: Option<String>,
        selection: Option<String>,
    },
}

impl Trigger {
    /// Resolve the trigger into a request, or `None` when it carries
    /// nothing usable. A link URL beats the page URL; a selection rides
    /// along with whichever URL wins, or stands alone as a text source.
    pub fn resolve(&self) -> Option<SummarizationRequest> {
        match self {
            Trigger::Toolbar { url, title } => {
                let url = url.as_deref().filter(|u| permitted_url(u))?;
                Some(SummarizationRequest::for_url(url, title.clone()))
            }
            Trigger::Menu {
                link_url,
                page_url,
                selection,
            } => {
                let url = link_url
                    .as_deref()
                    .or(page_url.as_deref())
                    .filter(|u| permitted_url(u));
                match (url, selection.as_deref().filter(|s| !s.trim().is_empty())) {
                    (Some(url), selection) => {
                        let mut request = SummarizationRequest::for_url(url, None);
                        request.selected_text = selection.map(str::to_string);
                        Some(request)
                    }
                    (None, Some(text)) => Some(SummarizationRequest::for_text(text)),
                    (None, None) => None,
                }
            }
        }
    }
}

/// Only ordinary web pages are summarizable; browser-internal and local
/// schemes are filtered out.
pub fn permitted_url(url: &str) -> bool {
    match url::Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Launch parameters for the destination session
#[derive(Debug, Clone)]
pub struct DispatchOptions {
    pub browser: BrowserType,
    pub headless: bool,
    pub destination: String,
}

/// Drives one trigger end to end
pub struct Dispatcher {
    store: HandoffStore,
    prefs: Preferences,
    timings: Timings,
    options: DispatchOptions,
}

impl Dispatcher {
    pub fn new(
        store: HandoffStore,
        prefs: Preferences,
        timings: Timings,
        options: DispatchOptions,
    ) -> Self {
        Dispatcher {
            store,
            prefs,
            timings,
            options,
        }
    }

    /// Handle a trigger. Failures are logged and reported, never panicked:
    /// a bad trigger must not take anything else down with it.
    pub async fn dispatch(&self, trigger: Trigger) -> Result<WorkflowState> {
        match self.launch(trigger).await {
            Ok(state) => Ok(state),
            Err(e) => {
                error!("Dispatch failed: {:#}", e);
                Err(e)
            }
        }
    }

    async fn launch(&self, trigger: Trigger) -> Result<WorkflowState> {
        let Some(request) = trigger.resolve() else {
            warn!("Trigger carried no usable source, nothing to do");
            anyhow::bail!("Invalid trigger: no permitted URL or selection");
        };
        info!("Dispatching {}", request.display_title());

        self.store.stash(&request)?;

        let browser = Browser::new(self.options.browser, self.options.headless).await?;
        browser.open_tab().await?;
        browser.goto(&self.options.destination).await?;
        browser
            .wait_for_first_complete_load(&self.options.destination, &self.timings)
            .await?;
        browser.inject_handoff(&request).await?;
        if !self.prefs.open_in_background {
            browser.focus().await;
        }

        let page = Arc::new(WebDriverPage::new(browser.client()));
        let sequencer = Sequencer::new(
            page,
            self.store.clone(),
            self.prefs.clone(),
            self.timings.clone(),
        );
        Ok(sequencer.run().await)
    }
}

#[cfg(test)]
#[path = "dispatcher_test.rs"]
mod dispatcher_test;
