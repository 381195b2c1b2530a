//! The sequencer: a state machine driving the import/prompt/generate
//! workflow against the live destination page
//!
//! Each state performs one step, gated on a wait resolution for the
//! element it depends on, and names its successor. Steps run strictly
//! sequentially; the only cancellation mechanism is a wait's own timeout.
//! Whether a timed-out wait is fatal is decided per call site: the controls
//! the import cannot proceed without hard-fail, the prompt-phase niceties
//! skip and continue.

pub mod selectors;
pub mod status;
pub mod wait;

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::config::{Preferences, Timings};
use crate::handoff::HandoffStore;
use crate::page::{self, ElementProbe, IconKind, PageDriver};
use crate::request::{ellipsize, readable_source_title, SourceKind, SummarizationRequest};
use status::{Phase, StatusSlot};

/// The workflow's states. `run` drives `advance` from `Idle` to `Done` or
/// `Failed`; no state is re-entered except `GeneratingSummary`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    AwaitingPayload,
    OpeningSourceMenu,
    SelectingSourceType,
    FillingField,
    Submitting,
    AwaitingPromptSurface,
    EnteringPrompt,
    GeneratingSummary { attempt: u32 },
    AwaitingGenerationIndicator,
    Done,
    Failed,
}

impl WorkflowState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowState::Done | WorkflowState::Failed)
    }
}

pub struct Sequencer {
    page: Arc<dyn PageDriver>,
    store: HandoffStore,
    prefs: Preferences,
    timings: Timings,
    status: StatusSlot,
    request: Option<SummarizationRequest>,
    kind: Option<SourceKind>,
    source_label: String,
    baseline_heading: Option<String>,
}

impl Sequencer {
    pub fn new(
        page: Arc<dyn PageDriver>,
        store: HandoffStore,
        prefs: Preferences,
        timings: Timings,
    ) -> Self {
        let status = StatusSlot::new(Arc::clone(&page));
        Sequencer {
            page,
            store,
            prefs,
            timings,
            status,
            request: None,
            kind: None,
            source_label: String::new(),
            baseline_heading: None,
        }
    }

    /// Drive the workflow to a terminal state. Any error inside a step is
    /// caught here: logged, surfaced through the status indicator, and the
    /// page left in whatever partial state it reached.
    pub async fn run(mut self) -> WorkflowState {
        info!("Sequencer starting");
        let mut state = WorkflowState::Idle;
        loop {
            if state.is_terminal() {
                info!("Sequencer finished: {:?}", state);
                return state;
            }
            debug!("Entering state {:?}", state);
            state = match self.advance(state).await {
                Ok(next) => next,
                Err(e) => {
                    error!("Workflow failed in {:?}: {:#}", state, e);
                    self.status
                        .set("An error occurred. Please try again.", IconKind::Error)
                        .await;
                    self.set_phase(Phase::Error).await;
                    self.status.release_after(self.timings.error_linger).await;
                    WorkflowState::Failed
                }
            };
        }
    }

    /// One transition: perform the state's step and name its successor.
    async fn advance(&mut self, state: WorkflowState) -> Result<WorkflowState> {
        match state {
            WorkflowState::Idle => {
                self.status
                    .set("Starting summarization…", IconKind::Spinner)
                    .await;
                Ok(WorkflowState::AwaitingPayload)
            }

            WorkflowState::AwaitingPayload => match self.resolve_payload().await {
                Some((request, kind)) => {
                    self.source_label = match kind {
                        SourceKind::Url => readable_source_title(
                            request.target_url.as_deref().unwrap_or_default(),
                            request.source_title.as_deref(),
                        ),
                        SourceKind::Text => request.display_title(),
                    };
                    self.request = Some(request);
                    self.kind = Some(kind);
                    self.set_phase(Phase::Loading).await;
                    Ok(WorkflowState::OpeningSourceMenu)
                }
                None => {
                    error!("No source found for summarization, aborting");
                    self.status
                        .set("Error: no source found. Please try again.", IconKind::Error)
                        .await;
                    self.set_phase(Phase::Error).await;
                    self.status.release_after(self.timings.error_linger).await;
                    Ok(WorkflowState::Failed)
                }
            },

            WorkflowState::OpeningSourceMenu => {
                self.status
                    .set("Opening the add-source menu…", IconKind::Spinner)
                    .await;
                self.require(selectors::ADD_SOURCE_BUTTON).await?;
                self.page.click(selectors::ADD_SOURCE_BUTTON).await?;
                Ok(WorkflowState::SelectingSourceType)
            }

            WorkflowState::SelectingSourceType => {
                let (chip, message) = match self.kind()? {
                    SourceKind::Url => (selectors::WEBSITE_CHIP, "Selecting the website option…"),
                    SourceKind::Text => (selectors::TEXT_CHIP, "Selecting the text option…"),
                };
                self.status.set(message, IconKind::Spinner).await;
                self.require(chip).await?;
                self.page.click(chip).await?;
                Ok(WorkflowState::FillingField)
            }

            WorkflowState::FillingField => {
                match self.kind()? {
                    SourceKind::Url => {
                        let url = self.request()?.target_url.clone().unwrap_or_default();
                        self.status
                            .set(
                                &format!("Adding URL: {}", ellipsize(&url, 30)),
                                IconKind::Spinner,
                            )
                            .await;
                        self.require(selectors::URL_INPUT).await?;
                        self.page.set_value(selectors::URL_INPUT, &url).await?;
                    }
                    SourceKind::Text => {
                        let text = self.request()?.selected_text.clone().unwrap_or_default();
                        self.status
                            .set("Pasting selected text…", IconKind::Spinner)
                            .await;
                        self.require(selectors::TEXT_INPUT).await?;
                        self.page.set_value(selectors::TEXT_INPUT, &text).await?;
                    }
                }
                self.status.set("Importing source…", IconKind::Spinner).await;
                self.set_phase(Phase::Importing).await;
                Ok(WorkflowState::Submitting)
            }

            WorkflowState::Submitting => {
                let submit = match self.kind()? {
                    SourceKind::Url => selectors::IMPORT_SUBMIT,
                    SourceKind::Text => selectors::TEXT_IMPORT_SUBMIT,
                };
                self.require(submit).await?;
                self.page.click(submit).await?;

                // The stash has served its purpose. For a URL import only a
                // matching payload is removed, so a concurrently-triggered
                // request is never clobbered.
                match self.kind()? {
                    SourceKind::Url => {
                        if let Some(url) = self.request()?.target_url.clone() {
                            self.store.clear_if_url(&url);
                        }
                    }
                    SourceKind::Text => self.store.clear(),
                }
                Ok(WorkflowState::AwaitingPromptSurface)
            }

            WorkflowState::AwaitingPromptSurface => {
                self.status
                    .set("Waiting for the notebook to load…", IconKind::Spinner)
                    .await;
                self.require(selectors::PROMPT_INPUT).await?;

                let existing = self
                    .page
                    .value_of(selectors::PROMPT_INPUT)
                    .await?
                    .unwrap_or_default();
                if !existing.is_empty() {
                    // A reload resumed mid-flow; the source is already in.
                    // Entering the prompt again would double-submit.
                    info!("Prompt box already populated, skipping prompt entry");
                    return Ok(self.succeed("Source imported successfully!").await);
                }
                Ok(WorkflowState::EnteringPrompt)
            }

            WorkflowState::EnteringPrompt => {
                self.baseline_heading = self
                    .page
                    .text_of(selectors::NOTEBOOK_TITLE)
                    .await
                    .unwrap_or(None);

                let prompt = self.prefs.prompt_text.clone();
                self.status
                    .set(&format!("Entering \"{}\" prompt…", prompt), IconKind::Spinner)
                    .await;
                self.page.set_value(selectors::PROMPT_INPUT, &prompt).await?;

                if self.wait(selectors::PROMPT_SUBMIT).await.is_none() {
                    debug!("Prompt submit control not actionable yet, continuing");
                }

                // The host renames the notebook once the import registers;
                // generation should not start before that.
                if let Some(baseline) = self.baseline_heading.clone() {
                    self.await_heading_change(&baseline).await;
                }
                if let Ok(Some(heading)) = self.page.text_of(selectors::NOTEBOOK_TITLE).await {
                    let heading = heading.trim().to_string();
                    if !heading.is_empty() {
                        self.source_label = heading;
                    }
                }

                self.status.set("Generating summary…", IconKind::Spinner).await;
                self.set_phase(Phase::Generating).await;
                Ok(WorkflowState::GeneratingSummary { attempt: 0 })
            }

            WorkflowState::GeneratingSummary { attempt } => {
                // The host clears the prompt box only once it has accepted
                // the submission; the control can look enabled before it is
                // truly actionable, hence the repeated attempts.
                let pending = self
                    .page
                    .value_of(selectors::PROMPT_INPUT)
                    .await?
                    .unwrap_or_default();
                if pending.is_empty() {
                    return Ok(WorkflowState::AwaitingGenerationIndicator);
                }
                if attempt >= self.timings.submit_attempt_ceiling {
                    warn!(
                        "Prompt box never cleared after {} submit attempts, moving on",
                        attempt
                    );
                    return Ok(WorkflowState::AwaitingGenerationIndicator);
                }

                match self.wait(selectors::PROMPT_SUBMIT).await {
                    Some(_) => self.page.click(selectors::PROMPT_SUBMIT).await?,
                    None => debug!("Submit control missing on attempt {}, skipping", attempt + 1),
                }
                tokio::time::sleep(self.timings.submit_retry_delay).await;
                Ok(WorkflowState::GeneratingSummary { attempt: attempt + 1 })
            }

            WorkflowState::AwaitingGenerationIndicator => {
                // Bracket the in-progress indicator so success is not
                // reported while generation is still running.
                let outcome = wait::wait_for_appearance_then_disappearance(
                    self.page.as_ref(),
                    selectors::GENERATION_INDICATOR,
                    self.timings.generation_appear_timeout,
                    self.timings.generation_disappear_timeout,
                    self.timings.poll_interval,
                )
                .await;
                debug!("Generation indicator bracket: {:?}", outcome);
                Ok(self.succeed("Summary generated successfully!").await)
            }

            WorkflowState::Done | WorkflowState::Failed => Ok(state),
        }
    }

    /// Prefer the same-process injected globals over the persisted store,
    /// so a freshly-opened page can never read a stale stash meant for a
    /// different load.
    async fn resolve_payload(&self) -> Option<(SummarizationRequest, SourceKind)> {
        let request = if let Some(url) = self.page.injected_global(page::GLOBAL_URL).await {
            let title = self.page.injected_global(page::GLOBAL_SOURCE_TITLE).await;
            debug!("Using injected handoff globals");
            SummarizationRequest::for_url(url, title)
        } else {
            self.store.peek()?
        };
        let kind = request.kind()?;
        Some((request, kind))
    }

    /// Wait with the default step timeout.
    async fn wait(&self, selector: &str) -> Option<ElementProbe> {
        wait::wait_for_element(
            self.page.as_ref(),
            selector,
            self.timings.step_timeout,
            self.timings.poll_interval,
        )
        .await
    }

    /// Wait for an element the workflow cannot proceed without.
    async fn require(&self, selector: &str) -> Result<ElementProbe> {
        self.wait(selector)
            .await
            .with_context(|| format!("Required element never appeared: {}", selector))
    }

    /// Bounded wait for the notebook heading to move off its baseline;
    /// proceeds regardless when it never does.
    async fn await_heading_change(&self, baseline: &str) {
        let deadline = Instant::now() + self.timings.heading_change_timeout;
        loop {
            if let Ok(Some(text)) = self.page.text_of(selectors::NOTEBOOK_TITLE).await {
                if text != baseline {
                    return;
                }
            }
            let now = Instant::now();
            if now >= deadline {
                debug!("Notebook heading unchanged, continuing");
                return;
            }
            tokio::time::sleep_until(std::cmp::min(now + self.timings.poll_interval, deadline))
                .await;
        }
    }

    async fn set_phase(&mut self, phase: Phase) {
        let title = status::phase_title(phase, &self.source_label);
        if let Err(e) = self.page.set_title(&title).await {
            debug!("Could not update page title: {}", e);
        }
    }

    async fn succeed(&mut self, message: &str) -> WorkflowState {
        self.status.set(message, IconKind::Success).await;
        self.set_phase(Phase::Success).await;
        self.status.release_after(self.timings.success_linger).await;
        WorkflowState::Done
    }

    fn request(&self) -> Result<&SummarizationRequest> {
        self.request.as_ref().context("No request resolved yet")
    }

    fn kind(&self) -> Result<SourceKind> {
        self.kind.context("No source kind resolved yet")
    }
}

#[cfg(test)]
#[path = "sequencer_test.rs"]
mod sequencer_test;
