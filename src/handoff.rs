//! Cross-process payload handoff between the dispatcher and the sequencer
//!
//! The dispatcher stashes one [`SummarizationRequest`] on disk; the sequencer
//! reads it once and clears it at the step the workflow designates. A second
//! trigger can overwrite the stash before the first consumer reads it; that
//! race is tolerated, which is why `clear_if_url` only removes a payload
//! belonging to the URL just consumed.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::request::SummarizationRequest;

const HANDOFF_FILE: &str = "handoff.json";

/// File-backed single-slot store for the pending request
#[derive(Clone)]
pub struct HandoffStore {
    path: PathBuf,
}

impl HandoffStore {
    /// Store rooted at the given state directory
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        HandoffStore {
            path: state_dir.into().join(HANDOFF_FILE),
        }
    }

    /// Store rooted at the default state directory (`~/.sumpilot`)
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(crate::config::Preferences::state_dir()?))
    }

    /// Persist the request, replacing any previous stash.
    pub fn stash(&self, request: &SummarizationRequest) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(request)?;
        fs::write(&self.path, json).context("Failed to write handoff payload")?;
        debug!("Stashed handoff payload at {}", self.path.display());
        Ok(())
    }

    /// Read the stashed request without consuming it. Missing or corrupt
    /// files read as absent.
    pub fn peek(&self) -> Option<SummarizationRequest> {
        let json = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&json) {
            Ok(request) => Some(request),
            Err(e) => {
                warn!("Ignoring malformed handoff payload: {}", e);
                None
            }
        }
    }

    /// Remove the stash unconditionally. Best effort and idempotent.
    pub fn clear(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!("Cleared handoff payload"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to clear handoff payload: {}", e),
        }
    }

    /// Remove the stash only when it belongs to the given URL, so a payload
    /// written by a concurrent trigger is never clobbered.
    pub fn clear_if_url(&self, url: &str) {
        if let Some(existing) = self.peek() {
            if existing.target_url.as_deref() == Some(url) {
                self.clear();
            } else {
                debug!("Leaving handoff payload in place, URL does not match");
            }
        }
    }
}

#[cfg(test)]
#[path = "handoff_test.rs"]
mod handoff_test;
