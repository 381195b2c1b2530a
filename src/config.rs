//! Timing constants and persisted user preferences

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

/// Every fixed delay and ceiling used by the workflow, gathered in one place
/// so tests can shrink them and nothing hardcodes a literal at a call site.
#[derive(Debug, Clone)]
pub struct Timings {
    /// Default wait for any selector-gated step
    pub step_timeout: Duration,
    /// Interval between presence checks while waiting
    pub poll_interval: Duration,
    /// Pause between submit attempts in the submit-until-cleared loop
    pub submit_retry_delay: Duration,
    /// Bounded wait for the notebook heading to change after import
    pub heading_change_timeout: Duration,
    /// Ceiling on submit attempts before giving up on the loop
    pub submit_attempt_ceiling: u32,
    /// Wait for the generation indicator to first appear
    pub generation_appear_timeout: Duration,
    /// Wait for the generation indicator to go away again
    pub generation_disappear_timeout: Duration,
    /// How long the status indicator lingers after success
    pub success_linger: Duration,
    /// How long the status indicator lingers after an error
    pub error_linger: Duration,
    /// Wait for the destination tab's first complete load
    pub page_load_timeout: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Timings {
            step_timeout: Duration::from_millis(10_000),
            poll_interval: Duration::from_millis(100),
            submit_retry_delay: Duration::from_millis(500),
            heading_change_timeout: Duration::from_millis(3_000),
            submit_attempt_ceiling: 20,
            generation_appear_timeout: Duration::from_millis(60_000),
            generation_disappear_timeout: Duration::from_millis(300_000),
            success_linger: Duration::from_millis(2_000),
            error_linger: Duration::from_millis(5_000),
            page_load_timeout: Duration::from_millis(30_000),
        }
    }
}

/// User preferences persisted between runs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Preferences {
    /// Prompt text entered into the query box after import
    #[serde(default = "default_prompt_text")]
    pub prompt_text: String,
    /// Whether the destination tab is opened without taking focus
    #[serde(default)]
    pub open_in_background: bool,
}

fn default_prompt_text() -> String {
    "TL;DR".to_string()
}

impl Default for Preferences {
    fn default() -> Self {
        Preferences {
            prompt_text: default_prompt_text(),
            open_in_background: false,
        }
    }
}

impl Preferences {
    /// Directory holding all persisted state (`~/.sumpilot`)
    pub fn state_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Unable to determine home directory")?;
        Ok(home.join(".sumpilot"))
    }

    fn prefs_path(dir: &std::path::Path) -> PathBuf {
        dir.join("preferences.json")
    }

    /// Load preferences from the given state directory, falling back to
    /// defaults when the file is missing or unreadable.
    pub fn load_from(dir: &std::path::Path) -> Preferences {
        let path = Self::prefs_path(dir);
        match fs::read_to_string(&path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(prefs) => prefs,
                Err(e) => {
                    warn!("Ignoring malformed preferences at {}: {}", path.display(), e);
                    Preferences::default()
                }
            },
            Err(_) => {
                debug!("No preferences file at {}, using defaults", path.display());
                Preferences::default()
            }
        }
    }

    /// Load preferences from the default state directory.
    pub fn load() -> Result<Preferences> {
        Ok(Self::load_from(&Self::state_dir()?))
    }

    /// Persist preferences into the given state directory.
    pub fn save_to(&self, dir: &std::path::Path) -> Result<()> {
        fs::create_dir_all(dir)?;
        let path = Self::prefs_path(dir);
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&path, json).context("Failed to write preferences")?;
        debug!("Saved preferences to {}", path.display());
        Ok(())
    }

    /// Persist preferences into the default state directory.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::state_dir()?)
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
