//! WebDriver session setup and destination-tab management

use anyhow::{Context, Result};
use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::config::Timings;
use crate::driver_manager::GLOBAL_DRIVER_MANAGER;
use crate::page::{GLOBAL_SOURCE_TITLE, GLOBAL_URL};
use crate::request::SummarizationRequest;

/// Supported browser types
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum BrowserType {
    /// Mozilla Firefox
    Firefox,
    /// Google Chrome/Chromium
    Chrome,
}

impl std::str::FromStr for BrowserType {
    type Err = anyhow::Error;

    /// Parse browser type from string (case-insensitive)
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "firefox" => Ok(BrowserType::Firefox),
            "chrome" | "chromium" => Ok(BrowserType::Chrome),
            _ => anyhow::bail!("Unsupported browser: {}", s),
        }
    }
}

/// A live browser session hosting the destination page
pub struct Browser {
    client: Client,
}

impl Browser {
    /// Connect to a WebDriver session, auto-starting the driver if needed.
    pub async fn new(browser_type: BrowserType, headless: bool) -> Result<Self> {
        info!("Connecting to {:?} WebDriver", browser_type);

        let webdriver_url = GLOBAL_DRIVER_MANAGER.ensure_driver(&browser_type).await?;

        let caps = Self::capabilities(browser_type, headless)?;
        debug!("Connecting to WebDriver at {}", webdriver_url);

        let client = match ClientBuilder::rustls()
            .capabilities(caps.clone())
            .connect(&webdriver_url)
            .await
        {
            Ok(client) => client,
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("Session is already started")
                    || error_str.contains("session not created")
                {
                    // Driver is in a bad state; restart it and retry once
                    info!("WebDriver in a bad state, attempting recovery");
                    GLOBAL_DRIVER_MANAGER.kill_driver(&browser_type);
                    tokio::time::sleep(std::time::Duration::from_millis(500)).await;
                    let new_url = GLOBAL_DRIVER_MANAGER
                        .ensure_driver(&browser_type)
                        .await
                        .context("Failed to restart WebDriver after recovery")?;
                    ClientBuilder::rustls()
                        .capabilities(caps)
                        .connect(&new_url)
                        .await
                        .context("Failed to connect to WebDriver after restart")?
                } else {
                    return Err(e).context("Failed to connect to WebDriver");
                }
            }
        };

        Ok(Browser { client })
    }

    fn capabilities(
        browser_type: BrowserType,
        headless: bool,
    ) -> Result<serde_json::Map<String, serde_json::Value>> {
        let mut caps = serde_json::Map::new();
        match browser_type {
            BrowserType::Firefox => {
                let mut args = Vec::new();
                if headless {
                    args.push("--headless".to_string());
                }
                caps.insert(
                    "moz:firefoxOptions".to_string(),
                    json!({ "args": args }),
                );
            }
            BrowserType::Chrome => {
                let mut args = vec!["--no-sandbox".to_string()];
                if headless {
                    args.push("--headless=new".to_string());
                    args.push("--disable-gpu".to_string());
                    args.push("--disable-dev-shm-usage".to_string());
                }
                // Chrome insists on a unique profile directory per session
                let profile_dir = tempfile::Builder::new()
                    .prefix("sumpilot-chrome-")
                    .tempdir()?;
                #[allow(deprecated)]
                let profile_path = profile_dir.into_path();
                args.push(format!("--user-data-dir={}", profile_path.display()));
                caps.insert(
                    "goog:chromeOptions".to_string(),
                    json!({ "args": args }),
                );
            }
        }
        Ok(caps)
    }

    /// A clone of the underlying WebDriver client
    pub fn client(&self) -> Client {
        self.client.clone()
    }

    /// Open a fresh tab next to the session's current one and make it the
    /// automation target.
    pub async fn open_tab(&self) -> Result<()> {
        let window = self.client.new_window(true).await?;
        self.client.switch_to_window(window.handle).await?;
        Ok(())
    }

    pub async fn goto(&self, url: &str) -> Result<()> {
        info!("Navigating to {}", url);
        self.client.goto(url).await?;
        Ok(())
    }

    /// One-shot wait for the current tab's first complete load at the given
    /// origin. Interim states and loads at other origins are ignored; this
    /// resolves at most once and only for the destination.
    pub async fn wait_for_first_complete_load(
        &self,
        origin: &str,
        timings: &Timings,
    ) -> Result<()> {
        await_first_complete_load(self, origin, timings).await
    }

    /// Write the same-process handoff globals into the page context, so the
    /// sequencer can read the payload without racing the persisted store.
    pub async fn inject_handoff(&self, request: &SummarizationRequest) -> Result<()> {
        if let Some(url) = &request.target_url {
            self.client
                .execute(
                    r#"
                        window[arguments[0]] = arguments[1];
                        if (arguments[3] !== null) window[arguments[2]] = arguments[3];
                    "#,
                    vec![
                        json!(GLOBAL_URL),
                        json!(url),
                        json!(GLOBAL_SOURCE_TITLE),
                        json!(request.source_title),
                    ],
                )
                .await?;
            debug!("Injected handoff globals into the destination page");
        }
        Ok(())
    }

    /// Best-effort focus of the destination tab
    pub async fn focus(&self) {
        let _ = self.client.execute("window.focus();", vec![]).await;
    }
}

/// One observation of the tab's navigation state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSnapshot {
    /// Current URL, `None` when it could not be read
    pub url: Option<String>,
    /// Whether the document reported `readyState === 'complete'`
    pub complete: bool,
}

/// Read side of the load watch. Probe faults read as "not loaded yet",
/// since the tab may be mid-navigation when sampled.
#[async_trait]
pub trait LoadProbe: Send + Sync {
    async fn snapshot(&self) -> LoadSnapshot;
}

#[async_trait]
impl LoadProbe for Browser {
    async fn snapshot(&self) -> LoadSnapshot {
        let Ok(url) = self.client.current_url().await else {
            return LoadSnapshot {
                url: None,
                complete: false,
            };
        };
        let complete = self
            .client
            .execute("return document.readyState === 'complete';", vec![])
            .await
            .ok()
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        LoadSnapshot {
            url: Some(url.to_string()),
            complete,
        }
    }
}

fn at_destination(origin: &str, snapshot: &LoadSnapshot) -> bool {
    snapshot.complete
        && snapshot
            .url
            .as_deref()
            .is_some_and(|url| url.starts_with(origin))
}

/// Drive the one-shot load watch against a probe. Resolves on the first
/// sample that is complete at the destination origin; a complete load at
/// any other origin never satisfies it.
pub async fn await_first_complete_load(
    probe: &dyn LoadProbe,
    origin: &str,
    timings: &Timings,
) -> Result<()> {
    debug!("Waiting for destination load at {}", origin);
    let deadline = Instant::now() + timings.page_load_timeout;
    loop {
        if at_destination(origin, &probe.snapshot().await) {
            debug!("Destination load complete");
            return Ok(());
        }
        let now = Instant::now();
        if now >= deadline {
            anyhow::bail!(
                "Destination page did not finish loading within {:?}",
                timings.page_load_timeout
            );
        }
        tokio::time::sleep_until(std::cmp::min(now + timings.poll_interval, deadline)).await;
    }
}

#[cfg(test)]
#[path = "browser_test.rs"]
mod browser_test;
