//! The seam between the sequencer and the live destination page
//!
//! Every DOM-dependent step goes through [`PageDriver`], so the workflow is
//! independent of any specific DOM API: production drives a real page over
//! WebDriver, tests substitute a scripted fake.

use anyhow::{Context, Result};
use async_trait::async_trait;
use fantoccini::{Client, Locator};
use serde_json::json;
use tracing::debug;

/// Page-context global carrying the target URL (same-process handoff)
pub const GLOBAL_URL: &str = "__sumpilot_url";
/// Page-context global carrying the advisory source title
pub const GLOBAL_SOURCE_TITLE: &str = "__sumpilot_source_title";

/// Icon classification for the transient status indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconKind {
    Spinner,
    Success,
    Error,
    None,
}

impl IconKind {
    fn css_class(&self) -> &'static str {
        match self {
            IconKind::Spinner => "sumpilot-spinner",
            IconKind::Success => "sumpilot-success",
            IconKind::Error => "sumpilot-error",
            IconKind::None => "",
        }
    }
}

/// The resolved form of a wait: a matched element, identified by the
/// selector that found it. Actionability is encoded in the selectors
/// themselves (`:not([disabled])`), so a match is already actionable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementProbe {
    /// Selector the element was matched with
    pub selector: String,
}

/// Operations the sequencer needs from the destination page.
///
/// `query` never errors: driver faults while probing read as "not present",
/// because absence is always a normal outcome for a wait.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Probe for the first element matching the selector
    async fn query(&self, selector: &str) -> Option<ElementProbe>;

    /// Click the first element matching the selector
    async fn click(&self, selector: &str) -> Result<()>;

    /// Assign a value to an input-like element and dispatch a bubbling
    /// `input` event. The host page's reactive bindings only react to the
    /// event, not to raw value assignment.
    async fn set_value(&self, selector: &str, value: &str) -> Result<()>;

    /// Current value of an input-like element, `None` when absent
    async fn value_of(&self, selector: &str) -> Result<Option<String>>;

    /// Visible text of an element, `None` when absent
    async fn text_of(&self, selector: &str) -> Result<Option<String>>;

    /// Read a string global injected into the page context
    async fn injected_global(&self, name: &str) -> Option<String>;

    /// Rewrite the page title
    async fn set_title(&self, title: &str) -> Result<()>;

    /// Create or update the status indicator overlay
    async fn show_status(&self, message: &str, icon: IconKind) -> Result<()>;

    /// Remove the status indicator overlay
    async fn clear_status(&self) -> Result<()>;
}

/// Production [`PageDriver`] backed by a WebDriver session
pub struct WebDriverPage {
    client: Client,
}

impl WebDriverPage {
    pub fn new(client: Client) -> Self {
        WebDriverPage { client }
    }
}

const SET_VALUE_SCRIPT: &str = r#"
    const el = document.querySelector(arguments[0]);
    if (!el) return false;
    el.value = arguments[1];
    el.dispatchEvent(new Event('input', {bubbles: true}));
    return true;
"#;

const VALUE_OF_SCRIPT: &str = r#"
    const el = document.querySelector(arguments[0]);
    return el && typeof el.value === 'string' ? el.value : null;
"#;

const STATUS_SCRIPT: &str = r#"
    let toast = document.getElementById('sumpilot-status');
    if (!toast) {
        toast = document.createElement('div');
        toast.id = 'sumpilot-status';
        Object.assign(toast.style, {
            position: 'fixed', bottom: '20px', right: '20px', zIndex: '9999',
            backgroundColor: 'rgba(0, 0, 0, 0.8)', color: 'white',
            padding: '12px 20px', borderRadius: '8px',
            fontFamily: 'Arial, sans-serif', fontSize: '14px', maxWidth: '300px'
        });
        document.body.appendChild(toast);
    }
    toast.textContent = arguments[0];
    toast.className = arguments[1];
"#;

const CLEAR_STATUS_SCRIPT: &str = r#"
    const toast = document.getElementById('sumpilot-status');
    if (toast && toast.parentNode) toast.parentNode.removeChild(toast);
"#;

#[async_trait]
impl PageDriver for WebDriverPage {
    async fn query(&self, selector: &str) -> Option<ElementProbe> {
        match self.client.find(Locator::Css(selector)).await {
            Ok(_) => Some(ElementProbe {
                selector: selector.to_string(),
            }),
            Err(e) => {
                debug!("No match for {}: {}", selector, e);
                None
            }
        }
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let element = self
            .client
            .find(Locator::Css(selector))
            .await
            .context(format!("Element not found: {}", selector))?;
        element.click().await.context("Click failed")?;
        Ok(())
    }

    async fn set_value(&self, selector: &str, value: &str) -> Result<()> {
        let result = self
            .client
            .execute(SET_VALUE_SCRIPT, vec![json!(selector), json!(value)])
            .await?;
        if !result.as_bool().unwrap_or(false) {
            anyhow::bail!("Element not found: {}", selector);
        }
        Ok(())
    }

    async fn value_of(&self, selector: &str) -> Result<Option<String>> {
        let value = self
            .client
            .execute(VALUE_OF_SCRIPT, vec![json!(selector)])
            .await?;
        Ok(value.as_str().map(str::to_string))
    }

    async fn text_of(&self, selector: &str) -> Result<Option<String>> {
        match self.client.find(Locator::Css(selector)).await {
            Ok(element) => Ok(Some(element.text().await?)),
            Err(_) => Ok(None),
        }
    }

    async fn injected_global(&self, name: &str) -> Option<String> {
        let value = self
            .client
            .execute(
                "return typeof window[arguments[0]] === 'string' ? window[arguments[0]] : null;",
                vec![json!(name)],
            )
            .await
            .ok()?;
        value.as_str().map(str::to_string)
    }

    async fn set_title(&self, title: &str) -> Result<()> {
        self.client
            .execute("document.title = arguments[0];", vec![json!(title)])
            .await?;
        Ok(())
    }

    async fn show_status(&self, message: &str, icon: IconKind) -> Result<()> {
        self.client
            .execute(STATUS_SCRIPT, vec![json!(message), json!(icon.css_class())])
            .await?;
        Ok(())
    }

    async fn clear_status(&self) -> Result<()> {
        self.client.execute(CLEAR_STATUS_SCRIPT, vec![]).await?;
        Ok(())
    }
}
