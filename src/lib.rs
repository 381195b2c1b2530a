//! # sumpilot
#![allow(clippy::uninlined_format_args)]
//!
//! CLI tool that pilots NotebookLM to summarize a web page or a selected
//! text snippet, driving a real browser over WebDriver.
//!
//! Given a source (a page URL, a link, or highlighted text), sumpilot opens
//! the NotebookLM site in a fresh tab, imports the source through the
//! "Add source" flow, enters a summarization prompt, and waits for the
//! answer to be generated, reporting progress through an on-page status
//! indicator and the tab title.
//!
//! ## CLI Usage
//!
//! ```bash
//! # Summarize the page at a URL
//! sumpilot page "https://example.com/article"
//!
//! # Summarize a linked article, as if right-clicking the link
//! sumpilot link "https://example.com/linked-article"
//!
//! # Summarize highlighted text
//! sumpilot selection "The text the user highlighted..."
//!
//! # Use Chrome instead of Firefox (default)
//! sumpilot page "https://example.com/article" --browser chrome
//!
//! # Watch the browser do its thing
//! sumpilot page "https://example.com/article" --no-headless
//!
//! # Change the stored summarization prompt
//! sumpilot config set-prompt "Give me the five key takeaways"
//! ```
//!
//! ## Exit Codes
//!
//! - 0: success
//! - 1: command error
//! - 2: invalid trigger (no usable source)
//! - 3: required page element not found
//! - 4: WebDriver connection failed
//! - 5: timeout

pub mod browser;
pub mod config;
pub mod dispatcher;
pub mod driver_manager;
pub mod errors;
pub mod handoff;
pub mod page;
pub mod request;
pub mod sequencer;

pub use browser::BrowserType;
pub use dispatcher::{DispatchOptions, Dispatcher, Trigger};
pub use request::SummarizationRequest;
pub use sequencer::WorkflowState;
