#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sumpilot::config::{Preferences, Timings};
use sumpilot::dispatcher::{DispatchOptions, Dispatcher, Trigger};
use sumpilot::driver_manager::GLOBAL_DRIVER_MANAGER;
use sumpilot::errors::PilotError;
use sumpilot::handoff::HandoffStore;
use sumpilot::sequencer::selectors;
use sumpilot::BrowserType;

const EXIT_SUCCESS: i32 = 0;

#[derive(Parser)]
#[command(name = "sumpilot")]
#[command(about = "Summarize web pages and text through NotebookLM", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Browser to use
    #[arg(short, long, global = true, default_value = "firefox")]
    browser: String,

    /// Run the browser in visible mode (disables headless)
    #[arg(long = "no-headless", global = true)]
    no_headless: bool,

    /// Destination site hosting the summarization workflow
    #[arg(long, global = true, default_value = selectors::DESTINATION_URL)]
    destination: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize the page at a URL
    Page {
        /// URL of the page to summarize
        url: String,

        /// Title of the page, used to label the run
        #[arg(long)]
        title: Option<String>,
    },

    /// Summarize a linked article, optionally with surrounding context
    Link {
        /// URL of the link target
        link_url: String,

        /// URL of the page the link was found on
        #[arg(long)]
        page_url: Option<String>,

        /// Text highlighted alongside the link
        #[arg(long)]
        selection: Option<String>,
    },

    /// Summarize highlighted text
    Selection {
        /// The highlighted text
        text: String,
    },

    /// Show or change stored settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the current settings
    Show,

    /// Set the summarization prompt (empty restores the default)
    SetPrompt {
        /// Prompt text entered after the source is imported
        text: String,
    },

    /// Set whether the destination tab opens without taking focus
    SetBackground {
        /// true or false
        value: bool,
    },
}

#[tokio::main]
async fn main() {
    let result = run().await;

    // Always clean up WebDriver processes before exiting
    GLOBAL_DRIVER_MANAGER.stop_all();

    match result {
        Ok(()) => std::process::exit(EXIT_SUCCESS),
        Err(err) => {
            let pilot_err = PilotError::classify(err);

            // JSON error to stdout for programmatic consumption
            let error_json = json!({
                "error": true,
                "message": pilot_err.to_string(),
                "exit_code": pilot_err.exit_code()
            });
            println!(
                "{}",
                serde_json::to_string(&error_json).unwrap_or_else(|_| "{}".to_string())
            );

            // Also log to stderr for human reading
            eprintln!("Error: {}", pilot_err);
            std::process::exit(pilot_err.exit_code());
        }
    }
}

async fn run() -> Result<()> {
    // Logs go to stderr so JSON output on stdout stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sumpilot=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();

    let cli = Cli::parse();

    let trigger = match cli.command {
        Commands::Page { url, title } => Trigger::Toolbar {
            url: Some(url),
            title,
        },
        Commands::Link {
            link_url,
            page_url,
            selection,
        } => Trigger::Menu {
            link_url: Some(link_url),
            page_url,
            selection,
        },
        Commands::Selection { text } => Trigger::Menu {
            link_url: None,
            page_url: None,
            selection: Some(text),
        },
        Commands::Config { command } => return handle_config(command),
    };

    let options = DispatchOptions {
        browser: cli.browser.parse::<BrowserType>()?,
        headless: !cli.no_headless,
        destination: cli.destination,
    };
    let dispatcher = Dispatcher::new(
        HandoffStore::open_default()?,
        Preferences::load()?,
        Timings::default(),
        options,
    );
    dispatcher.dispatch(trigger).await?;
    Ok(())
}

fn handle_config(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            let prefs = Preferences::load()?;
            println!("{}", serde_json::to_string_pretty(&prefs)?);
        }
        ConfigCommands::SetPrompt { text } => {
            let mut prefs = Preferences::load()?;
            // An empty prompt restores the default
            prefs.prompt_text = if text.trim().is_empty() {
                Preferences::default().prompt_text
            } else {
                text
            };
            prefs.save()?;
            println!("Settings saved.");
        }
        ConfigCommands::SetBackground { value } => {
            let mut prefs = Preferences::load()?;
            prefs.open_in_background = value;
            prefs.save()?;
            println!("Settings saved.");
        }
    }
    Ok(())
}
