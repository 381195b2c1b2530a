//! Automatic WebDriver process management
//!
//! Finds an already-running geckodriver/chromedriver, or starts and
//! supervises one, and tears down anything it started on exit.

use anyhow::{Context, Result};
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::browser::BrowserType;

/// Manages WebDriver processes (geckodriver, chromedriver)
#[derive(Default)]
pub struct DriverManager {
    processes: Arc<Mutex<Vec<DriverProcess>>>,
}

struct DriverProcess {
    browser_type: BrowserType,
    child: Child,
    port: u16,
    url: String,
}

impl DriverManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure a WebDriver is running for the given browser type and return
    /// the URL to connect to.
    pub async fn ensure_driver(&self, browser_type: &BrowserType) -> Result<String> {
        let managed_urls: Vec<String> = {
            let processes = self.processes.lock().unwrap();
            processes
                .iter()
                .filter(|p| p.browser_type == *browser_type)
                .map(|p| p.url.clone())
                .collect()
        };
        for url in managed_urls {
            if Self::driver_ready(&url).await {
                debug!("Reusing managed WebDriver at {}", url);
                return Ok(url);
            }
        }

        // An externally managed driver may already sit on its standard port
        let standard_url = match browser_type {
            BrowserType::Firefox => "http://localhost:4444",
            BrowserType::Chrome => "http://localhost:9515",
        };
        if Self::driver_ready(standard_url).await {
            debug!("Found external WebDriver at {}", standard_url);
            return Ok(standard_url.to_string());
        }

        info!("WebDriver not detected, starting it automatically");
        self.start_driver(browser_type).await
    }

    async fn start_driver(&self, browser_type: &BrowserType) -> Result<String> {
        let port = Self::find_free_port(browser_type)?;
        let (command, args) = match browser_type {
            BrowserType::Firefox => ("geckodriver", vec!["--port".to_string(), port.to_string()]),
            BrowserType::Chrome => ("chromedriver", vec![format!("--port={}", port)]),
        };

        if !Self::command_exists(command) {
            anyhow::bail!(
                "{} not found in PATH. Please install it:\n\
                  macOS: brew install {}\n\
                  Linux: Download from official releases",
                command,
                command
            );
        }

        info!("Starting {} on port {}", command, port);
        let child = Command::new(command)
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .context(format!("Failed to start {}", command))?;

        let url = format!("http://localhost:{}", port);
        {
            let mut processes = self.processes.lock().unwrap();
            processes.push(DriverProcess {
                browser_type: *browser_type,
                child,
                port,
                url: url.clone(),
            });
        }

        // Give the driver up to 3 seconds to come up
        for _ in 0..30 {
            if Self::driver_ready(&url).await {
                info!("WebDriver started successfully on port {}", port);
                return Ok(url);
            }
            sleep(Duration::from_millis(100)).await;
        }

        self.kill_on_port(port);
        anyhow::bail!("WebDriver failed to start within timeout")
    }

    fn command_exists(command: &str) -> bool {
        #[cfg(unix)]
        let probe = Command::new("which").arg(command).output();
        #[cfg(windows)]
        let probe = Command::new("where").arg(command).output();

        probe.map(|output| output.status.success()).unwrap_or(false)
    }

    fn find_free_port(browser_type: &BrowserType) -> Result<u16> {
        let preferred = match browser_type {
            BrowserType::Firefox => [4444, 4445, 4446],
            BrowserType::Chrome => [9515, 9516, 9517],
        };
        for port in preferred {
            if std::net::TcpListener::bind(("127.0.0.1", port)).is_ok() {
                return Ok(port);
            }
            debug!("Port {} is in use", port);
        }
        // Fall back to an OS-assigned port
        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        Ok(listener.local_addr()?.port())
    }

    /// A driver is usable only when its status endpoint reports ready
    async fn driver_ready(url: &str) -> bool {
        let status_url = format!("{}/status", url);
        let response = match reqwest::Client::new()
            .get(&status_url)
            .timeout(Duration::from_secs(1))
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => response,
            _ => return false,
        };
        response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|body| {
                body.get("value")
                    .and_then(|v| v.get("ready"))
                    .and_then(|r| r.as_bool())
            })
            .unwrap_or(false)
    }

    /// Kill any managed driver for the given browser type
    pub fn kill_driver(&self, browser_type: &BrowserType) {
        let mut processes = self.processes.lock().unwrap();
        processes.retain_mut(|p| {
            if p.browser_type == *browser_type {
                info!("Killing WebDriver on port {}", p.port);
                let _ = p.child.kill();
                false
            } else {
                true
            }
        });
    }

    fn kill_on_port(&self, port: u16) {
        let mut processes = self.processes.lock().unwrap();
        processes.retain_mut(|p| {
            if p.port == port {
                let _ = p.child.kill();
                false
            } else {
                true
            }
        });
    }

    /// Stop all managed WebDriver processes
    pub fn stop_all(&self) {
        let mut processes = self.processes.lock().unwrap();
        for process in processes.iter_mut() {
            debug!("Stopping WebDriver on port {}", process.port);
            let _ = process.child.kill();
        }
        processes.clear();
    }
}

impl Drop for DriverManager {
    fn drop(&mut self) {
        self.stop_all();
    }
}

// Global WebDriver manager instance
lazy_static::lazy_static! {
    pub static ref GLOBAL_DRIVER_MANAGER: DriverManager = DriverManager::new();
}

#[cfg(test)]
#[path = "driver_manager_test.rs"]
mod driver_manager_test;
