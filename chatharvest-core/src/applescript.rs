//! `osascript` bridge: runs page scripts in the front tab of a macOS browser.

use std::process::Stdio;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::HarvestError;
use crate::evaluator::PageEvaluator;

/// Hard ceiling for a single evaluation.
pub const DEFAULT_EVALUATE_TIMEOUT: Duration = Duration::from_secs(30);

/// Results above this size are discarded (full conversations can be large).
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 50 * 1024 * 1024;

/// Browsers scriptable through AppleScript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserApp {
    Chrome,
    Chromium,
    Brave,
    Edge,
    Arc,
    Safari,
}

impl BrowserApp {
    pub const ALL: [BrowserApp; 6] = [
        BrowserApp::Chrome,
        BrowserApp::Chromium,
        BrowserApp::Brave,
        BrowserApp::Edge,
        BrowserApp::Arc,
        BrowserApp::Safari,
    ];

    pub fn application_name(&self) -> &'static str {
        match self {
            BrowserApp::Chrome => "Google Chrome",
            BrowserApp::Chromium => "Chromium",
            BrowserApp::Brave => "Brave Browser",
            BrowserApp::Edge => "Microsoft Edge",
            BrowserApp::Arc => "Arc",
            BrowserApp::Safari => "Safari",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            BrowserApp::Chrome => "chrome",
            BrowserApp::Chromium => "chromium",
            BrowserApp::Brave => "brave",
            BrowserApp::Edge => "edge",
            BrowserApp::Arc => "arc",
            BrowserApp::Safari => "safari",
        }
    }

    /// Wrap an already-escaped script body in the browser's AppleScript verb.
    fn wrap(&self, escaped_js: &str) -> String {
        match self {
            BrowserApp::Safari => format!(
                r#"tell application "Safari" to do JavaScript "{}" in current tab of front window"#,
                escaped_js
            ),
            other => format!(
                r#"tell application "{}" to execute active tab of front window javascript "{}""#,
                other.application_name(),
                escaped_js
            ),
        }
    }
}

impl FromStr for BrowserApp {
    type Err = HarvestError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let lower = value.trim().to_ascii_lowercase();
        BrowserApp::ALL
            .into_iter()
            .find(|app| app.key() == lower || app.application_name().eq_ignore_ascii_case(&lower))
            .ok_or_else(|| {
                let known: Vec<&str> = BrowserApp::ALL.iter().map(|app| app.key()).collect();
                HarvestError::config(format!(
                    "unsupported browser '{value}' (expected one of: {})",
                    known.join(", ")
                ))
            })
    }
}

/// Escape a script for embedding in an AppleScript string literal:
/// backslashes first, then double quotes.
pub fn escape_for_applescript(js: &str) -> String {
    js.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Page evaluator backed by `osascript`.
pub struct AppleScriptEvaluator {
    browser: BrowserApp,
    timeout: Duration,
    max_output_bytes: usize,
}

impl AppleScriptEvaluator {
    pub fn new(browser: BrowserApp) -> Self {
        Self {
            browser,
            timeout: DEFAULT_EVALUATE_TIMEOUT,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_output_bytes(mut self, max: usize) -> Self {
        self.max_output_bytes = max;
        self
    }

    pub fn browser(&self) -> BrowserApp {
        self.browser
    }

    /// The full AppleScript source sent to `osascript` for `js`.
    pub fn applescript_for(&self, js: &str) -> String {
        self.browser.wrap(&escape_for_applescript(js))
    }

    async fn run(&self, js: &str) -> Result<String, String> {
        let child = Command::new("osascript")
            .arg("-e")
            .arg(self.applescript_for(js))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| format!("failed to spawn osascript: {e}"))?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| format!("timed out after {}s", self.timeout.as_secs()))?
            .map_err(|e| format!("failed to wait for osascript: {e}"))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("JavaScript through AppleScript is turned off") {
                return Err(format!(
                    "{} blocks JavaScript from Apple Events (View > Developer > Allow JavaScript from Apple Events)",
                    self.browser.application_name()
                ));
            }
            return Err(format!("osascript failed: {}", stderr.trim()));
        }

        if output.stdout.len() > self.max_output_bytes {
            return Err(format!(
                "result too large ({:.1} MB)",
                output.stdout.len() as f64 / (1024.0 * 1024.0)
            ));
        }

        let text = String::from_utf8_lossy(&output.stdout);
        let text = text.trim_end_matches(['\n', '\r']);
        if text == "missing value" {
            return Ok(String::new());
        }
        Ok(text.to_string())
    }
}

#[async_trait]
impl PageEvaluator for AppleScriptEvaluator {
    async fn evaluate(&self, script: &str) -> String {
        match self.run(script).await {
            Ok(text) => text,
            Err(reason) => {
                debug!(browser = self.browser.key(), %reason, "evaluation failed");
                String::new()
            }
        }
    }
}
