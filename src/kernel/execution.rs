use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use url::Url;

use super::capability::CapabilityRegistry;
use super::process::{ProcessError, ProcessRunner};
use crate::intent::{ClassificationResult, Intent, SLOT_APP_NAME, SLOT_QUERY};

pub const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);
pub const MEDIA_TIMEOUT: Duration = Duration::from_secs(5);
pub const SYSTEM_INFO_TIMEOUT: Duration = Duration::from_secs(2);

const GOOGLE_SEARCH: &str = "https://www.google.com/search";
const YOUTUBE_RESULTS: &str = "https://www.youtube.com/results";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// Refused by the registry before any handler ran.
    Blocked,
    /// The handler ran and the action did not happen.
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    success: bool,
    message: String,
    intent: Intent,
    details: BTreeMap<String, Value>,
    timestamp: DateTime<Local>,
    failure: Option<FailureKind>,
}

impl ExecutionResult {
    pub fn succeeded(intent: Intent, message: impl Into<String>) -> Self {
        Self::build(intent, message.into(), None)
    }

    pub fn failed(intent: Intent, message: impl Into<String>) -> Self {
        Self::build(intent, message.into(), Some(FailureKind::Failed))
    }

    pub fn blocked(intent: Intent) -> Self {
        Self::build(
            intent,
            format!("Intent {intent} cannot be executed"),
            Some(FailureKind::Blocked),
        )
    }

    fn build(intent: Intent, message: String, failure: Option<FailureKind>) -> Self {
        Self {
            success: failure.is_none(),
            message,
            intent,
            details: BTreeMap::new(),
            timestamp: Local::now(),
            failure,
        }
    }

    fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn intent(&self) -> Intent {
        self.intent
    }

    pub fn details(&self) -> &BTreeMap<String, Value> {
        &self.details
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    pub fn failure(&self) -> Option<FailureKind> {
        self.failure
    }
}

/// Unexpected handler failures. Expected ones are already failed results.
#[derive(Debug, Error)]
enum ExecutionError {
    #[error(transparent)]
    Process(#[from] ProcessError),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

/// Program used to open URLs, with a fallback when it is not installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserLauncher {
    pub program: String,
    pub args: Vec<String>,
    pub fallback: String,
}

impl Default for BrowserLauncher {
    fn default() -> Self {
        Self {
            program: "brave-browser".to_string(),
            args: vec!["--new-window".to_string()],
            fallback: "xdg-open".to_string(),
        }
    }
}

impl BrowserLauncher {
    /// Returns the program that actually opened the URL.
    async fn open(&self, runner: &dyn ProcessRunner, url: &str) -> Result<String, ProcessError> {
        let mut args = self.args.clone();
        args.push(url.to_string());

        match runner.launch(&self.program, &args).await {
            Ok(()) => Ok(self.program.clone()),
            Err(ProcessError::NotFound(_)) => {
                debug!(program = %self.program, fallback = %self.fallback, "browser missing, using fallback");
                runner
                    .launch(&self.fallback, &[url.to_string()])
                    .await
                    .map(|()| self.fallback.clone())
            }
            Err(e) => Err(e),
        }
    }
}

fn search_url(base: &str, key: &str, query: &str) -> Result<String, url::ParseError> {
    Url::parse_with_params(base, &[(key, query)]).map(String::from)
}

/// Sole path from an authorized classification to a side effect.
pub struct ExecutionController {
    registry: Arc<CapabilityRegistry>,
    runner: Arc<dyn ProcessRunner>,
    browser: BrowserLauncher,
}

impl ExecutionController {
    pub fn new(registry: Arc<CapabilityRegistry>, runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            registry,
            runner,
            browser: BrowserLauncher::default(),
        }
    }

    pub fn with_browser(mut self, browser: BrowserLauncher) -> Self {
        self.browser = browser;
        self
    }

    pub async fn execute_intent(&self, result: &ClassificationResult) -> ExecutionResult {
        let intent = result.intent();

        if !self.registry.validate_capability(intent) {
            warn!(intent = %intent, "execution blocked by capability registry");
            return ExecutionResult::blocked(intent);
        }

        info!(intent = %intent, slots = ?result.slots(), "executing intent");

        match self.dispatch(result).await {
            Ok(outcome) => {
                if outcome.success() {
                    info!(intent = %intent, message = outcome.message(), "execution succeeded");
                } else {
                    warn!(intent = %intent, message = outcome.message(), "execution failed");
                }
                outcome
            }
            Err(e) => {
                error!(intent = %intent, error = %e, "execution error");
                ExecutionResult::failed(intent, format!("Execution error: {e}"))
            }
        }
    }

    async fn dispatch(&self, result: &ClassificationResult) -> Result<ExecutionResult, ExecutionError> {
        let app = result.slot(SLOT_APP_NAME);
        let query = result.slot(SLOT_QUERY);

        match result.intent() {
            Intent::OpenApp => self.open_app(app).await,
            Intent::CloseApp => self.close_app(app).await,
            Intent::SearchWeb => self.search_web(query).await,
            Intent::PlayMusic => Ok(self.media(Intent::PlayMusic, "play", "Playing music").await),
            Intent::StopMusic => Ok(self.media(Intent::StopMusic, "pause", "Stopped music").await),
            Intent::GetTime => {
                let time = Local::now().format("%I:%M %p").to_string();
                Ok(ExecutionResult::succeeded(Intent::GetTime, format!("The time is {time}"))
                    .with_detail("time", time))
            }
            Intent::GetDate => {
                let date = Local::now().format("%A, %B %d, %Y").to_string();
                Ok(ExecutionResult::succeeded(Intent::GetDate, format!("Today is {date}"))
                    .with_detail("date", date))
            }
            Intent::SystemInfo => Ok(self.system_info().await),
            Intent::Greeting => Ok(ExecutionResult::succeeded(
                Intent::Greeting,
                "Hello! How can I help you?",
            )),
            Intent::Exit => Ok(ExecutionResult::succeeded(Intent::Exit, "Goodbye!")),
            Intent::PlayYoutube => self.youtube(Intent::PlayYoutube, query).await,
            Intent::SearchYoutube => self.youtube(Intent::SearchYoutube, query).await,
            Intent::Unknown => Ok(ExecutionResult::failed(
                Intent::Unknown,
                "No handler for intent: UNKNOWN",
            )),
        }
    }

    async fn open_app(&self, app: Option<&str>) -> Result<ExecutionResult, ExecutionError> {
        let intent = Intent::OpenApp;
        let Some(app) = app else {
            return Ok(ExecutionResult::failed(intent, "No app name specified"));
        };
        let Some(executable) = self.registry.executable_for(app) else {
            return Ok(ExecutionResult::failed(
                intent,
                format!("App '{app}' not in allowed list"),
            ));
        };

        match self.runner.launch(executable, &[]).await {
            Ok(()) => Ok(ExecutionResult::succeeded(intent, format!("Opened {app}"))
                .with_detail("app", app)
                .with_detail("executable", executable)),
            Err(ProcessError::NotFound(_)) => Ok(ExecutionResult::failed(
                intent,
                format!("App '{app}' not found on system"),
            )),
            Err(e) => Err(e.into()),
        }
    }

    async fn close_app(&self, app: Option<&str>) -> Result<ExecutionResult, ExecutionError> {
        let intent = Intent::CloseApp;
        let Some(app) = app else {
            return Ok(ExecutionResult::failed(intent, "No app name specified"));
        };
        let Some(process) = self.registry.process_for(app) else {
            return Ok(ExecutionResult::failed(
                intent,
                format!("App '{app}' not in allowed list"),
            ));
        };

        let args = ["-f".to_string(), process.to_string()];
        match self.runner.run("pkill", &args, CLOSE_TIMEOUT).await {
            Ok(out) if out.success() => Ok(ExecutionResult::succeeded(intent, format!("Closed {app}"))
                .with_detail("app", app)
                .with_detail("process", process)),
            Ok(out) if out.code == Some(1) => {
                Ok(ExecutionResult::failed(intent, format!("{app} is not running")))
            }
            Ok(out) => Ok(ExecutionResult::failed(intent, format!("Could not close {app}"))
                .with_detail("exit_code", out.code)),
            Err(ProcessError::Timeout { .. }) => {
                Ok(ExecutionResult::failed(intent, "Close operation timed out"))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn search_web(&self, query: Option<&str>) -> Result<ExecutionResult, ExecutionError> {
        let intent = Intent::SearchWeb;
        let Some(query) = query else {
            return Ok(ExecutionResult::failed(intent, "No search query specified"));
        };

        let url = search_url(GOOGLE_SEARCH, "q", query)?;
        Ok(self
            .open_url(intent, &url, query, format!("Searching for: {query}"))
            .await)
    }

    async fn youtube(&self, intent: Intent, query: Option<&str>) -> Result<ExecutionResult, ExecutionError> {
        let Some(query) = query else {
            let message = if intent == Intent::PlayYoutube {
                "No video query specified"
            } else {
                "No search query specified"
            };
            return Ok(ExecutionResult::failed(intent, message));
        };

        let url = search_url(YOUTUBE_RESULTS, "search_query", query)?;
        let message = if intent == Intent::PlayYoutube {
            format!("Playing {query} on YouTube")
        } else {
            format!("Searching YouTube for {query}")
        };
        Ok(self.open_url(intent, &url, query, message).await)
    }

    async fn open_url(&self, intent: Intent, url: &str, query: &str, message: String) -> ExecutionResult {
        match self.browser.open(self.runner.as_ref(), url).await {
            Ok(launcher) => ExecutionResult::succeeded(intent, message)
                .with_detail("query", query)
                .with_detail("url", url)
                .with_detail("launcher", launcher),
            Err(e) => {
                warn!(error = %e, "browser launch failed");
                ExecutionResult::failed(intent, "Could not open browser")
            }
        }
    }

    async fn media(&self, intent: Intent, command: &str, message: &str) -> ExecutionResult {
        match self
            .runner
            .run("playerctl", &[command.to_string()], MEDIA_TIMEOUT)
            .await
        {
            Ok(out) if out.success() => ExecutionResult::succeeded(intent, message),
            Ok(out) => {
                debug!(code = ?out.code, stderr = %out.stderr.trim(), "playerctl refused");
                ExecutionResult::failed(intent, "No media player found")
            }
            Err(e) => {
                debug!(error = %e, "playerctl unavailable");
                ExecutionResult::failed(intent, "No media player found")
            }
        }
    }

    async fn system_info(&self) -> ExecutionResult {
        let intent = Intent::SystemInfo;
        match self.runner.run("hostname", &[], SYSTEM_INFO_TIMEOUT).await {
            Ok(out) if out.success() && !out.stdout.trim().is_empty() => {
                let host = out.stdout.trim().to_string();
                ExecutionResult::succeeded(intent, format!("System: {host}"))
                    .with_detail("hostname", host)
            }
            Ok(_) => ExecutionResult::failed(intent, "Could not get system info"),
            Err(e) => {
                debug!(error = %e, "hostname unavailable");
                ExecutionResult::failed(intent, "Could not get system info")
            }
        }
    }
}
