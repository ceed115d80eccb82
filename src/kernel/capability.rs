use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use thiserror::Error;

use super::risk::RiskLevel;
use crate::intent::Intent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no capability registered for {0}")]
pub struct LookupError(pub Intent);

/// Parameter allowlists a handler must stay within.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AllowedParameters {
    /// Spoken app name -> executable.
    pub apps: Option<BTreeMap<String, String>>,
    /// Process names that may be signalled.
    pub processes: Option<BTreeSet<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Capability {
    pub risk: RiskLevel,
    pub requires_confirmation: bool,
    pub executable: bool,
    pub allowed: AllowedParameters,
    pub description: String,
}

impl Capability {
    pub fn new(risk: RiskLevel, description: &str) -> Self {
        Self {
            risk,
            requires_confirmation: false,
            executable: true,
            allowed: AllowedParameters::default(),
            description: description.to_string(),
        }
    }

    pub fn confirmed(mut self) -> Self {
        self.requires_confirmation = true;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.executable = false;
        self
    }

    pub fn with_apps(mut self, apps: &[(&str, &str)]) -> Self {
        self.allowed.apps = Some(
            apps.iter()
                .map(|(name, exe)| (name.to_string(), exe.to_string()))
                .collect(),
        );
        self
    }

    pub fn with_processes(mut self, processes: &[&str]) -> Self {
        self.allowed.processes = Some(processes.iter().map(|p| p.to_string()).collect());
        self
    }
}

const ALLOWED_APPS: &[(&str, &str)] = &[
    ("firefox", "firefox"),
    ("chrome", "google-chrome"),
    ("code", "code"),
    ("terminal", "gnome-terminal"),
    ("vscode", "code"),
    ("browser", "firefox"),
];

const ALLOWED_PROCESSES: &[&str] = &["firefox", "google-chrome", "code", "gnome-terminal"];

/// Static authorization table. Built once, then only read.
#[derive(Debug, Clone)]
pub struct CapabilityRegistry {
    entries: HashMap<Intent, Capability>,
}

impl CapabilityRegistry {
    /// The table every session starts with. Covers every intent.
    pub fn builtin() -> Self {
        use RiskLevel::*;

        Self::from_entries([
            (
                Intent::OpenApp,
                Capability::new(Low, "Launch an allowlisted application").with_apps(ALLOWED_APPS),
            ),
            (
                Intent::CloseApp,
                Capability::new(High, "Terminate an allowlisted application")
                    .confirmed()
                    .with_apps(ALLOWED_APPS)
                    .with_processes(ALLOWED_PROCESSES),
            ),
            (Intent::SearchWeb, Capability::new(Medium, "Open a web search in the browser")),
            (Intent::PlayMusic, Capability::new(Medium, "Resume media playback")),
            (Intent::StopMusic, Capability::new(Low, "Pause media playback")),
            (Intent::GetTime, Capability::new(Low, "Report the current time")),
            (Intent::GetDate, Capability::new(Low, "Report the current date")),
            (Intent::SystemInfo, Capability::new(Medium, "Report the host name")),
            (Intent::Greeting, Capability::new(Low, "Respond to a greeting")),
            (Intent::Exit, Capability::new(Low, "End the session")),
            (Intent::PlayYoutube, Capability::new(Medium, "Play a video on YouTube")),
            (Intent::SearchYoutube, Capability::new(Medium, "Search YouTube")),
            (
                Intent::Unknown,
                Capability::new(Low, "Unrecognized request").disabled(),
            ),
        ])
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (Intent, Capability)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Registered and executable.
    pub fn validate_capability(&self, intent: Intent) -> bool {
        self.entries.get(&intent).is_some_and(|c| c.executable)
    }

    pub fn get_capability(&self, intent: Intent) -> Result<&Capability, LookupError> {
        self.entries.get(&intent).ok_or(LookupError(intent))
    }

    pub fn requires_confirmation(&self, intent: Intent) -> bool {
        self.entries
            .get(&intent)
            .is_some_and(|c| c.requires_confirmation)
    }

    /// Executable an OPEN_APP request for `app` may start.
    pub fn executable_for(&self, app: &str) -> Option<&str> {
        self.entries
            .get(&Intent::OpenApp)?
            .allowed
            .apps
            .as_ref()?
            .get(app)
            .map(String::as_str)
    }

    /// Process name a CLOSE_APP request for `app` may signal. Both the app map
    /// and the process set must allow it.
    pub fn process_for(&self, app: &str) -> Option<&str> {
        let allowed = &self.entries.get(&Intent::CloseApp)?.allowed;
        let process = allowed.apps.as_ref()?.get(app)?;
        allowed
            .processes
            .as_ref()?
            .contains(process)
            .then_some(process.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
