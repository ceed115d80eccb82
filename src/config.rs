//! Runtime configuration: optional TOML file, then environment overrides.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::intent::SEMANTIC_ACCEPT_THRESHOLD;
use crate::kernel::BrowserLauncher;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoxConfig {
    pub assistant: AssistantConfig,
    pub classifier: ClassifierConfig,
    pub semantic: SemanticConfig,
    pub speech: SpeechConfig,
    pub execution: ExecutionConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub name: String,
    pub user_title: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            name: "Assistant".to_string(),
            user_title: "Sir".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub semantic_threshold: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            semantic_threshold: SEMANTIC_ACCEPT_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedderKind {
    /// Pretrained sentence model loaded from `model_dir`.
    #[default]
    Local,
    Http,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SemanticConfig {
    pub embedder: EmbedderKind,
    /// Local embedder only: `config.json`, `tokenizer.json`, `model.safetensors`.
    pub model_dir: PathBuf,
    /// HTTP embedder only.
    pub url: String,
    pub model: String,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            embedder: EmbedderKind::Local,
            model_dir: PathBuf::from("models/all-MiniLM-L6-v2"),
            url: "http://localhost:8080".to_string(),
            model: "all-MiniLM-L6-v2".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeechMode {
    #[default]
    Console,
    Voice,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub mode: SpeechMode,
    pub whisper_bin: PathBuf,
    pub whisper_model: PathBuf,
    pub piper_bin: PathBuf,
    pub piper_voice: PathBuf,
    pub record_seconds: u64,
    pub sample_rate: u32,
    pub threads: u32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            mode: SpeechMode::Console,
            whisper_bin: PathBuf::from("models/whisper.cpp/build/bin/whisper-cli"),
            whisper_model: PathBuf::from("models/whisper/ggml-base.en.bin"),
            piper_bin: PathBuf::from("models/piper/piper"),
            piper_voice: PathBuf::from("models/piper/voices/en_US-lessac-medium.onnx"),
            record_seconds: 3,
            sample_rate: 16_000,
            threads: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    pub browser: String,
    pub browser_args: Vec<String>,
    pub fallback_browser: String,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        let launcher = BrowserLauncher::default();
        Self {
            browser: launcher.program,
            browser_args: launcher.args,
            fallback_browser: launcher.fallback,
        }
    }
}

impl ExecutionConfig {
    pub fn browser_launcher(&self) -> BrowserLauncher {
        BrowserLauncher {
            program: self.browser.clone(),
            args: self.browser_args.clone(),
            fallback: self.fallback_browser.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub dir: PathBuf,
    pub level: String,
    /// Also write `assistant.log` under `dir`.
    pub file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("logs"),
            level: "info".to_string(),
            file: true,
        }
    }
}

impl VoxConfig {
    /// Defaults, the file at `path` if given, then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| env::var(key).ok());
        Ok(config)
    }

    /// A missing file yields defaults; an unreadable or malformed one is an error.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `ASSISTANT_NAME` renames the assistant; `VOX_EMBEDDER_URL` switches the
    /// semantic stage to the HTTP embedder at that address.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(name) = lookup("ASSISTANT_NAME").filter(|v| !v.trim().is_empty()) {
            self.assistant.name = name.trim().to_string();
        }

        if let Some(url) = lookup("VOX_EMBEDDER_URL").filter(|v| !v.trim().is_empty()) {
            self.semantic.embedder = EmbedderKind::Http;
            self.semantic.url = url.trim().to_string();
        }
    }
}
