use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{SpeechError, SpeechInput, TRANSCRIBE_TIMEOUT};
use crate::audio::{write_wav, MicRecorder};
use crate::config::SpeechConfig;

/// Wrapper around the whisper.cpp command-line binary.
#[derive(Debug, Clone)]
pub struct WhisperTranscriber {
    binary: PathBuf,
    model: PathBuf,
    threads: u32,
}

impl WhisperTranscriber {
    pub fn new(binary: impl Into<PathBuf>, model: impl Into<PathBuf>, threads: u32) -> Self {
        Self {
            binary: binary.into(),
            model: model.into(),
            threads: threads.max(1),
        }
    }

    pub fn from_config(config: &SpeechConfig) -> Self {
        Self::new(&config.whisper_bin, &config.whisper_model, config.threads)
    }

    /// Missing binary or model, if any.
    pub fn missing_files(&self) -> Vec<&Path> {
        [self.binary.as_path(), self.model.as_path()]
            .into_iter()
            .filter(|p| !p.exists())
            .collect()
    }

    pub async fn transcribe(&self, wav: &Path) -> Result<String, SpeechError> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("-m")
            .arg(&self.model)
            .arg("-f")
            .arg(wav)
            .arg("-t")
            .arg(self.threads.to_string())
            .arg("--no-timestamps")
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = tokio::time::timeout(TRANSCRIBE_TIMEOUT, cmd.output())
            .await
            .map_err(|_| SpeechError::Timeout {
                stage: "transcription",
                after: TRANSCRIBE_TIMEOUT,
            })??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SpeechError::Transcription(stderr.trim().to_string()));
        }

        let text = clean_transcript(&String::from_utf8_lossy(&output.stdout));
        debug!(chars = text.len(), "transcribed");
        Ok(text)
    }
}

/// Join whisper output lines, dropping bracketed markers such as `[BLANK_AUDIO]`.
pub fn clean_transcript(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('['))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Microphone recording followed by transcription.
pub struct VoiceInput {
    recorder: MicRecorder,
    transcriber: WhisperTranscriber,
    duration: Duration,
    scratch_dir: PathBuf,
}

impl VoiceInput {
    pub fn new(recorder: MicRecorder, transcriber: WhisperTranscriber, duration: Duration) -> Self {
        Self {
            recorder,
            transcriber,
            duration,
            scratch_dir: std::env::temp_dir(),
        }
    }

    pub fn from_config(config: &SpeechConfig) -> Self {
        Self::new(
            MicRecorder::new(config.sample_rate),
            WhisperTranscriber::from_config(config),
            Duration::from_secs(config.record_seconds),
        )
    }

    pub fn transcriber(&self) -> &WhisperTranscriber {
        &self.transcriber
    }

    async fn record_to(&self, path: &Path) -> Result<(), SpeechError> {
        let recorder = self.recorder.clone();
        let duration = self.duration;
        let path = path.to_path_buf();

        tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
            let samples = recorder.record(duration)?;
            write_wav(&path, &samples, recorder.target_rate())?;
            Ok(())
        })
        .await
        .map_err(|e| SpeechError::Recording(e.to_string()))?
        .map_err(|e| SpeechError::Recording(e.to_string()))
    }
}

#[async_trait]
impl SpeechInput for VoiceInput {
    async fn listen(&mut self) -> Result<Option<String>, SpeechError> {
        let wav = self
            .scratch_dir
            .join(format!("vox-input-{}.wav", Uuid::new_v4()));

        info!(seconds = self.duration.as_secs(), "listening");
        let result = match self.record_to(&wav).await {
            Ok(()) => self.transcriber.transcribe(&wav).await,
            Err(e) => Err(e),
        };

        if let Err(e) = tokio::fs::remove_file(&wav).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(error = %e, "could not remove recording");
            }
        }

        result.map(Some)
    }
}
