use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{SpeechError, SpeechOutput, PLAYBACK_TIMEOUT, SYNTHESIS_TIMEOUT};
use crate::config::SpeechConfig;

/// Piper synthesis to a temporary WAV, played back with `aplay`.
#[derive(Debug, Clone)]
pub struct PiperSpeaker {
    binary: PathBuf,
    voice: PathBuf,
    player: String,
    scratch_dir: PathBuf,
}

impl PiperSpeaker {
    pub fn new(binary: impl Into<PathBuf>, voice: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            voice: voice.into(),
            player: "aplay".to_string(),
            scratch_dir: std::env::temp_dir(),
        }
    }

    pub fn from_config(config: &SpeechConfig) -> Self {
        Self::new(&config.piper_bin, &config.piper_voice)
    }

    pub fn missing_files(&self) -> Vec<&Path> {
        [self.binary.as_path(), self.voice.as_path()]
            .into_iter()
            .filter(|p| !p.exists())
            .collect()
    }

    async fn synthesize(&self, text: &str, wav: &Path) -> Result<(), SpeechError> {
        let mut child = Command::new(&self.binary)
            .arg("-m")
            .arg(&self.voice)
            .arg("-f")
            .arg(wav)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SpeechError::Synthesis(e.to_string()))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes()).await?;
            stdin.shutdown().await?;
        }

        let output = tokio::time::timeout(SYNTHESIS_TIMEOUT, child.wait_with_output())
            .await
            .map_err(|_| SpeechError::Timeout {
                stage: "synthesis",
                after: SYNTHESIS_TIMEOUT,
            })??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SpeechError::Synthesis(stderr.trim().to_string()));
        }
        Ok(())
    }

    async fn play(&self, wav: &Path) -> Result<(), SpeechError> {
        let mut cmd = Command::new(&self.player);
        cmd.arg("-q")
            .arg(wav)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let status = tokio::time::timeout(PLAYBACK_TIMEOUT, cmd.status())
            .await
            .map_err(|_| SpeechError::Timeout {
                stage: "playback",
                after: PLAYBACK_TIMEOUT,
            })?
            .map_err(|e| SpeechError::Playback(e.to_string()))?;

        if !status.success() {
            return Err(SpeechError::Playback(format!("{} exited with {status}", self.player)));
        }
        Ok(())
    }
}

#[async_trait]
impl SpeechOutput for PiperSpeaker {
    async fn say(&mut self, text: &str) -> Result<(), SpeechError> {
        println!("{text}");

        let wav = self
            .scratch_dir
            .join(format!("vox-reply-{}.wav", Uuid::new_v4()));

        let result = match self.synthesize(text, &wav).await {
            Ok(()) => self.play(&wav).await,
            Err(e) => Err(e),
        };
        debug!(ok = result.is_ok(), "spoke reply");

        if let Err(e) = tokio::fs::remove_file(&wav).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(error = %e, "could not remove synthesized audio");
            }
        }
        result
    }
}
