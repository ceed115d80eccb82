//! Speech I/O collaborators. No decision logic lives here.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub mod console;
pub mod stt;
pub mod tts;

pub use console::{ConsoleInput, ConsoleOutput};
pub use stt::{VoiceInput, WhisperTranscriber};
pub use tts::PiperSpeaker;

pub const TRANSCRIBE_TIMEOUT: Duration = Duration::from_secs(30);
pub const SYNTHESIS_TIMEOUT: Duration = Duration::from_secs(10);
pub const PLAYBACK_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("recording failed: {0}")]
    Recording(String),
    #[error("transcription failed: {0}")]
    Transcription(String),
    #[error("synthesis failed: {0}")]
    Synthesis(String),
    #[error("playback failed: {0}")]
    Playback(String),
    #[error("{stage} timed out after {}s", .after.as_secs())]
    Timeout { stage: &'static str, after: Duration },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Source of user utterances.
#[async_trait]
pub trait SpeechInput: Send {
    /// Next utterance. `None` once the source is exhausted.
    async fn listen(&mut self) -> Result<Option<String>, SpeechError>;
}

/// Sink for assistant replies.
#[async_trait]
pub trait SpeechOutput: Send {
    async fn say(&mut self, text: &str) -> Result<(), SpeechError>;
}
