use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};

use super::{SpeechError, SpeechInput, SpeechOutput};

/// Typed utterances, one per line. Blank lines are skipped.
pub struct ConsoleInput<R> {
    lines: Lines<R>,
}

impl ConsoleInput<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::from_reader(BufReader::new(tokio::io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin> ConsoleInput<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> SpeechInput for ConsoleInput<R> {
    async fn listen(&mut self) -> Result<Option<String>, SpeechError> {
        while let Some(line) = self.lines.next_line().await? {
            let line = line.trim();
            if !line.is_empty() {
                return Ok(Some(line.to_string()));
            }
        }
        Ok(None)
    }
}

/// Prints replies to stdout prefixed with the assistant's name.
pub struct ConsoleOutput {
    name: String,
}

impl ConsoleOutput {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl SpeechOutput for ConsoleOutput {
    async fn say(&mut self, text: &str) -> Result<(), SpeechError> {
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(format!("{}: {}\n", self.name, text).as_bytes())
            .await?;
        stdout.flush().await?;
        Ok(())
    }
}
