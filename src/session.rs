use chrono::{Local, Timelike};
use serde::Serialize;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::AssistantConfig;
use crate::greeting;
use crate::intent::ClassificationResult;
use crate::kernel::telemetry::TelemetrySnapshot;
use crate::kernel::{Reactor, TurnOutcome, TurnReport};
use crate::speech::{SpeechError, SpeechInput, SpeechOutput};

const AFFIRMATIVE: &[&str] = &["yes", "yeah", "yep", "sure", "ok", "okay", "confirm", "do it"];
const NEGATIVE: &[&str] = &["no", "nope", "cancel", "never mind"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Affirmative,
    Negative,
    Other,
}

impl Reply {
    pub fn parse(text: &str) -> Self {
        let normalized = text
            .trim()
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();

        if AFFIRMATIVE.contains(&normalized.as_str()) {
            Reply::Affirmative
        } else if NEGATIVE.contains(&normalized.as_str()) {
            Reply::Negative
        } else {
            Reply::Other
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEnd {
    Exit,
    EndOfInput,
    Interrupted,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub end: SessionEnd,
    pub turns: u64,
    pub telemetry: TelemetrySnapshot,
}

/// Read, classify, act, reply; until EXIT, end of input, or cancellation.
pub struct Session<I, O> {
    reactor: Reactor,
    input: I,
    output: O,
    assistant: AssistantConfig,
    cancel: CancellationToken,
    pending: Option<ClassificationResult>,
}

impl<I: SpeechInput, O: SpeechOutput> Session<I, O> {
    pub fn new(
        reactor: Reactor,
        input: I,
        output: O,
        assistant: AssistantConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            reactor,
            input,
            output,
            assistant,
            cancel,
            pending: None,
        }
    }

    pub async fn run(mut self) -> Result<SessionSummary, SpeechError> {
        let started = Instant::now();
        let mut turns = 0u64;

        let hello = greeting::startup_greeting(
            &self.assistant.name,
            &self.assistant.user_title,
            Local::now().hour(),
        );
        self.output.say(&hello).await?;

        let end = loop {
            let heard = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break SessionEnd::Interrupted,
                heard = self.input.listen() => heard?,
            };

            let Some(text) = heard else {
                break SessionEnd::EndOfInput;
            };

            turns += 1;
            let report = self.handle(&text).await;
            info!(outcome = ?report.outcome, turn = %report.id, "turn finished");

            if report.outcome == TurnOutcome::Cancelled {
                break SessionEnd::Interrupted;
            }

            self.output.say(&report.response).await?;

            if report.is_exit() {
                break SessionEnd::Exit;
            }
        };

        let farewell = match end {
            SessionEnd::Interrupted => greeting::interrupt_message().to_string(),
            _ => greeting::shutdown_message(&self.assistant.name),
        };
        if let Err(e) = self.output.say(&farewell).await {
            warn!(error = %e, "could not speak farewell");
        }

        let summary = self
            .reactor
            .telemetry
            .aggregate_session(started.elapsed().as_millis() as u64);
        self.reactor.telemetry.record(summary);

        info!(end = ?end, turns, "session ended");
        Ok(SessionSummary {
            end,
            turns,
            telemetry: self.reactor.telemetry.snapshot(),
        })
    }

    async fn handle(&mut self, text: &str) -> TurnReport {
        if let Some(pending) = self.pending.take() {
            match Reply::parse(text) {
                Reply::Affirmative => return self.reactor.confirm(pending, &self.cancel).await,
                Reply::Negative => return self.reactor.decline(),
                Reply::Other => info!("pending request dropped for new utterance"),
            }
        }

        let report = self.reactor.turn(text, &self.cancel).await;
        self.pending = report.pending_confirmation().cloned();
        report
    }
}
