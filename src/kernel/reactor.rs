use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use super::capability::CapabilityRegistry;
use super::execution::{ExecutionController, ExecutionResult, FailureKind};
use super::telemetry::{TelemetryEvent, TelemetryRecorder};
use crate::intent::{ClassificationResult, HybridClassifier, HybridOutcome, Intent};
use crate::policy::{self, Decision, Verdict};

pub const INTERRUPTED: &str = "Interrupted.";
pub const DECLINED: &str = "Okay, I won't.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnOutcome {
    /// Policy rejected the classification.
    Ambiguous,
    /// Confidence fell in the confirmation band; nothing ran.
    Deferred,
    /// User answered a confirmation prompt with no.
    Declined,
    /// Registry refused before dispatch.
    Denied,
    Executed,
    /// Handler ran and the action did not happen.
    Failed,
    /// Controller's own registry check refused.
    Blocked,
    Cancelled,
}

#[derive(Debug, Clone, Serialize)]
pub struct TurnReport {
    pub id: Uuid,
    pub classification: Option<HybridOutcome>,
    pub decision: Option<Decision>,
    pub execution: Option<ExecutionResult>,
    pub outcome: TurnOutcome,
    /// Text to speak back.
    pub response: String,
}

impl TurnReport {
    fn new(id: Uuid, outcome: TurnOutcome, response: impl Into<String>) -> Self {
        Self {
            id,
            classification: None,
            decision: None,
            execution: None,
            outcome,
            response: response.into(),
        }
    }

    /// A confirmation answered with no.
    pub fn declined() -> Self {
        Self::new(Uuid::new_v4(), TurnOutcome::Declined, DECLINED)
    }

    /// EXIT ran successfully.
    pub fn is_exit(&self) -> bool {
        self.outcome == TurnOutcome::Executed
            && self
                .execution
                .as_ref()
                .is_some_and(|e| e.intent() == Intent::Exit)
    }

    /// Classification awaiting a yes/no answer.
    pub fn pending_confirmation(&self) -> Option<&ClassificationResult> {
        if self.outcome != TurnOutcome::Deferred {
            return None;
        }
        self.classification.as_ref().map(|c| &c.result)
    }
}

/// Drives one utterance through classify -> decide -> authorize -> execute.
///
/// One turn at a time. The cancellation token is checked between stages; an
/// in-flight external call is left to its own timeout.
pub struct Reactor {
    classifier: HybridClassifier,
    registry: Arc<CapabilityRegistry>,
    controller: ExecutionController,
    pub telemetry: TelemetryRecorder,
}

impl Reactor {
    pub fn new(
        classifier: HybridClassifier,
        registry: Arc<CapabilityRegistry>,
        controller: ExecutionController,
    ) -> Self {
        Self {
            classifier,
            registry,
            controller,
            telemetry: TelemetryRecorder::new(),
        }
    }

    pub async fn turn(&mut self, text: &str, cancel: &CancellationToken) -> TurnReport {
        let id = Uuid::new_v4();
        self.run_turn(id, text, cancel)
            .instrument(info_span!("turn", %id))
            .await
    }

    /// Execute a classification the user confirmed. Skips the policy gate but
    /// not the registry.
    pub async fn confirm(&mut self, pending: ClassificationResult, cancel: &CancellationToken) -> TurnReport {
        let id = Uuid::new_v4();
        self.telemetry
            .record(TelemetryEvent::ConfirmationAnswered { accepted: true });

        self.run_confirmed(id, pending, cancel)
            .instrument(info_span!("turn", %id, confirmed = true))
            .await
    }

    pub fn decline(&mut self) -> TurnReport {
        self.telemetry
            .record(TelemetryEvent::ConfirmationAnswered { accepted: false });
        info!("pending request declined");
        TurnReport::declined()
    }

    async fn run_turn(&mut self, id: Uuid, text: &str, cancel: &CancellationToken) -> TurnReport {
        if cancel.is_cancelled() {
            return self.cancelled(id);
        }

        let outcome = self.classifier.classify(text).await;
        self.telemetry.record(TelemetryEvent::Classified {
            source: outcome.source,
            intent: outcome.result.intent(),
        });

        if cancel.is_cancelled() {
            return self.cancelled(id);
        }

        let decision = policy::decide_action(&outcome.result);
        self.telemetry.record(TelemetryEvent::PolicyDecided {
            verdict: decision.verdict,
        });

        let mut report = match decision.verdict {
            Verdict::Reject => TurnReport::new(id, TurnOutcome::Ambiguous, decision.response.clone()),
            Verdict::Confirm => TurnReport::new(id, TurnOutcome::Deferred, decision.response.clone()),
            Verdict::Execute => {
                info!(response = %decision.response, "executing");
                self.authorize_and_execute(id, outcome.result.clone(), false, cancel)
                    .await
            }
        };

        report.classification = Some(outcome);
        report.decision = Some(decision);
        report
    }

    async fn run_confirmed(
        &mut self,
        id: Uuid,
        pending: ClassificationResult,
        cancel: &CancellationToken,
    ) -> TurnReport {
        if cancel.is_cancelled() {
            return self.cancelled(id);
        }
        self.authorize_and_execute(id, pending, true, cancel).await
    }

    async fn authorize_and_execute(
        &mut self,
        id: Uuid,
        classification: ClassificationResult,
        confirmed: bool,
        cancel: &CancellationToken,
    ) -> TurnReport {
        let intent = classification.intent();

        if !self.registry.validate_capability(intent) {
            warn!(intent = %intent, "capability denied");
            self.telemetry.record(TelemetryEvent::Denied { intent });
            return TurnReport::new(
                id,
                TurnOutcome::Denied,
                format!("I'm not allowed to do that ({intent})."),
            );
        }

        if !confirmed && self.registry.requires_confirmation(intent) {
            warn!(
                intent = %intent,
                confidence = classification.confidence(),
                "intent requires confirmation but is auto-executing"
            );
        }

        if cancel.is_cancelled() {
            return self.cancelled(id);
        }

        let started = Instant::now();
        let result = self.controller.execute_intent(&classification).await;
        let latency_ms = started.elapsed().as_millis() as u64;

        self.telemetry.record(TelemetryEvent::Executed {
            intent,
            success: result.success(),
            latency_ms,
        });

        let outcome = match result.failure() {
            None => TurnOutcome::Executed,
            Some(FailureKind::Blocked) => TurnOutcome::Blocked,
            Some(FailureKind::Failed) => TurnOutcome::Failed,
        };

        let mut report = TurnReport::new(id, outcome, result.message());
        report.execution = Some(result);
        report
    }

    fn cancelled(&mut self, id: Uuid) -> TurnReport {
        info!("turn cancelled");
        self.telemetry.record(TelemetryEvent::TurnCancelled);
        TurnReport::new(id, TurnOutcome::Cancelled, INTERRUPTED)
    }
}
