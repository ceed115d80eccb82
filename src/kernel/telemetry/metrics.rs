use serde::Serialize;
use std::collections::VecDeque;

use super::event::TelemetryEvent;
use crate::intent::DecisionSource;
use crate::policy::Verdict;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TelemetrySnapshot {
    pub classification: ClassificationStats,
    pub policy: PolicyStats,
    pub execution: ExecutionStats,
    pub confirmations: ConfirmationStats,
    pub cancelled_turns: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClassificationStats {
    pub turns: u64,
    pub by_rule: u64,
    pub by_semantic: u64,
    pub unresolved: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PolicyStats {
    pub rejected: u64,
    pub confirm_requests: u64,
    pub executed: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExecutionStats {
    pub succeeded: u64,
    pub failed: u64,
    pub denied: u64,
    pub total_latency_ms: u64,
    pub avg_latency_ms: f64,
    pub max_latency_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConfirmationStats {
    pub accepted: u64,
    pub declined: u64,
}

pub fn compute_snapshot(events: &VecDeque<TelemetryEvent>) -> TelemetrySnapshot {
    let mut snap = TelemetrySnapshot::default();

    for event in events {
        match event {
            TelemetryEvent::Classified { source, .. } => {
                snap.classification.turns += 1;
                match source {
                    DecisionSource::Rule => snap.classification.by_rule += 1,
                    DecisionSource::Semantic => snap.classification.by_semantic += 1,
                    DecisionSource::None => snap.classification.unresolved += 1,
                }
            }
            TelemetryEvent::PolicyDecided { verdict } => match verdict {
                Verdict::Reject => snap.policy.rejected += 1,
                Verdict::Confirm => snap.policy.confirm_requests += 1,
                Verdict::Execute => snap.policy.executed += 1,
            },
            TelemetryEvent::Denied { .. } => snap.execution.denied += 1,
            TelemetryEvent::Executed {
                success,
                latency_ms,
                ..
            } => {
                if *success {
                    snap.execution.succeeded += 1;
                } else {
                    snap.execution.failed += 1;
                }
                snap.execution.total_latency_ms += latency_ms;
                snap.execution.max_latency_ms = snap.execution.max_latency_ms.max(*latency_ms);
            }
            TelemetryEvent::ConfirmationAnswered { accepted } => {
                if *accepted {
                    snap.confirmations.accepted += 1;
                } else {
                    snap.confirmations.declined += 1;
                }
            }
            TelemetryEvent::TurnCancelled => snap.cancelled_turns += 1,
            TelemetryEvent::SessionSummary { .. } => {}
        }
    }

    let executions = snap.execution.succeeded + snap.execution.failed;
    if executions > 0 {
        snap.execution.avg_latency_ms = snap.execution.total_latency_ms as f64 / executions as f64;
    }

    snap
}
