use serde::Serialize;

use crate::intent::{DecisionSource, Intent};
use crate::policy::Verdict;

// Allowed: enums, counts, durations
// Forbidden: transcripts, slot values, URLs, embeddings

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TelemetryEvent {
    Classified {
        source: DecisionSource,
        intent: Intent,
    },

    PolicyDecided {
        verdict: Verdict,
    },

    /// Registry refused before dispatch.
    Denied {
        intent: Intent,
    },

    Executed {
        intent: Intent,
        success: bool,
        latency_ms: u64,
    },

    ConfirmationAnswered {
        accepted: bool,
    },

    TurnCancelled,

    SessionSummary {
        duration_ms: u64,
        turns: u64,
        executions: u64,
        failures: u64,
    },
}
