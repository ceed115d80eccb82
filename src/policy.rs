//! Confidence-gated decision between rejecting, confirming and executing.

use serde::Serialize;
use tracing::info;

use crate::intent::{ClassificationResult, Intent, SLOT_APP_NAME, SLOT_QUERY};

/// Confidence below this is rejected outright.
pub const REJECT_BELOW: f32 = 0.6;
/// Confidence at or above this executes without asking.
pub const EXECUTE_AT: f32 = 0.75;

pub const NOT_UNDERSTOOD: &str = "I did not understand that. Could you repeat?";
pub const NOT_SURE: &str = "I'm not sure what you said. Please repeat.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Reject,
    Confirm,
    Execute,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decision {
    pub verdict: Verdict,
    pub response: String,
}

impl Decision {
    pub fn should_execute(&self) -> bool {
        self.verdict == Verdict::Execute
    }

    /// `(response_text, should_execute)`
    pub fn into_parts(self) -> (String, bool) {
        let execute = self.should_execute();
        (self.response, execute)
    }
}

pub fn decide_action(result: &ClassificationResult) -> Decision {
    let intent = result.intent();
    let confidence = result.confidence();

    let decision = if intent.is_unknown() {
        Decision {
            verdict: Verdict::Reject,
            response: NOT_UNDERSTOOD.to_string(),
        }
    } else if confidence < REJECT_BELOW {
        Decision {
            verdict: Verdict::Reject,
            response: NOT_SURE.to_string(),
        }
    } else if confidence < EXECUTE_AT {
        Decision {
            verdict: Verdict::Confirm,
            response: format!("Did you want me to {}?", describe_action(result)),
        }
    } else {
        Decision {
            verdict: Verdict::Execute,
            response: format!("Intent detected: {intent}"),
        }
    };

    info!(
        intent = %intent,
        confidence,
        transcript = result.raw_text(),
        verdict = ?decision.verdict,
        "policy decision"
    );
    decision
}

/// Short imperative phrase for confirmation prompts.
pub fn describe_action(result: &ClassificationResult) -> String {
    let app = result.slot(SLOT_APP_NAME);
    let query = result.slot(SLOT_QUERY);

    match result.intent() {
        Intent::OpenApp => format!("open {}", app.unwrap_or("an application")),
        Intent::CloseApp => format!("close {}", app.unwrap_or("an application")),
        Intent::SearchWeb => format!("search for {}", query.unwrap_or("something")),
        Intent::PlayMusic => "play music".to_string(),
        Intent::StopMusic => "stop music".to_string(),
        Intent::GetTime => "tell you the time".to_string(),
        Intent::GetDate => "tell you the date".to_string(),
        Intent::SystemInfo => "show system information".to_string(),
        Intent::Greeting => "greet you".to_string(),
        Intent::Exit => "exit".to_string(),
        Intent::PlayYoutube => format!("play {} on YouTube", query.unwrap_or("a video")),
        Intent::SearchYoutube => format!("search YouTube for {}", query.unwrap_or("something")),
        Intent::Unknown => "do something".to_string(),
    }
}
