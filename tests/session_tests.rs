mod common;

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use common::{reactor_with, Call, CountingFallback, RecordingRunner, Transcript};
use vox::config::AssistantConfig;
use vox::intent::{Intent, SEMANTIC_ACCEPT_THRESHOLD};
use vox::kernel::CapabilityRegistry;
use vox::session::{Reply, SessionEnd};
use vox::speech::ConsoleInput;
use vox::Session;

struct Run {
    lines: Vec<String>,
    calls: Vec<Call>,
    summary: vox::session::SessionSummary,
}

async fn run_session(script: &'static str, fallback: CountingFallback, threshold: f32, cancel: CancellationToken) -> Run {
    let runner = Arc::new(RecordingRunner::new());
    let reactor = reactor_with(
        Arc::new(fallback),
        runner.clone(),
        CapabilityRegistry::builtin(),
        threshold,
    );
    let transcript = Transcript::default();
    let input = ConsoleInput::from_reader(script.as_bytes());

    let summary = Session::new(
        reactor,
        input,
        transcript.clone(),
        AssistantConfig::default(),
        cancel,
    )
    .run()
    .await
    .unwrap();

    Run {
        lines: transcript.lines(),
        calls: runner.calls(),
        summary,
    }
}

fn quiet_fallback() -> CountingFallback {
    CountingFallback::answering(Intent::Greeting, 0.1)
}

#[test]
fn test_reply_parsing() {
    assert_eq!(Reply::parse("Yes."), Reply::Affirmative);
    assert_eq!(Reply::parse("  do it "), Reply::Affirmative);
    assert_eq!(Reply::parse("okay"), Reply::Affirmative);
    assert_eq!(Reply::parse("Never mind"), Reply::Negative);
    assert_eq!(Reply::parse("nope!"), Reply::Negative);
    assert_eq!(Reply::parse("open chrome"), Reply::Other);
}

#[tokio::test]
async fn test_session_runs_until_exit() {
    let run = run_session(
        "hello\n\nexit\nopen firefox\n",
        quiet_fallback(),
        SEMANTIC_ACCEPT_THRESHOLD,
        CancellationToken::new(),
    )
    .await;

    assert_eq!(run.summary.end, SessionEnd::Exit);
    assert_eq!(run.summary.turns, 2, "Blank lines are skipped and nothing after EXIT runs");
    assert!(run.calls.is_empty());

    assert_eq!(run.lines.len(), 4);
    assert!(run.lines[0].ends_with("Sir. Assistant is ready and systems are online."));
    assert_eq!(run.lines[1], "Hello! How can I help you?");
    assert_eq!(run.lines[2], "Goodbye!");
    assert_eq!(run.lines[3], "Goodbye. Assistant shutting down.");
}

#[tokio::test]
async fn test_session_ends_at_end_of_input() {
    let run = run_session(
        "do the thing\n",
        quiet_fallback(),
        SEMANTIC_ACCEPT_THRESHOLD,
        CancellationToken::new(),
    )
    .await;

    assert_eq!(run.summary.end, SessionEnd::EndOfInput);
    assert_eq!(run.lines[1], "I did not understand that. Could you repeat?");
    assert_eq!(run.summary.telemetry.policy.rejected, 1);
}

#[tokio::test]
async fn test_confirmation_yes_executes() {
    let run = run_session(
        "firefox\nyes\n",
        CountingFallback::answering(Intent::OpenApp, 0.7),
        0.6,
        CancellationToken::new(),
    )
    .await;

    assert_eq!(run.lines[1], "Did you want me to open firefox?");
    assert_eq!(run.lines[2], "Opened firefox");
    assert_eq!(run.calls, vec![Call::Launch("firefox".to_string(), vec![])]);
    assert_eq!(run.summary.telemetry.confirmations.accepted, 1);
}

#[tokio::test]
async fn test_confirmation_no_declines() {
    let run = run_session(
        "firefox\nno\n",
        CountingFallback::answering(Intent::OpenApp, 0.7),
        0.6,
        CancellationToken::new(),
    )
    .await;

    assert_eq!(run.lines[2], "Okay, I won't.");
    assert!(run.calls.is_empty());
    assert_eq!(run.summary.telemetry.confirmations.declined, 1);
}

#[tokio::test]
async fn test_unrelated_reply_drops_pending_request() {
    let run = run_session(
        "firefox\nhello\nyes\n",
        CountingFallback::answering(Intent::OpenApp, 0.7),
        0.6,
        CancellationToken::new(),
    )
    .await;

    assert_eq!(run.lines[2], "Hello! How can I help you?");
    assert!(run.calls.is_empty(), "The earlier request must not run after an unrelated reply");
}

#[tokio::test]
async fn test_interrupt_before_first_turn() {
    let cancel = CancellationToken::new();
    cancel.cancel();

    let run = run_session("open firefox\n", quiet_fallback(), SEMANTIC_ACCEPT_THRESHOLD, cancel).await;

    assert_eq!(run.summary.end, SessionEnd::Interrupted);
    assert_eq!(run.summary.turns, 0);
    assert_eq!(run.lines.last().map(String::as_str), Some("Interrupted. Shutting down."));
    assert!(run.calls.is_empty());
}
