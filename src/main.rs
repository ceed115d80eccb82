use anyhow::bail;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use vox::config::{SpeechMode, VoxConfig};
use vox::intent::{embedder, HybridClassifier, SemanticMatcher};
use vox::kernel::{CapabilityRegistry, ExecutionController, Reactor, SystemRunner};
use vox::speech::{ConsoleInput, ConsoleOutput, PiperSpeaker, VoiceInput};
use vox::{logging, policy, Session};

#[derive(Debug, Parser)]
#[command(name = "vox", version, about = "Offline voice command assistant")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Use microphone and speaker instead of the console.
    #[arg(long)]
    voice: bool,

    /// Classify one utterance, print the decision as JSON and exit. Nothing is executed.
    #[arg(long, value_name = "TEXT")]
    classify: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = VoxConfig::load(cli.config.as_deref())?;
    let _log_guard = logging::init(&config.logging)?;

    info!("Vox booting...");

    let matcher = Arc::new(SemanticMatcher::with_boxed(embedder::from_config(&config.semantic)?));
    let classifier = HybridClassifier::new(matcher.clone())
        .with_semantic_threshold(config.classifier.semantic_threshold);

    if let Some(text) = cli.classify {
        let outcome = classifier.classify(&text).await;
        let decision = policy::decide_action(&outcome.result);
        let report = serde_json::json!({ "classification": outcome, "decision": decision });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if let Err(e) = matcher.prime().await {
        warn!(error = %e, "semantic matcher unavailable, uncertain utterances will be rejected");
    }

    let registry = Arc::new(CapabilityRegistry::builtin());
    let controller = ExecutionController::new(registry.clone(), Arc::new(SystemRunner))
        .with_browser(config.execution.browser_launcher());
    let reactor = Reactor::new(classifier, registry, controller);

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let assistant = config.assistant.clone();
    let summary = if cli.voice || config.speech.mode == SpeechMode::Voice {
        let input = VoiceInput::from_config(&config.speech);
        let output = PiperSpeaker::from_config(&config.speech);

        let missing: Vec<_> = input
            .transcriber()
            .missing_files()
            .into_iter()
            .chain(output.missing_files())
            .map(|p| p.display().to_string())
            .collect();
        if !missing.is_empty() {
            bail!("voice mode needs: {}", missing.join(", "));
        }

        Session::new(reactor, input, output, assistant, cancel).run().await?
    } else {
        let output = ConsoleOutput::new(&assistant.name);
        Session::new(reactor, ConsoleInput::stdin(), output, assistant, cancel)
            .run()
            .await?
    };

    info!(
        end = ?summary.end,
        turns = summary.turns,
        executed = summary.telemetry.execution.succeeded,
        "Vox stopped"
    );
    Ok(())
}
