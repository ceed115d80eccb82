use std::collections::HashMap;
use std::fs;
use tempfile::TempDir;

use vox::config::{ConfigError, EmbedderKind, SpeechMode, VoxConfig};
use vox::intent::SEMANTIC_ACCEPT_THRESHOLD;

#[test]
fn test_missing_file_returns_defaults() {
    let dir = TempDir::new().unwrap();
    let config = VoxConfig::load_from(dir.path().join("absent.toml")).unwrap();

    assert_eq!(config, VoxConfig::default());
    assert_eq!(config.assistant.name, "Assistant");
    assert_eq!(config.assistant.user_title, "Sir");
    assert_eq!(config.classifier.semantic_threshold, SEMANTIC_ACCEPT_THRESHOLD);
    assert_eq!(config.semantic.embedder, EmbedderKind::Local);
    assert_eq!(
        config.semantic.model_dir,
        std::path::PathBuf::from("models/all-MiniLM-L6-v2")
    );
    assert_eq!(config.speech.mode, SpeechMode::Console);
    assert_eq!(config.speech.record_seconds, 3);
    assert_eq!(config.execution.browser, "brave-browser");
}

#[test]
fn test_partial_file_keeps_other_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("vox.toml");
    fs::write(
        &path,
        r#"
[assistant]
name = "Jarvis"

[semantic]
embedder = "http"
url = "http://127.0.0.1:11434"

[speech]
mode = "voice"
record_seconds = 5

[execution]
browser = "firefox"
browser_args = []
"#,
    )
    .unwrap();

    let config = VoxConfig::load_from(&path).unwrap();

    assert_eq!(config.assistant.name, "Jarvis");
    assert_eq!(config.assistant.user_title, "Sir");
    assert_eq!(config.semantic.embedder, EmbedderKind::Http);
    assert_eq!(config.semantic.url, "http://127.0.0.1:11434");
    assert_eq!(config.speech.mode, SpeechMode::Voice);
    assert_eq!(config.speech.record_seconds, 5);
    assert_eq!(config.speech.sample_rate, 16_000);

    let browser = config.execution.browser_launcher();
    assert_eq!(browser.program, "firefox");
    assert!(browser.args.is_empty());
    assert_eq!(browser.fallback, "xdg-open");
}

#[test]
fn test_invalid_toml_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[assistant\nname = ").unwrap();

    let err = VoxConfig::load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "Got {err}");
}

#[test]
fn test_environment_overrides() {
    let env: HashMap<&str, &str> = [
        ("ASSISTANT_NAME", " Friday "),
        ("VOX_EMBEDDER_URL", "http://gpu-box:8080"),
    ]
    .into_iter()
    .collect();

    let mut config = VoxConfig::default();
    config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

    assert_eq!(config.assistant.name, "Friday");
    assert_eq!(config.semantic.embedder, EmbedderKind::Http);
    assert_eq!(config.semantic.url, "http://gpu-box:8080");
}

#[test]
fn test_blank_overrides_are_ignored() {
    let mut config = VoxConfig::default();
    config.apply_overrides(|_| Some("   ".to_string()));

    assert_eq!(config, VoxConfig::default());
}
