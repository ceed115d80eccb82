#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use vox::intent::embedder::{EmbedError, Embedder};
use vox::intent::patterns::CANONICAL_PHRASES;
use vox::intent::{
    ClassificationResult, HybridClassifier, Intent, SemanticFallback, SemanticMatch, Slots,
};
use vox::kernel::{
    CapabilityRegistry, ExecutionController, ProcessError, ProcessOutput, ProcessRunner, Reactor,
};
use vox::speech::{SpeechError, SpeechOutput};

pub fn request(intent: Intent, slots: &[(&str, &str)]) -> ClassificationResult {
    let slots: Slots = slots
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    ClassificationResult::new(intent, 0.9, slots, "test utterance")
}

// --- Process runner ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Launch(String, Vec<String>),
    Run(String, Vec<String>),
}

#[derive(Debug, Clone)]
enum Scripted {
    Exit(i32, String),
    Timeout,
}

/// Records every process request. Nothing is actually started.
#[derive(Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<Call>>,
    missing: HashSet<String>,
    scripted: HashMap<String, Scripted>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn missing(mut self, program: &str) -> Self {
        self.missing.insert(program.to_string());
        self
    }

    pub fn exits(mut self, program: &str, code: i32) -> Self {
        self.scripted
            .insert(program.to_string(), Scripted::Exit(code, String::new()));
        self
    }

    pub fn prints(mut self, program: &str, stdout: &str) -> Self {
        self.scripted
            .insert(program.to_string(), Scripted::Exit(0, stdout.to_string()));
        self
    }

    pub fn times_out(mut self, program: &str) -> Self {
        self.scripted.insert(program.to_string(), Scripted::Timeout);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProcessRunner for RecordingRunner {
    async fn launch(&self, program: &str, args: &[String]) -> Result<(), ProcessError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Launch(program.to_string(), args.to_vec()));
        if self.missing.contains(program) {
            return Err(ProcessError::NotFound(program.to_string()));
        }
        Ok(())
    }

    async fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<ProcessOutput, ProcessError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Run(program.to_string(), args.to_vec()));
        if self.missing.contains(program) {
            return Err(ProcessError::NotFound(program.to_string()));
        }
        match self.scripted.get(program) {
            Some(Scripted::Timeout) => Err(ProcessError::Timeout {
                program: program.to_string(),
                timeout,
            }),
            Some(Scripted::Exit(code, stdout)) => Ok(ProcessOutput {
                code: Some(*code),
                stdout: stdout.clone(),
                stderr: String::new(),
            }),
            None => Ok(ProcessOutput {
                code: Some(0),
                ..Default::default()
            }),
        }
    }
}

// --- Semantic stage ---

/// Fixed answer for every utterance, counting how often it is asked.
pub struct CountingFallback {
    calls: AtomicUsize,
    answer: Option<SemanticMatch>,
}

impl CountingFallback {
    pub fn answering(intent: Intent, similarity: f32) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            answer: Some(SemanticMatch { intent, similarity }),
        }
    }

    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            answer: None,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SemanticFallback for CountingFallback {
    async fn semantic_match(&self, _text: &str) -> Result<SemanticMatch, EmbedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer.ok_or(EmbedError::Empty)
    }
}

pub const ONE_HOT_DIM: usize = 12;

/// Canonical phrases of the n-th intent embed to the n-th unit vector.
/// Other text uses the override table, or the zero vector.
#[derive(Default)]
pub struct OneHotEmbedder {
    overrides: HashMap<String, Vec<f32>>,
    calls: Arc<AtomicUsize>,
}

impl OneHotEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.overrides.insert(text.to_string(), vector);
        self
    }

    pub fn counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

pub fn unit(index: usize) -> Vec<f32> {
    let mut v = vec![0.0; ONE_HOT_DIM];
    v[index] = 1.0;
    v
}

#[async_trait]
impl Embedder for OneHotEmbedder {
    fn name(&self) -> &str {
        "one-hot"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(v) = self.overrides.get(text) {
            return Ok(v.clone());
        }
        let position = CANONICAL_PHRASES
            .iter()
            .position(|(_, phrases)| phrases.contains(&text));
        Ok(match position {
            Some(i) => unit(i),
            None => vec![0.0; ONE_HOT_DIM],
        })
    }
}

// --- Speech ---

/// Collects everything the assistant says.
#[derive(Clone, Default)]
pub struct Transcript(pub Arc<Mutex<Vec<String>>>);

impl Transcript {
    pub fn lines(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechOutput for Transcript {
    async fn say(&mut self, text: &str) -> Result<(), SpeechError> {
        self.0.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

// --- Assembly ---

pub fn reactor_with(
    fallback: Arc<CountingFallback>,
    runner: Arc<RecordingRunner>,
    registry: CapabilityRegistry,
    semantic_threshold: f32,
) -> Reactor {
    let registry = Arc::new(registry);
    let classifier = HybridClassifier::new(fallback).with_semantic_threshold(semantic_threshold);
    let controller = ExecutionController::new(registry.clone(), runner);
    Reactor::new(classifier, registry, controller)
}
