use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use super::bert::BertEmbedder;
use crate::config::{EmbedderKind, SemanticConfig};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("embedding request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("embedding server returned {0}")]
    Status(reqwest::StatusCode),
    #[error("expected {expected} embeddings, got {actual}")]
    Count { expected: usize, actual: usize },
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    Dimension { expected: usize, actual: usize },
    #[error("no embeddings to average")]
    Empty,
    #[error("model file missing: {}", .0.display())]
    MissingFile(PathBuf),
    #[error("failed to read model: {0}")]
    Io(#[from] io::Error),
    #[error("invalid model config: {0}")]
    Config(#[from] serde_json::Error),
    #[error("inference failed: {0}")]
    Inference(#[from] candle_core::Error),
    #[error("{0}")]
    Model(String),
}

/// Frozen text-to-vector model. Inference only.
#[async_trait]
pub trait Embedder: Send + Sync {
    fn name(&self) -> &str;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }
}

/// Build the embedder selected in configuration.
pub fn from_config(config: &SemanticConfig) -> Result<Box<dyn Embedder>, EmbedError> {
    let embedder: Box<dyn Embedder> = match config.embedder {
        EmbedderKind::Local => Box::new(BertEmbedder::new(config.model_dir.clone())),
        EmbedderKind::Http => Box::new(HttpEmbedder::new(&config.url, &config.model)?),
    };
    Ok(embedder)
}

/// Client for an OpenAI-compatible `/v1/embeddings` endpoint
/// (llama.cpp server, Ollama).
#[derive(Clone)]
pub struct HttpEmbedder {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a [&'a str],
    model: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

impl HttpEmbedder {
    pub fn new(base_url: &str, model: &str) -> Result<Self, EmbedError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    fn name(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let mut vectors = self.embed_batch(&[text]).await?;
        vectors.pop().ok_or(EmbedError::Count {
            expected: 1,
            actual: 0,
        })
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
        let request = EmbeddingRequest {
            input: texts,
            model: &self.model,
        };

        let response = self
            .client
            .post(format!("{}/v1/embeddings", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(EmbedError::Status(response.status()));
        }

        let mut body: EmbeddingResponse = response.json().await?;
        if body.data.len() != texts.len() {
            return Err(EmbedError::Count {
                expected: texts.len(),
                actual: body.data.len(),
            });
        }

        body.data.sort_by_key(|d| d.index);
        Ok(body.data.into_iter().map(|d| d.embedding).collect())
    }
}
