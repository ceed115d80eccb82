use async_trait::async_trait;
use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config, DTYPE};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokenizers::{Tokenizer, TruncationParams};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::embedder::{EmbedError, Embedder};

pub const CONFIG_FILE: &str = "config.json";
pub const TOKENIZER_FILE: &str = "tokenizer.json";
pub const WEIGHTS_FILE: &str = "model.safetensors";

/// all-MiniLM-L6-v2 was trained on sequences of this length.
const MAX_TOKENS: usize = 128;

/// Pretrained BERT-family sentence encoder run on the CPU.
///
/// Expects a Hugging Face model directory (`config.json`, `tokenizer.json`,
/// `model.safetensors`), by default sentence-transformers/all-MiniLM-L6-v2.
/// Weights are loaded on first use and never change afterwards. Token states
/// are mean-pooled over the attention mask and L2-normalized.
pub struct BertEmbedder {
    model_dir: PathBuf,
    name: String,
    model: OnceCell<Arc<SentenceModel>>,
}

impl BertEmbedder {
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        let model_dir = model_dir.into();
        let name = model_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "bert".to_string());

        Self {
            model_dir,
            name,
            model: OnceCell::new(),
        }
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    pub fn missing_files(&self) -> Vec<PathBuf> {
        missing_files(&self.model_dir)
    }

    pub fn is_loaded(&self) -> bool {
        self.model.initialized()
    }

    async fn model(&self) -> Result<Arc<SentenceModel>, EmbedError> {
        self.model
            .get_or_try_init(|| async {
                let dir = self.model_dir.clone();
                tokio::task::spawn_blocking(move || SentenceModel::load(&dir).map(Arc::new))
                    .await
                    .map_err(|e| EmbedError::Model(format!("model loader panicked: {e}")))?
            })
            .await
            .cloned()
    }
}

#[async_trait]
impl Embedder for BertEmbedder {
    fn name(&self) -> &str {
        &self.name
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let model = self.model().await?;
        let text = text.to_string();

        tokio::task::spawn_blocking(move || model.encode(&text))
            .await
            .map_err(|e| EmbedError::Model(format!("inference panicked: {e}")))?
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
        let model = self.model().await?;
        let texts: Vec<String> = texts.iter().map(|t| t.to_string()).collect();

        tokio::task::spawn_blocking(move || {
            texts
                .iter()
                .map(|t| model.encode(t))
                .collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(|e| EmbedError::Model(format!("inference panicked: {e}")))?
    }
}

fn missing_files(dir: &Path) -> Vec<PathBuf> {
    [CONFIG_FILE, TOKENIZER_FILE, WEIGHTS_FILE]
        .iter()
        .map(|file| dir.join(file))
        .filter(|path| !path.exists())
        .collect()
}

struct SentenceModel {
    tokenizer: Tokenizer,
    bert: BertModel,
    device: Device,
}

impl SentenceModel {
    fn load(dir: &Path) -> Result<Self, EmbedError> {
        if let Some(path) = missing_files(dir).into_iter().next() {
            return Err(EmbedError::MissingFile(path));
        }

        let device = Device::Cpu;
        let config: Config = serde_json::from_str(&fs::read_to_string(dir.join(CONFIG_FILE))?)?;

        let mut tokenizer = Tokenizer::from_file(dir.join(TOKENIZER_FILE))
            .map_err(|e| EmbedError::Model(format!("failed to load tokenizer: {e}")))?;
        tokenizer.with_padding(None);
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_TOKENS,
                ..Default::default()
            }))
            .map_err(|e| EmbedError::Model(format!("failed to configure truncation: {e}")))?;

        let weights = candle_core::safetensors::load(dir.join(WEIGHTS_FILE), &device)?;
        let vb = VarBuilder::from_tensors(weights, DTYPE, &device);
        let bert = BertModel::load(vb, &config)?;

        info!(dir = %dir.display(), "sentence model loaded");
        Ok(Self {
            tokenizer,
            bert,
            device,
        })
    }

    fn encode(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| EmbedError::Model(format!("tokenization failed: {e}")))?;

        let ids = Tensor::new(encoding.get_ids(), &self.device)?.unsqueeze(0)?;
        let type_ids = Tensor::new(encoding.get_type_ids(), &self.device)?.unsqueeze(0)?;
        let mask = Tensor::new(encoding.get_attention_mask(), &self.device)?.unsqueeze(0)?;

        // (1, tokens, hidden)
        let hidden = self.bert.forward(&ids, &type_ids, Some(&mask))?;

        let weights = mask.to_dtype(DTYPE)?.unsqueeze(2)?;
        let summed = hidden.broadcast_mul(&weights)?.sum(1)?;
        let pooled = summed.broadcast_div(&weights.sum(1)?)?;

        let mut vector = pooled.squeeze(0)?.to_vec1::<f32>()?;
        if vector.iter().any(|v| !v.is_finite()) {
            return Err(EmbedError::Model("embedding contains non-finite values".into()));
        }
        normalize(&mut vector);

        debug!(tokens = encoding.get_ids().len(), dims = vector.len(), "embedded text");
        Ok(vector)
    }
}

fn normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
}
