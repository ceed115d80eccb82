use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::embedder::{EmbedError, Embedder};
use super::patterns::CANONICAL_PHRASES;
use super::types::{clamp_unit, Intent};

/// Nearest intent centroid for an utterance, with cosine rescaled into [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SemanticMatch {
    pub intent: Intent,
    pub similarity: f32,
}

/// Second classifier stage, consulted only when the rule stage is not confident.
#[async_trait]
pub trait SemanticFallback: Send + Sync {
    async fn semantic_match(&self, text: &str) -> Result<SemanticMatch, EmbedError>;
}

/// Embedding similarity against one mean vector per intent.
///
/// Centroids are computed on first use (or by [`prime`](Self::prime)) and are
/// immutable afterwards. Concurrent first calls share a single initialization.
pub struct SemanticMatcher {
    embedder: Box<dyn Embedder>,
    centroids: OnceCell<Vec<(Intent, Vec<f32>)>>,
}

impl SemanticMatcher {
    pub fn new(embedder: impl Embedder + 'static) -> Self {
        Self::with_boxed(Box::new(embedder))
    }

    pub fn with_boxed(embedder: Box<dyn Embedder>) -> Self {
        Self {
            embedder,
            centroids: OnceCell::new(),
        }
    }

    pub fn is_primed(&self) -> bool {
        self.centroids.initialized()
    }

    /// Compute centroids now instead of on the first fallback turn.
    pub async fn prime(&self) -> Result<(), EmbedError> {
        self.centroids().await.map(|_| ())
    }

    async fn centroids(&self) -> Result<&[(Intent, Vec<f32>)], EmbedError> {
        self.centroids
            .get_or_try_init(|| build_centroids(self.embedder.as_ref()))
            .await
            .map(Vec::as_slice)
    }
}

#[async_trait]
impl SemanticFallback for SemanticMatcher {
    async fn semantic_match(&self, text: &str) -> Result<SemanticMatch, EmbedError> {
        let centroids = self.centroids().await?;
        let input = self.embedder.embed(text).await?;

        let mut best: Option<SemanticMatch> = None;
        for (intent, centroid) in centroids {
            if centroid.len() != input.len() {
                return Err(EmbedError::Dimension {
                    expected: centroid.len(),
                    actual: input.len(),
                });
            }
            let similarity = rescale(cosine_similarity(&input, centroid));
            if best.map_or(true, |b| similarity > b.similarity) {
                best = Some(SemanticMatch {
                    intent: *intent,
                    similarity,
                });
            }
        }

        let best = best.unwrap_or(SemanticMatch {
            intent: Intent::Unknown,
            similarity: 0.0,
        });
        debug!(intent = %best.intent, similarity = best.similarity, "semantic match");
        Ok(best)
    }
}

async fn build_centroids(embedder: &dyn Embedder) -> Result<Vec<(Intent, Vec<f32>)>, EmbedError> {
    info!(embedder = embedder.name(), "computing intent centroids");

    let mut centroids = Vec::with_capacity(CANONICAL_PHRASES.len());
    let mut dimension: Option<usize> = None;

    for (intent, phrases) in CANONICAL_PHRASES {
        let vectors = embedder.embed_batch(phrases).await?;
        let centroid = mean(&vectors)?;

        match dimension {
            Some(expected) if expected != centroid.len() => {
                return Err(EmbedError::Dimension {
                    expected,
                    actual: centroid.len(),
                })
            }
            _ => dimension = Some(centroid.len()),
        }
        centroids.push((*intent, centroid));
    }

    info!(intents = centroids.len(), dimension = ?dimension, "intent centroids ready");
    Ok(centroids)
}

fn mean(vectors: &[Vec<f32>]) -> Result<Vec<f32>, EmbedError> {
    let Some(first) = vectors.first() else {
        return Err(EmbedError::Empty);
    };

    let mut acc = vec![0.0; first.len()];
    for vector in vectors {
        if vector.len() != acc.len() {
            return Err(EmbedError::Dimension {
                expected: acc.len(),
                actual: vector.len(),
            });
        }
        for (a, x) in acc.iter_mut().zip(vector) {
            *a += x;
        }
    }

    let n = vectors.len() as f32;
    for a in acc.iter_mut() {
        *a /= n;
    }
    Ok(acc)
}

/// Cosine of the angle between two vectors; 0 when either has zero length.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Map cosine from [-1, 1] onto [0, 1].
pub fn rescale(cosine: f32) -> f32 {
    clamp_unit((cosine + 1.0) / 2.0)
}
