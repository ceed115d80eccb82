use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use super::rules::RuleClassifier;
use super::semantic::SemanticFallback;
use super::types::{ClassificationResult, Intent};

/// Rule confidence at which the semantic stage is skipped.
pub const RULE_ACCEPT_THRESHOLD: f32 = 0.75;
/// Minimum rescaled similarity for a semantic match to be accepted.
pub const SEMANTIC_ACCEPT_THRESHOLD: f32 = 0.83;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionSource {
    Rule,
    Semantic,
    None,
}

/// Final classification plus what each stage saw.
#[derive(Debug, Clone, Serialize)]
pub struct HybridOutcome {
    pub result: ClassificationResult,
    pub rule_intent: Intent,
    pub rule_confidence: f32,
    pub semantic_intent: Option<Intent>,
    pub semantic_similarity: Option<f32>,
    pub source: DecisionSource,
}

/// Rules first, embeddings only when the rules are unsure. Never blends scores.
pub struct HybridClassifier {
    rules: RuleClassifier,
    semantic: Arc<dyn SemanticFallback>,
    semantic_threshold: f32,
}

impl HybridClassifier {
    pub fn new(semantic: Arc<dyn SemanticFallback>) -> Self {
        Self {
            rules: RuleClassifier::new(),
            semantic,
            semantic_threshold: SEMANTIC_ACCEPT_THRESHOLD,
        }
    }

    pub fn with_semantic_threshold(mut self, threshold: f32) -> Self {
        self.semantic_threshold = threshold;
        self
    }

    pub fn semantic_threshold(&self) -> f32 {
        self.semantic_threshold
    }

    pub async fn classify(&self, text: &str) -> HybridOutcome {
        let rule = self.rules.classify(text);
        let rule_intent = rule.intent();
        let rule_confidence = rule.confidence();

        if rule_confidence >= RULE_ACCEPT_THRESHOLD {
            info!(intent = %rule_intent, confidence = rule_confidence, "rule classifier accepted");
            return HybridOutcome {
                result: rule,
                rule_intent,
                rule_confidence,
                semantic_intent: None,
                semantic_similarity: None,
                source: DecisionSource::Rule,
            };
        }

        let semantic = match self.semantic.semantic_match(text).await {
            Ok(m) => m,
            Err(e) => {
                warn!(error = %e, "semantic fallback failed, treating as unknown");
                return HybridOutcome {
                    result: ClassificationResult::unknown(0.0, text),
                    rule_intent,
                    rule_confidence,
                    semantic_intent: None,
                    semantic_similarity: None,
                    source: DecisionSource::None,
                };
            }
        };

        let (result, source) = if semantic.similarity >= self.semantic_threshold {
            info!(
                intent = %semantic.intent,
                similarity = semantic.similarity,
                rule_intent = %rule_intent,
                rule_confidence,
                "semantic fallback accepted"
            );
            let slots = rule.slots().clone();
            (
                ClassificationResult::new(semantic.intent, semantic.similarity, slots, text),
                DecisionSource::Semantic,
            )
        } else {
            info!(
                rule_intent = %rule_intent,
                rule_confidence,
                semantic_intent = %semantic.intent,
                similarity = semantic.similarity,
                "no stage confident, unknown"
            );
            (ClassificationResult::unknown(0.0, text), DecisionSource::None)
        };

        HybridOutcome {
            result,
            rule_intent,
            rule_confidence,
            semantic_intent: Some(semantic.intent),
            semantic_similarity: Some(semantic.similarity),
            source,
        }
    }
}
