//! Two-stage intent classification.
//!
//! The rule stage is pure and synchronous. The semantic stage embeds text and
//! is only consulted by [`HybridClassifier`] when the rules are unsure.

pub mod bert;
pub mod embedder;
pub mod hybrid;
pub mod patterns;
pub mod rules;
pub mod semantic;
pub mod types;

pub use bert::BertEmbedder;
pub use embedder::{EmbedError, Embedder, HttpEmbedder};
pub use hybrid::{
    DecisionSource, HybridClassifier, HybridOutcome, RULE_ACCEPT_THRESHOLD,
    SEMANTIC_ACCEPT_THRESHOLD,
};
pub use rules::RuleClassifier;
pub use semantic::{SemanticFallback, SemanticMatch, SemanticMatcher};
pub use types::{ClassificationResult, Intent, Slots, SLOT_APP_NAME, SLOT_QUERY};
