//! Query classification: priority-ordered mapping of feature scores to a
//! response category.
//!
//! Categories are not mutually exclusive by score alone (a query can score
//! high on both factual and creative), so the ladder order below *is* the
//! classifier's core design decision: the first satisfied rule wins.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::features::QueryFeatures;
use crate::lexicon::KeywordLexicon;

/// The response category assigned to an utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryCategory {
    /// Faults and hazards: answered from the manual, immediately.
    Emergency,
    /// Technical/maintenance/feature lookups: answered from the manual.
    Factual,
    /// Open-ended requests: answered by the generator alone.
    Creative,
    /// Multi-factor questions: answered by retrieval plus generation.
    Complex,
    /// Nothing matched confidently: falls back to the hybrid strategy.
    Unknown,
}

/// The result of classifying one utterance.
///
/// Created per call and consumed immediately by the orchestrator; never
/// persisted.
#[derive(Debug, Clone)]
pub struct QueryClassification {
    pub category: QueryCategory,
    /// The score of the rule that fired, 0.0 for `Unknown`.
    pub confidence: f32,
    /// Human-readable explanation of the decision.
    pub reason: String,
    /// True when urgency exceeds the immediate-response threshold.
    pub requires_immediate_response: bool,
}

/// Urgency above this threshold forces the emergency path and the
/// immediate-response flag.
const URGENCY_THRESHOLD: f32 = 0.7;
const FACTUAL_THRESHOLD: f32 = 0.5;
const CREATIVE_THRESHOLD: f32 = 0.6;
const COMPLEXITY_THRESHOLD: f32 = 0.6;

/// Keyword-driven query classifier.
///
/// Pure function of the lexicon and the utterance; holds no state across
/// calls. The lexicon is shared by read-only reference and never mutated.
pub struct QueryClassifier {
    lexicon: Arc<KeywordLexicon>,
}

impl QueryClassifier {
    /// Create a classifier over a shared lexicon.
    pub fn new(lexicon: Arc<KeywordLexicon>) -> Self {
        Self { lexicon }
    }

    /// Create a classifier over the built-in vocabulary.
    pub fn with_builtin_lexicon() -> Self {
        Self::new(Arc::new(KeywordLexicon::builtin()))
    }

    /// The lexicon this classifier matches against.
    pub fn lexicon(&self) -> &KeywordLexicon {
        &self.lexicon
    }

    /// Extract features for an utterance without classifying it.
    pub fn analyze(&self, utterance: &str) -> QueryFeatures {
        QueryFeatures::extract(&self.lexicon, utterance)
    }

    /// Classify an utterance.
    ///
    /// Never fails: an empty lexicon yields `Unknown` with zero confidence
    /// and an explanatory reason so downstream dispatch stays total.
    pub fn classify(&self, utterance: &str) -> QueryClassification {
        if self.lexicon.is_empty() {
            return QueryClassification {
                category: QueryCategory::Unknown,
                confidence: 0.0,
                reason: "keyword lexicon is empty; no features available".to_string(),
                requires_immediate_response: false,
            };
        }

        let features = self.analyze(utterance);
        let requires_immediate_response = features.urgency > URGENCY_THRESHOLD;

        // Ordered (predicate, category, confidence, reason) ladder.
        let ladder = [
            (
                features.urgency > URGENCY_THRESHOLD || features.contains_emergency_words,
                QueryCategory::Emergency,
                features.urgency,
                format!("urgency {:.2} or emergency keyword present", features.urgency),
            ),
            (
                features.factual >= FACTUAL_THRESHOLD,
                QueryCategory::Factual,
                features.factual,
                format!("factual score {:.2} >= {:.2}", features.factual, FACTUAL_THRESHOLD),
            ),
            (
                features.creative > CREATIVE_THRESHOLD,
                QueryCategory::Creative,
                features.creative,
                format!("creative score {:.2} > {:.2}", features.creative, CREATIVE_THRESHOLD),
            ),
            (
                features.complexity > COMPLEXITY_THRESHOLD,
                QueryCategory::Complex,
                features.complexity,
                format!(
                    "complexity score {:.2} > {:.2}",
                    features.complexity, COMPLEXITY_THRESHOLD
                ),
            ),
        ];

        for (hit, category, confidence, reason) in ladder {
            if hit {
                debug!(
                    category = ?category,
                    confidence,
                    matches = features.keywords.len(),
                    "Query classified"
                );
                return QueryClassification {
                    category,
                    confidence,
                    reason,
                    requires_immediate_response,
                };
            }
        }

        QueryClassification {
            category: QueryCategory::Unknown,
            confidence: 0.0,
            reason: format!(
                "no rule fired (urgency {:.2}, factual {:.2}, creative {:.2}, complexity {:.2})",
                features.urgency, features.factual, features.creative, features.complexity
            ),
            requires_immediate_response,
        }
    }
}
