//! Feature extraction and scoring for utterances.
//!
//! Produces a transient [`QueryFeatures`] record per utterance: the matched
//! keyword list plus four scores in `[0, 1]`. Features are computed fresh on
//! every call and never cached.

use crate::lexicon::{KeywordCategory, KeywordLexicon};

/// Derived features for one utterance.
///
/// The keyword list holds one entry per `(category, keyword)` match, so a
/// word stored under two categories appears twice. Scores are `f32` in
/// `[0, 1]`.
#[derive(Debug, Clone)]
pub struct QueryFeatures {
    /// Utterance length in bytes (UTF-8 encoded length).
    pub utterance_len: usize,
    /// All matched keywords, in lexicon storage order, duplicates included
    /// when a keyword belongs to more than one category.
    pub keywords: Vec<String>,
    /// `min(1, 0.3 * emergency matches)`.
    pub urgency: f32,
    /// Weighted blend of length, total matches, and technical matches.
    pub complexity: f32,
    /// Weighted count of technical, maintenance, and feature matches.
    pub factual: f32,
    /// `min(1, 0.3 * creative matches)`.
    pub creative: f32,
    /// Whether any question-word keyword matched.
    pub contains_question_words: bool,
    /// Whether any emergency keyword matched.
    pub contains_emergency_words: bool,
    /// Whether any technical keyword matched.
    pub contains_technical_words: bool,
}

impl QueryFeatures {
    /// Extract features for `utterance` against `lexicon`.
    ///
    /// Matching is an exact, case-sensitive substring test per keyword.
    /// A keyword stored under two categories counts once toward each
    /// category's score; the duplicate inflates only `total_matches`, and
    /// through it the complexity score.
    pub fn extract(lexicon: &KeywordLexicon, utterance: &str) -> Self {
        let mut keywords = Vec::new();
        let mut emergency_matches = 0usize;
        let mut technical_matches = 0usize;
        let mut maintenance_matches = 0usize;
        let mut feature_matches = 0usize;
        let mut question_matches = 0usize;
        let mut creative_matches = 0usize;

        for (category, words) in lexicon.iter() {
            for word in words {
                if utterance.contains(word.as_str()) {
                    keywords.push(word.clone());
                    match category {
                        KeywordCategory::Emergency => emergency_matches += 1,
                        KeywordCategory::Technical => technical_matches += 1,
                        KeywordCategory::Maintenance => maintenance_matches += 1,
                        KeywordCategory::Feature => feature_matches += 1,
                        KeywordCategory::Question => question_matches += 1,
                        KeywordCategory::Creative => creative_matches += 1,
                    }
                }
            }
        }

        let utterance_len = utterance.len();
        let total_matches = keywords.len();

        let urgency = clamp01(0.3 * emergency_matches as f32);

        // Length contributes 30%, total keyword volume 40%, technical
        // density 30%; each factor saturates before weighting.
        let complexity = clamp01(
            0.3 * (utterance_len as f32 / 100.0).min(1.0)
                + 0.4 * (total_matches as f32 / 10.0).min(1.0)
                + 0.3 * (technical_matches as f32 / 5.0).min(1.0),
        );

        let factual = clamp01(
            0.4 * technical_matches as f32
                + 0.4 * maintenance_matches as f32
                + 0.5 * feature_matches as f32,
        );

        let creative = clamp01(0.3 * creative_matches as f32);

        Self {
            utterance_len,
            keywords,
            urgency,
            complexity,
            factual,
            creative,
            contains_question_words: question_matches > 0,
            contains_emergency_words: emergency_matches > 0,
            contains_technical_words: technical_matches > 0,
        }
    }
}

fn clamp01(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}
