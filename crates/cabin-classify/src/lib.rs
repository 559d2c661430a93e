//! Query classification for the Cabin assistant.
//!
//! Matches an utterance against a categorized keyword lexicon, derives four
//! feature scores (urgency, complexity, factual, creative), and maps them to
//! a response category through a fixed priority ladder.

pub mod classifier;
pub mod features;
pub mod lexicon;

pub use classifier::{QueryCategory, QueryClassification, QueryClassifier};
pub use features::QueryFeatures;
pub use lexicon::{KeywordCategory, KeywordLexicon};
