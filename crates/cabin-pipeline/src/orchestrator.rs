//! Response orchestration.
//!
//! One orchestrator owns the full answer flow for a session: cache lookup,
//! classification, strategy dispatch, cache insertion, and sentence-paced
//! synthesis. Retrieval-backed categories answer from the manual verbatim;
//! creative queries go straight to the generator; complex and unclassified
//! queries take the hybrid path, where the retrieved passage rides along
//! with the utterance as generator context.

use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use cabin_classify::{QueryCategory, QueryClassifier};
use cabin_core::config::CabinConfig;
use cabin_core::error::{CabinError, Result};
use cabin_segment::{SentenceSegments, StreamSegmenter};

use crate::cache::ResponseCache;
use crate::prompt::{compose_rag_query, scrub_markup};
use crate::services::{Generator, Retriever, Synthesizer, NO_RESULTS_SENTINEL};

/// Queries pre-answered at startup when cache warming is enabled. All are
/// retrieval-backed, so warming never touches the generator.
pub const DEFAULT_WARM_QUERIES: [&str; 4] = ["发动机故障", "制动系统", "空调不制冷", "保养周期"];

/// Chunks buffered between the generator and the synthesis loop. Small on
/// purpose: a stalled synthesizer should stall generation, not let it run
/// ahead unboundedly.
const STREAM_CHANNEL_CAPACITY: usize = 32;

/// Tunables threaded from configuration into the answer flow.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Passages requested per retrieval.
    pub top_k: usize,
    /// Minimum similarity for a passage to count as a result.
    pub similarity_threshold: f64,
    /// Leading spans discarded when speaking retrieval text.
    pub skip_leading: usize,
    /// Response cache capacity.
    pub cache_capacity: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            top_k: 1,
            similarity_threshold: 0.5,
            skip_leading: 2,
            cache_capacity: crate::cache::DEFAULT_CAPACITY,
        }
    }
}

impl PipelineSettings {
    pub fn from_config(config: &CabinConfig) -> Self {
        Self {
            top_k: config.retrieval.top_k,
            similarity_threshold: config.retrieval.similarity_threshold,
            skip_leading: config.segmenter.skip_leading,
            cache_capacity: config.cache.capacity,
        }
    }
}

/// Drives one utterance from transcription to spoken answer.
///
/// Holds the classifier and cache; the three collaborators are injected so
/// the same flow runs against remote services in production and mocks in
/// tests.
pub struct ResponseOrchestrator<R, G, S>
where
    R: Retriever,
    G: Generator,
    S: Synthesizer,
{
    classifier: QueryClassifier,
    cache: ResponseCache,
    retriever: R,
    generator: G,
    synthesizer: S,
    settings: PipelineSettings,
}

impl<R, G, S> ResponseOrchestrator<R, G, S>
where
    R: Retriever,
    G: Generator,
    S: Synthesizer,
{
    /// Create an orchestrator over the built-in lexicon.
    pub fn new(retriever: R, generator: G, synthesizer: S, settings: PipelineSettings) -> Self {
        Self {
            classifier: QueryClassifier::with_builtin_lexicon(),
            cache: ResponseCache::new(settings.cache_capacity),
            retriever,
            generator,
            synthesizer,
            settings,
        }
    }

    /// The response cache, exposed for inspection.
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Answer an utterance, speaking the finished text sentence by sentence.
    ///
    /// A cache hit returns the stored answer without re-synthesis. Otherwise
    /// the utterance is classified, dispatched, cached, and then spoken; the
    /// answer is cached even when synthesis later fails, so a retry becomes
    /// a cache hit.
    pub async fn answer(&mut self, utterance: &str) -> Result<String> {
        let request_id = Uuid::new_v4();
        if let Some(hit) = self.cache.get(utterance) {
            info!(%request_id, "Cache hit");
            return Ok(hit.to_string());
        }

        let classification = self.classifier.classify(utterance);
        info!(
            %request_id,
            category = ?classification.category,
            confidence = classification.confidence,
            "Query classified"
        );

        let (text, skip) = match classification.category {
            QueryCategory::Emergency | QueryCategory::Factual => (
                self.retrieve_answer(utterance).await?,
                self.settings.skip_leading,
            ),
            QueryCategory::Creative => (self.generator.generate(utterance).await?, 0),
            QueryCategory::Complex | QueryCategory::Unknown => {
                let prompt = self.hybrid_prompt(utterance).await?;
                (self.generator.generate(&prompt).await?, 0)
            }
        };

        self.cache.put(utterance.to_string(), text.clone());
        self.speak_batch(&text, skip).await?;
        Ok(text)
    }

    /// Answer an utterance with incremental synthesis.
    ///
    /// Generation-backed strategies stream: sentences are spoken as the
    /// generator completes them, and the terminal flush always carries the
    /// end-of-stream marker. Retrieval-backed strategies and cache hits
    /// already have the full text, so they speak in batch.
    pub async fn answer_streaming(&mut self, utterance: &str) -> Result<String> {
        let request_id = Uuid::new_v4();
        if let Some(hit) = self.cache.get(utterance) {
            info!(%request_id, "Cache hit");
            let hit = hit.to_string();
            self.speak_batch(&hit, 0).await?;
            return Ok(hit);
        }

        let classification = self.classifier.classify(utterance);
        info!(
            %request_id,
            category = ?classification.category,
            confidence = classification.confidence,
            "Query classified"
        );

        match classification.category {
            QueryCategory::Emergency | QueryCategory::Factual => {
                let text = self.retrieve_answer(utterance).await?;
                self.cache.put(utterance.to_string(), text.clone());
                self.speak_batch(&text, self.settings.skip_leading).await?;
                Ok(text)
            }
            QueryCategory::Creative => {
                let text = self.stream_and_speak(utterance).await?;
                self.cache.put(utterance.to_string(), text.clone());
                Ok(text)
            }
            QueryCategory::Complex | QueryCategory::Unknown => {
                let prompt = self.hybrid_prompt(utterance).await?;
                let text = self.stream_and_speak(&prompt).await?;
                self.cache.put(utterance.to_string(), text.clone());
                Ok(text)
            }
        }
    }

    /// Pre-answer retrieval-backed queries so the first real request hits
    /// the cache. Queries already cached are skipped, and queries with no
    /// retrieval result are left uncached. Returns how many entries were
    /// added. Never touches the generator or synthesizer.
    pub async fn warm_cache(&mut self, queries: &[&str]) -> Result<usize> {
        let mut warmed = 0;
        for query in queries {
            if self.cache.contains(query) {
                continue;
            }
            let passages = self
                .retriever
                .search(query, self.settings.top_k, self.settings.similarity_threshold)
                .await?;
            match passages.into_iter().next() {
                Some(passage) => {
                    self.cache.put((*query).to_string(), passage.text);
                    warmed += 1;
                }
                None => warn!(query, "No retrieval result, not warming"),
            }
        }
        info!(warmed, "Cache warmed");
        Ok(warmed)
    }

    // ===== Strategies =====

    /// Retrieval-only answer: the top passage verbatim, or the no-results
    /// sentinel when nothing qualifies.
    async fn retrieve_answer(&self, utterance: &str) -> Result<String> {
        let passages = self
            .retriever
            .search(
                utterance,
                self.settings.top_k,
                self.settings.similarity_threshold,
            )
            .await?;
        match passages.into_iter().next() {
            Some(passage) => {
                debug!(similarity = passage.similarity, section = %passage.section, "Passage retrieved");
                Ok(passage.text)
            }
            None => Ok(NO_RESULTS_SENTINEL.to_string()),
        }
    }

    /// Build the generator prompt for the hybrid strategy: the composite
    /// query when retrieval found context, the bare utterance when it found
    /// none. A retrieval failure (timeout included) propagates; only an
    /// empty result set falls back to generation-only.
    async fn hybrid_prompt(&self, utterance: &str) -> Result<String> {
        let passages = self
            .retriever
            .search(
                utterance,
                self.settings.top_k,
                self.settings.similarity_threshold,
            )
            .await?;
        match passages.into_iter().next() {
            Some(passage) => Ok(compose_rag_query(utterance, &passage.text)),
            None => {
                debug!("No retrieval context, generating from utterance alone");
                Ok(utterance.to_string())
            }
        }
    }

    // ===== Synthesis =====

    /// Speak a complete text sentence by sentence, awaiting each
    /// acknowledgment before sending the next.
    async fn speak_batch(&self, text: &str, skip_leading: usize) -> Result<()> {
        for sentence in SentenceSegments::new(text, skip_leading) {
            self.synthesizer.speak(sentence).await?;
        }
        Ok(())
    }

    /// Stream a generation, speaking each completed sentence as it arrives
    /// and closing with the end-of-stream flush. Returns the full
    /// accumulated text. A synthesis failure is reported in preference to a
    /// generator failure when both occur.
    async fn stream_and_speak(&self, prompt: &str) -> Result<String> {
        let (tx, mut rx) = mpsc::channel::<String>(STREAM_CHANNEL_CAPACITY);
        let producer = self.generator.generate_stream(prompt, tx);
        let consumer = async {
            let mut segmenter = StreamSegmenter::new();
            let mut full = String::new();
            while let Some(chunk) = rx.recv().await {
                full.push_str(&chunk);
                for sentence in segmenter.feed_str(&chunk) {
                    let line = scrub_markup(&sentence);
                    if !line.is_empty() {
                        self.synthesizer.speak(&line).await?;
                    }
                }
            }
            // Terminal flush: remainder plus marker, or the bare marker.
            let tail = scrub_markup(&segmenter.finish());
            self.synthesizer.speak(&tail).await?;
            Ok::<_, CabinError>(full)
        };

        let (produced, consumed) = tokio::join!(producer, consumer);
        let full = consumed?;
        produced?;
        Ok(full)
    }
}
