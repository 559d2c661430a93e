//! External collaborator traits and mock implementations.
//!
//! The retriever, generator, and synthesizer are separate services reached
//! over a synchronous request/reply channel. Each is abstracted behind a
//! trait so the orchestrator can be driven by remote clients in production
//! (see [`crate::remote`]) and by mocks in tests and local development,
//! without loading a vector index or an inference engine.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use cabin_core::error::{CabinError, Result};

/// Fixed answer standing in for an empty retrieval result set.
///
/// "No results" is a normal outcome, not an error; the orchestrator checks
/// for this sentinel to decide the hybrid fallback.
pub const NO_RESULTS_SENTINEL: &str = "No results !!!";

/// One passage returned by the retrieval service.
///
/// This is also the wire shape of the remote retriever's JSON response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedPassage {
    /// Passage text from the indexed manual.
    pub text: String,
    /// Cosine similarity between the query and the passage.
    pub similarity: f64,
    /// Manual section the passage came from.
    pub section: String,
    /// Manual subsection, empty when the section has none.
    #[serde(default)]
    pub subsection: String,
}

// =============================================================================
// Traits
// =============================================================================

/// Vector search over the indexed vehicle manual.
pub trait Retriever: Send + Sync {
    /// Return up to `top_k` passages scoring at least `similarity_threshold`
    /// against `query`. An empty vector means no passage qualified.
    fn search(
        &self,
        query: &str,
        top_k: usize,
        similarity_threshold: f64,
    ) -> impl Future<Output = Result<Vec<RetrievedPassage>>> + Send;
}

/// Text generation service.
pub trait Generator: Send + Sync {
    /// Generate a complete answer for `prompt`.
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String>> + Send;

    /// Generate incrementally, pushing text chunks into `chunks` as they are
    /// produced. Dropping the sender is the terminal "finished" signal. The
    /// channel is bounded by the caller, so a slow consumer stalls
    /// generation rather than buffering without limit.
    fn generate_stream(
        &self,
        prompt: &str,
        chunks: mpsc::Sender<String>,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Speech synthesis service.
pub trait Synthesizer: Send + Sync {
    /// Synthesize one sentence, resolving once the synthesizer acknowledges
    /// it. Callers await the acknowledgment before sending the next
    /// sentence, which is what gives the pipeline backpressure.
    fn speak(&self, sentence: &str) -> impl Future<Output = Result<String>> + Send;
}

// =============================================================================
// Mock implementations
// =============================================================================

/// Mock retriever returning a scripted passage list.
///
/// Counts calls so tests can assert how many retrievals a flow performed.
#[derive(Debug, Clone, Default)]
pub struct MockRetriever {
    passages: Vec<RetrievedPassage>,
    fail: bool,
    calls: Arc<AtomicUsize>,
}

impl MockRetriever {
    /// A retriever that always finds nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A retriever whose every search times out.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// A retriever that returns the given passages for every query.
    pub fn with_passages(passages: Vec<RetrievedPassage>) -> Self {
        Self {
            passages,
            ..Self::default()
        }
    }

    /// A retriever answering every query with one passage of `text`.
    pub fn with_text(text: &str) -> Self {
        Self::with_passages(vec![RetrievedPassage {
            text: text.to_string(),
            similarity: 0.9,
            section: "测试章节".to_string(),
            subsection: String::new(),
        }])
    }

    /// Number of searches performed so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Retriever for MockRetriever {
    async fn search(
        &self,
        _query: &str,
        top_k: usize,
        similarity_threshold: f64,
    ) -> Result<Vec<RetrievedPassage>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(CabinError::Timeout {
                service: "retriever".to_string(),
                ms: 5000,
            });
        }
        Ok(self
            .passages
            .iter()
            .filter(|p| p.similarity >= similarity_threshold)
            .take(top_k)
            .cloned()
            .collect())
    }
}

/// Mock generator echoing a deterministic transformation of the prompt.
///
/// Records every prompt it sees so tests can assert what the orchestrator
/// actually sent (for example, that a hybrid fallback used the original
/// utterance rather than a composite).
#[derive(Debug, Clone, Default)]
pub struct MockGenerator {
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every prompt passed to `generate` or `generate_stream`, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompt log poisoned").clone()
    }

    /// Number of generation calls performed so far.
    pub fn call_count(&self) -> usize {
        self.prompts.lock().expect("prompt log poisoned").len()
    }

    fn record(&self, prompt: &str) {
        self.prompts
            .lock()
            .expect("prompt log poisoned")
            .push(prompt.to_string());
    }

    fn response_for(prompt: &str) -> String {
        format!("生成回答：{}。", prompt)
    }
}

impl Generator for MockGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.record(prompt);
        Ok(Self::response_for(prompt))
    }

    async fn generate_stream(&self, prompt: &str, chunks: mpsc::Sender<String>) -> Result<()> {
        self.record(prompt);
        // Emit one code point per chunk, the granularity the real engine's
        // token callback approximates.
        for c in Self::response_for(prompt).chars() {
            chunks
                .send(c.to_string())
                .await
                .map_err(|_| CabinError::Channel("stream consumer dropped".to_string()))?;
        }
        Ok(())
    }
}

/// Mock synthesizer recording every sentence it is asked to speak.
#[derive(Debug, Clone, Default)]
pub struct MockSynthesizer {
    spoken: Arc<Mutex<Vec<String>>>,
}

impl MockSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every sentence spoken so far, in order.
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().expect("spoken log poisoned").clone()
    }
}

impl Synthesizer for MockSynthesizer {
    async fn speak(&self, sentence: &str) -> Result<String> {
        self.spoken
            .lock()
            .expect("spoken log poisoned")
            .push(sentence.to_string());
        Ok("OK".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_retriever_empty() {
        let retriever = MockRetriever::empty();
        let results = retriever.search("发动机故障", 1, 0.5).await.unwrap();
        assert!(results.is_empty());
        assert_eq!(retriever.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_retriever_returns_passages() {
        let retriever = MockRetriever::with_text("每5000公里更换机油");
        let results = retriever.search("机油", 1, 0.5).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text, "每5000公里更换机油");
    }

    #[tokio::test]
    async fn test_mock_retriever_failing() {
        let retriever = MockRetriever::failing();
        let err = retriever.search("发动机故障", 1, 0.5).await.unwrap_err();
        assert!(matches!(err, CabinError::Timeout { .. }));
        assert_eq!(retriever.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_retriever_respects_threshold() {
        let retriever = MockRetriever::with_passages(vec![RetrievedPassage {
            text: "low".to_string(),
            similarity: 0.3,
            section: "s".to_string(),
            subsection: String::new(),
        }]);
        let results = retriever.search("q", 1, 0.5).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_mock_retriever_respects_top_k() {
        let passage = RetrievedPassage {
            text: "p".to_string(),
            similarity: 0.9,
            section: "s".to_string(),
            subsection: String::new(),
        };
        let retriever = MockRetriever::with_passages(vec![passage.clone(), passage.clone()]);
        let results = retriever.search("q", 1, 0.5).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_mock_generator_records_prompts() {
        let generator = MockGenerator::new();
        let answer = generator.generate("推荐一个景点").await.unwrap();
        assert!(answer.contains("推荐一个景点"));
        assert_eq!(generator.prompts(), vec!["推荐一个景点"]);
    }

    #[tokio::test]
    async fn test_mock_generator_stream_matches_batch() {
        let generator = MockGenerator::new();
        let batch = generator.generate("天气怎么样").await.unwrap();

        let (tx, mut rx) = mpsc::channel(64);
        generator.generate_stream("天气怎么样", tx).await.unwrap();
        let mut streamed = String::new();
        while let Some(chunk) = rx.recv().await {
            streamed.push_str(&chunk);
        }
        assert_eq!(streamed, batch);
    }

    #[tokio::test]
    async fn test_mock_synthesizer_records_sentences() {
        let synthesizer = MockSynthesizer::new();
        let ack = synthesizer.speak("第一句").await.unwrap();
        assert_eq!(ack, "OK");
        synthesizer.speak("第二句").await.unwrap();
        assert_eq!(synthesizer.spoken(), vec!["第一句", "第二句"]);
    }

    #[test]
    fn test_passage_json_round_trip() {
        let passage = RetrievedPassage {
            text: "刹车片每3万公里检查".to_string(),
            similarity: 0.87,
            section: "制动系统".to_string(),
            subsection: "日常检查".to_string(),
        };
        let json = serde_json::to_string(&passage).unwrap();
        let back: RetrievedPassage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, passage);
    }

    #[test]
    fn test_passage_subsection_defaults_empty() {
        let json = r#"{"text":"t","similarity":0.9,"section":"s"}"#;
        let passage: RetrievedPassage = serde_json::from_str(json).unwrap();
        assert!(passage.subsection.is_empty());
    }
}
