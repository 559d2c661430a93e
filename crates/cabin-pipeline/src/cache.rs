//! Bounded utterance-to-answer cache.
//!
//! Exact-match lookups only: the cache key is the verbatim utterance string.
//! Entries have no age-based expiry; they live until evicted by the size
//! rule or until process restart.

use std::collections::HashMap;

use tracing::debug;

/// Default maximum number of cached answers.
pub const DEFAULT_CAPACITY: usize = 100;

/// Bounded response cache with flush-all eviction.
///
/// When an insertion finds the map already at capacity, the *entire* cache
/// is cleared before the new entry is written. This is deliberately not an
/// LRU policy; existing deployments depend on the flush-all behavior, so it
/// is preserved exactly. Revisit toward LRU only if cache-hit-rate
/// requirements tighten.
///
/// The cache is confined to a single orchestrator; callers that share one
/// across tasks must wrap it in a mutex so the size-check, clear, and insert
/// in [`put`](Self::put) stay one atomic critical section.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    entries: HashMap<String, String>,
    capacity: usize,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ResponseCache {
    /// Create a cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Look up a previously computed answer by exact utterance match.
    pub fn get(&self, utterance: &str) -> Option<&str> {
        self.entries.get(utterance).map(String::as_str)
    }

    /// Whether an answer is cached for this utterance.
    pub fn contains(&self, utterance: &str) -> bool {
        self.entries.contains_key(utterance)
    }

    /// Insert an answer, flushing the whole cache first if it is full.
    pub fn put(&mut self, utterance: String, answer: String) {
        if self.entries.len() >= self.capacity {
            debug!(
                evicted = self.entries.len(),
                "Response cache full, flushing all entries"
            );
            self.entries.clear();
        }
        self.entries.insert(utterance, answer);
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entries are cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
