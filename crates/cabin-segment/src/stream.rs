//! Streaming sentence segmentation.
//!
//! Generation produces text incrementally; each code point is fed to a
//! session as it arrives. Completing a delimiter emits the buffered sentence
//! immediately so synthesis can start before generation finishes. The
//! terminal flush always produces exactly one end-of-stream marker, which
//! the synthesizer uses to close out the playback session.

use tracing::trace;

use crate::is_sentence_delimiter;

/// Marker appended to the final flush so the consumer always observes an
/// explicit stream-end event.
pub const END_MARKER: &str = "END";

/// One streaming segmentation session.
///
/// Owns the buffer of pending code points exclusively; the buffer is cleared
/// after every emission and after the terminal flush. Streaming mode never
/// skips leading spans (unlike batch segmentation of retrieval text, which
/// may).
#[derive(Debug, Default, Clone)]
pub struct StreamSegmenter {
    buffer: String,
}

impl StreamSegmenter {
    /// Start a new session with an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one code point into the session.
    ///
    /// Returns a completed sentence when `c` is a delimiter and the buffer
    /// holds non-whitespace content; the delimiter itself is not part of the
    /// emitted text.
    pub fn feed(&mut self, c: char) -> Option<String> {
        if is_sentence_delimiter(c) {
            let sentence = self.buffer.trim().to_string();
            self.buffer.clear();
            if sentence.is_empty() {
                None
            } else {
                trace!(len = sentence.len(), "Sentence completed");
                Some(sentence)
            }
        } else {
            self.buffer.push(c);
            None
        }
    }

    /// Feed every code point of `text`, collecting completed sentences.
    pub fn feed_str(&mut self, text: &str) -> Vec<String> {
        text.chars().filter_map(|c| self.feed(c)).collect()
    }

    /// Text buffered since the last emission.
    pub fn pending(&self) -> &str {
        &self.buffer
    }

    /// End the session, flushing any pending content.
    ///
    /// Returns the trimmed remainder with [`END_MARKER`] appended, or the
    /// bare marker when nothing is pending. Consuming `self` guarantees the
    /// end-of-stream event is observed exactly once per session.
    pub fn finish(self) -> String {
        let remainder = self.buffer.trim();
        if remainder.is_empty() {
            END_MARKER.to_string()
        } else {
            let mut out = remainder.to_string();
            out.push_str(END_MARKER);
            out
        }
    }
}
