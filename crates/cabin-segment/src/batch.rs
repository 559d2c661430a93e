//! Batch sentence segmentation.
//!
//! Used when a complete answer string is already in hand (retrieval-only
//! responses). Retrieval text often opens with short formatting fragments
//! (section numbers, headings), so the caller may discard a fixed number of
//! leading delimiter-bounded spans before speech starts.

use crate::is_sentence_delimiter;

/// Lazy iterator over the sentences of a complete text.
///
/// The scan behaves as if a synthetic end sentinel terminated the text: any
/// trailing span after the last delimiter is yielded as a final sentence.
/// The first `skip_leading` delimiter-bounded spans are discarded entirely,
/// whether or not they are empty; every later span is trimmed and yielded if
/// non-empty, in original text order.
///
/// The iterator borrows the text and is `Clone`, so a segmentation can be
/// restarted at any time; it holds no other state.
#[derive(Debug, Clone)]
pub struct SentenceSegments<'a> {
    remaining: &'a str,
    to_skip: usize,
    done: bool,
}

impl<'a> SentenceSegments<'a> {
    /// Segment `text`, discarding the first `skip_leading` spans.
    pub fn new(text: &'a str, skip_leading: usize) -> Self {
        Self {
            remaining: text,
            to_skip: skip_leading,
            done: false,
        }
    }
}

impl<'a> Iterator for SentenceSegments<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        while !self.done {
            match self.remaining.char_indices().find(|(_, c)| is_sentence_delimiter(*c)) {
                Some((idx, delimiter)) => {
                    let span = &self.remaining[..idx];
                    self.remaining = &self.remaining[idx + delimiter.len_utf8()..];
                    if self.to_skip > 0 {
                        self.to_skip -= 1;
                        continue;
                    }
                    let sentence = span.trim();
                    if !sentence.is_empty() {
                        return Some(sentence);
                    }
                }
                None => {
                    // Trailing span after the last delimiter. The leading
                    // skip never swallows it: skip consumes delimiter
                    // occurrences only.
                    self.done = true;
                    let sentence = self.remaining.trim();
                    if !sentence.is_empty() {
                        return Some(sentence);
                    }
                }
            }
        }
        None
    }
}
