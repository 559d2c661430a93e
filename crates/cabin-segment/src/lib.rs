//! Sentence segmentation for speech synthesis.
//!
//! Splits answer text into sentence-sized units the synthesizer can speak
//! sequentially, in two modes sharing one delimiter set:
//!
//! - **batch**: segment a complete string, optionally discarding a number of
//!   leading delimiter-bounded spans ([`SentenceSegments`]);
//! - **streaming**: consume one code point at a time as generation produces
//!   them, emitting a unit at every delimiter ([`StreamSegmenter`]).
//!
//! Both operate on `char`s, never bytes, so multi-byte UTF-8 sequences are
//! never split mid-character.

pub mod batch;
pub mod stream;

pub use batch::SentenceSegments;
pub use stream::{StreamSegmenter, END_MARKER};

/// Whether `c` terminates a sentence.
///
/// Covers the CJK full-width delimiters plus their ASCII half-width
/// equivalents, and newline.
pub fn is_sentence_delimiter(c: char) -> bool {
    matches!(
        c,
        '。' | '！' | '？' | '；' | '：' | '\n' | '.' | '!' | '?' | ';' | ':'
    )
}
