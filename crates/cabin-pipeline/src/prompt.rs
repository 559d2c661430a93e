//! RAG prompt composition and parsing.
//!
//! In hybrid mode the utterance and the retrieved passage travel to the
//! generator as one composite line: `<utterance><rag><passage>`. The literal
//! five-character tag is the sole delimiter; everything after its first
//! occurrence is retrieved context, everything before it is the user's
//! original question.

/// Marker separating the original utterance from retrieved context.
pub const RAG_TAG: &str = "<rag>";

/// Instruction template the generator applies around retrieved context.
/// `{rag_context}` is replaced by the passage text.
const RAG_PROMPT_TEMPLATE: &str = "你是一款智能座舱 AI 助手：\n\
                                   1. 使用口语化表达\n\
                                   回答必须基于以下内容：\n\
                                   {rag_context}";

/// Characters stripped from streamed text before synthesis: whitespace plus
/// the markdown decorations and punctuation the generator tends to emit,
/// which would otherwise be read aloud.
const SCRUB_CHARS: &str = " \t\n\r*#@$%^&，。：、；！？【】（）“”‘’";

/// Split a composite generator query at the first [`RAG_TAG`].
///
/// Returns `(query, context)`; `context` is empty when the tag is absent.
pub fn split_rag_tag(input: &str) -> (&str, &str) {
    match input.find(RAG_TAG) {
        Some(pos) => (&input[..pos], &input[pos + RAG_TAG.len()..]),
        None => (input, ""),
    }
}

/// Build the composite hybrid-mode query: `utterance<rag>passage`.
pub fn compose_rag_query(utterance: &str, passage: &str) -> String {
    let mut out = String::with_capacity(utterance.len() + RAG_TAG.len() + passage.len());
    out.push_str(utterance);
    out.push_str(RAG_TAG);
    out.push_str(passage);
    out
}

/// Substitute retrieved context into the fixed instruction template.
pub fn build_rag_prompt(context: &str) -> String {
    RAG_PROMPT_TEMPLATE.replace("{rag_context}", context)
}

/// Strip whitespace and decoration characters from streamed text so the
/// synthesizer never reads markdown or stray punctuation aloud.
pub fn scrub_markup(text: &str) -> String {
    text.chars().filter(|c| !SCRUB_CHARS.contains(*c)).collect()
}
