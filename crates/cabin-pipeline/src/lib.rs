//! Response pipeline for the Cabin assistant.
//!
//! Coordinates the answer flow for one transcribed utterance: cache lookup,
//! query classification, strategy dispatch (retrieval-only, generation-only,
//! or hybrid retrieval+generation), cache insertion, and sentence-by-sentence
//! forwarding of the finished answer to the speech synthesizer.
//!
//! The retriever, generator, and synthesizer are external collaborators
//! behind traits; remote implementations speak a newline-delimited
//! request/reply protocol with per-call timeouts, and mock implementations
//! support tests and local development.

pub mod cache;
pub mod orchestrator;
pub mod prompt;
pub mod remote;
pub mod services;

pub use cache::ResponseCache;
pub use orchestrator::{PipelineSettings, ResponseOrchestrator, DEFAULT_WARM_QUERIES};
pub use prompt::{build_rag_prompt, compose_rag_query, scrub_markup, split_rag_tag, RAG_TAG};
pub use remote::{RemoteGenerator, RemoteRetriever, RemoteSynthesizer, ReplyClient};
pub use services::{
    Generator, MockGenerator, MockRetriever, MockSynthesizer, RetrievedPassage, Retriever,
    Synthesizer, NO_RESULTS_SENTINEL,
};
