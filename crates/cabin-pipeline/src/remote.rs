//! Remote collaborator clients.
//!
//! Each collaborator speaks a newline-delimited request/reply protocol over
//! TCP: the client writes one UTF-8 line and reads one line back (or, for
//! streaming generation, reads chunk lines until the peer closes the
//! connection). Every call carries a timeout; a timed-out call surfaces as
//! [`CabinError::Timeout`], which is distinct from an empty result set.

use std::time::Duration;

use serde_json::json;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::debug;

use cabin_core::error::{CabinError, Result};

use crate::services::{Generator, RetrievedPassage, Retriever, Synthesizer};

/// One-line-request, one-line-reply TCP client with a per-call timeout.
///
/// A fresh connection is opened per request, mirroring the synchronous
/// request/reply semantics of the original transport. Embedded newlines in
/// the payload are replaced with spaces so the framing stays one line per
/// message.
#[derive(Debug, Clone)]
pub struct ReplyClient {
    addr: String,
    service: String,
    timeout: Duration,
}

impl ReplyClient {
    /// Create a client for `service` (used in error messages) at `addr`.
    pub fn new(addr: impl Into<String>, service: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            addr: addr.into(),
            service: service.into(),
            timeout: Duration::from_millis(timeout_ms),
        }
    }

    fn timeout_error(&self) -> CabinError {
        CabinError::Timeout {
            service: self.service.clone(),
            ms: self.timeout.as_millis() as u64,
        }
    }

    fn channel_error(&self, err: impl std::fmt::Display) -> CabinError {
        CabinError::Channel(format!("{}: {}", self.service, err))
    }

    /// Send one line and await one reply line.
    pub async fn request(&self, payload: &str) -> Result<String> {
        let exchange = async {
            let mut stream = TcpStream::connect(&self.addr)
                .await
                .map_err(|e| self.channel_error(e))?;

            let line = payload.replace('\n', " ");
            stream
                .write_all(line.as_bytes())
                .await
                .map_err(|e| self.channel_error(e))?;
            stream
                .write_all(b"\n")
                .await
                .map_err(|e| self.channel_error(e))?;

            let mut reader = BufReader::new(stream);
            let mut reply = String::new();
            let read = reader
                .read_line(&mut reply)
                .await
                .map_err(|e| self.channel_error(e))?;
            if read == 0 {
                return Err(self.channel_error("connection closed before reply"));
            }
            Ok(reply.trim_end_matches(['\r', '\n']).to_string())
        };

        match timeout(self.timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(self.timeout_error()),
        }
    }

    /// Send one line and forward each reply line into `chunks` until the
    /// peer closes the connection. The timeout applies per chunk read, so a
    /// stalled producer fails rather than hanging forever, while a long
    /// stream of timely chunks is fine.
    pub async fn request_stream(&self, payload: &str, chunks: mpsc::Sender<String>) -> Result<()> {
        let mut stream = match timeout(self.timeout, TcpStream::connect(&self.addr)).await {
            Ok(connected) => connected.map_err(|e| self.channel_error(e))?,
            Err(_) => return Err(self.timeout_error()),
        };

        let line = payload.replace('\n', " ");
        stream
            .write_all(line.as_bytes())
            .await
            .map_err(|e| self.channel_error(e))?;
        stream
            .write_all(b"\n")
            .await
            .map_err(|e| self.channel_error(e))?;

        let mut reader = BufReader::new(stream);
        loop {
            let mut chunk = String::new();
            let read = match timeout(self.timeout, reader.read_line(&mut chunk)).await {
                Ok(read) => read.map_err(|e| self.channel_error(e))?,
                Err(_) => return Err(self.timeout_error()),
            };
            if read == 0 {
                // EOF is the terminal "finished" signal.
                debug!(service = %self.service, "Stream finished");
                return Ok(());
            }
            let chunk = chunk.trim_end_matches(['\r', '\n']).to_string();
            if chunks.send(chunk).await.is_err() {
                return Err(self.channel_error("stream consumer dropped"));
            }
        }
    }
}

// =============================================================================
// Remote collaborator implementations
// =============================================================================

/// Retriever backed by the remote vector search service.
///
/// Requests are JSON objects `{query, top_k, similarity_threshold}`; the
/// reply is a JSON array of [`RetrievedPassage`].
#[derive(Debug, Clone)]
pub struct RemoteRetriever {
    client: ReplyClient,
}

impl RemoteRetriever {
    pub fn new(addr: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            client: ReplyClient::new(addr, "retriever", timeout_ms),
        }
    }
}

impl Retriever for RemoteRetriever {
    async fn search(
        &self,
        query: &str,
        top_k: usize,
        similarity_threshold: f64,
    ) -> Result<Vec<RetrievedPassage>> {
        let request = json!({
            "query": query,
            "top_k": top_k,
            "similarity_threshold": similarity_threshold,
        })
        .to_string();
        let reply = self.client.request(&request).await?;
        let passages: Vec<RetrievedPassage> = serde_json::from_str(&reply)?;
        Ok(passages)
    }
}

/// Generator backed by the remote inference service. Prompts and answers
/// are plain UTF-8 lines; streaming replies arrive one chunk per line.
#[derive(Debug, Clone)]
pub struct RemoteGenerator {
    client: ReplyClient,
}

impl RemoteGenerator {
    pub fn new(addr: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            client: ReplyClient::new(addr, "generator", timeout_ms),
        }
    }
}

impl Generator for RemoteGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.client.request(prompt).await
    }

    async fn generate_stream(&self, prompt: &str, chunks: mpsc::Sender<String>) -> Result<()> {
        self.client.request_stream(prompt, chunks).await
    }
}

/// Synthesizer backed by the remote text-to-speech service. Each sentence
/// is one request; the reply line is the acknowledgment.
#[derive(Debug, Clone)]
pub struct RemoteSynthesizer {
    client: ReplyClient,
}

impl RemoteSynthesizer {
    pub fn new(addr: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            client: ReplyClient::new(addr, "synthesizer", timeout_ms),
        }
    }
}

impl Synthesizer for RemoteSynthesizer {
    async fn speak(&self, sentence: &str) -> Result<String> {
        self.client.request(sentence).await
    }
}
