//! Cabin application binary - composition root.
//!
//! Ties together all Cabin crates into a single executable:
//! 1. Load configuration from TOML
//! 2. Build the response orchestrator (classifier + cache + collaborators)
//! 3. Optionally warm the cache with the common fault queries
//! 4. Serve transcribed utterances over a newline-delimited TCP socket
//!
//! Collaborators default to the remote retrieval, generation, and synthesis
//! services named in the config; `--mock` swaps in in-process mocks for
//! local development without any of the three services running.

mod cli;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

use cabin_core::config::CabinConfig;
use cabin_pipeline::{
    Generator, MockGenerator, MockRetriever, MockSynthesizer, PipelineSettings, RemoteGenerator,
    RemoteRetriever, RemoteSynthesizer, ResponseOrchestrator, Retriever, Synthesizer,
    DEFAULT_WARM_QUERIES,
};

use crate::cli::CliArgs;

/// Answer spoken when a query fails outright (collaborator down or timed
/// out). The service keeps accepting queries afterwards.
const FAILURE_ANSWER: &str = "抱歉，我暂时无法回答，请稍后再试。";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config first: the log level may come from it.
    let config_file = args.resolve_config_path();
    let config = CabinConfig::load_or_default(&config_file);

    // Tracing.
    let log_level = args.resolve_log_level(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    tracing::info!("Starting Cabin v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    let settings = PipelineSettings::from_config(&config);
    let warm = args.warm || config.cache.warm_on_start;
    let addr = args.resolve_bind_addr(&config.general.bind_addr);

    if args.mock {
        tracing::info!("Running with mock collaborators");
        let orchestrator = ResponseOrchestrator::new(
            MockRetriever::with_text("第1节。概述。请参考车辆手册的相关章节。必要时联系售后服务。"),
            MockGenerator::new(),
            MockSynthesizer::new(),
            settings,
        );
        serve(orchestrator, &addr, warm, args.streaming).await
    } else {
        let orchestrator = ResponseOrchestrator::new(
            RemoteRetriever::new(config.retrieval.endpoint.clone(), config.retrieval.timeout_ms),
            RemoteGenerator::new(config.generation.endpoint.clone(), config.generation.timeout_ms),
            RemoteSynthesizer::new(config.synthesis.endpoint.clone(), config.synthesis.timeout_ms),
            settings,
        );
        tracing::info!(
            retriever = %config.retrieval.endpoint,
            generator = %config.generation.endpoint,
            synthesizer = %config.synthesis.endpoint,
            "Remote collaborators configured"
        );
        serve(orchestrator, &addr, warm, args.streaming).await
    }
}

/// Run the query service loop until the process is stopped.
///
/// One utterance line in, one answer line out. A failed query answers with
/// a fixed apology instead of tearing the connection down; only listener
/// setup errors are fatal.
async fn serve<R, G, S>(
    mut orchestrator: ResponseOrchestrator<R, G, S>,
    addr: &str,
    warm: bool,
    streaming: bool,
) -> Result<(), Box<dyn std::error::Error>>
where
    R: Retriever,
    G: Generator,
    S: Synthesizer,
{
    if warm {
        match orchestrator.warm_cache(&DEFAULT_WARM_QUERIES).await {
            Ok(warmed) => tracing::info!(warmed, "Startup cache warming complete"),
            Err(e) => tracing::warn!(error = %e, "Cache warming failed, continuing cold"),
        }
    }

    let listener = match TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(addr = %addr, error = %e, "Failed to bind — is another instance running?");
            return Err(e.into());
        }
    };
    tracing::info!(addr = %addr, streaming, "Query service listening");

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::warn!(error = %e, "Accept failed");
                continue;
            }
        };
        tracing::debug!(peer = %peer, "Client connected");

        // Queries are handled one at a time: the orchestrator owns the
        // cache, and a car has one driver talking to it.
        let (reader, mut writer) = stream.into_split();
        let mut lines = BufReader::new(reader).lines();
        loop {
            let utterance = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(peer = %peer, error = %e, "Read failed");
                    break;
                }
            };
            let utterance = utterance.trim();
            if utterance.is_empty() {
                continue;
            }

            // Receipt ack first, so the client knows the query landed even
            // when the answer takes a generation's worth of time.
            if let Err(e) = writer.write_all(b"OK\n").await {
                tracing::warn!(peer = %peer, error = %e, "Write failed");
                break;
            }

            let answered = if streaming {
                orchestrator.answer_streaming(utterance).await
            } else {
                orchestrator.answer(utterance).await
            };
            let answer = match answered {
                Ok(answer) => answer,
                Err(e) => {
                    tracing::warn!(error = %e, "Query failed");
                    FAILURE_ANSWER.to_string()
                }
            };

            let reply = answer.replace('\n', " ");
            if let Err(e) = writer.write_all(reply.as_bytes()).await {
                tracing::warn!(peer = %peer, error = %e, "Write failed");
                break;
            }
            if let Err(e) = writer.write_all(b"\n").await {
                tracing::warn!(peer = %peer, error = %e, "Write failed");
                break;
            }
        }
        tracing::debug!(peer = %peer, "Client disconnected");
    }
}
