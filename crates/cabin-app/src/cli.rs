//! CLI argument definitions for the Cabin application.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

/// Cabin — an in-car voice assistant core that classifies transcribed
/// queries and answers them from the vehicle manual, the generator, or both.
#[derive(Parser, Debug)]
#[command(name = "cabin", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Address the query service listens on.
    #[arg(short = 'b', long = "bind")]
    pub bind: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Run with mock collaborators instead of remote services.
    #[arg(long = "mock")]
    pub mock: bool,

    /// Pre-answer the common fault queries at startup.
    #[arg(long = "warm")]
    pub warm: bool,

    /// Stream generated answers to the synthesizer sentence by sentence.
    #[arg(long = "streaming")]
    pub streaming: bool,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > CABIN_CONFIG env var > ~/.cabin/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("CABIN_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the listen address.
    ///
    /// Priority: --bind flag > CABIN_BIND env var > config file value.
    pub fn resolve_bind_addr(&self, config_addr: &str) -> String {
        if let Some(ref addr) = self.bind {
            return addr.clone();
        }
        if let Ok(addr) = std::env::var("CABIN_BIND") {
            return addr;
        }
        config_addr.to_string()
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".cabin").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".cabin").join("config.toml");
    }
    PathBuf::from("config.toml")
}
