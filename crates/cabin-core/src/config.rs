use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{CabinError, Result};

/// Top-level configuration for the Cabin assistant.
///
/// Loaded from `~/.cabin/config.toml` by default. Each section corresponds
/// to one collaborator or cross-cutting concern.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CabinConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub synthesis: SynthesisConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub segmenter: SegmenterConfig,
}

impl CabinConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: CabinConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| CabinError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// Address the utterance service loop listens on.
    pub bind_addr: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            bind_addr: "127.0.0.1:8899".to_string(),
        }
    }
}

/// Vector retrieval collaborator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Request/reply endpoint of the retrieval service.
    pub endpoint: String,
    /// Number of passages to request per query.
    pub top_k: usize,
    /// Minimum cosine similarity for a passage to count as a result.
    pub similarity_threshold: f64,
    /// Per-call timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            endpoint: "127.0.0.1:7788".to_string(),
            top_k: 1,
            similarity_threshold: 0.5,
            timeout_ms: 5000,
        }
    }
}

/// Text generation collaborator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Request/reply endpoint of the generation service.
    pub endpoint: String,
    /// Per-call timeout in milliseconds. Generation is the slowest
    /// collaborator, so this defaults much higher than the others.
    pub timeout_ms: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: "127.0.0.1:7777".to_string(),
            timeout_ms: 30000,
        }
    }
}

/// Speech synthesis collaborator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Request/reply endpoint of the synthesis service.
    pub endpoint: String,
    /// Per-call timeout in milliseconds. Synthesis acknowledgments gate the
    /// sentence stream, so a slow synthesizer stalls upstream generation.
    pub timeout_ms: u64,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            endpoint: "127.0.0.1:7766".to_string(),
            timeout_ms: 10000,
        }
    }
}

/// Response cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of cached answers before the whole cache is flushed.
    pub capacity: usize,
    /// Pre-warm the cache with anticipated queries at startup.
    pub warm_on_start: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            warm_on_start: false,
        }
    }
}

/// Sentence segmentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterConfig {
    /// Number of leading delimiter-bounded spans to discard when batch
    /// segmenting a retrieval answer for synthesis. Suppresses spurious
    /// short leading fragments from retrieval text formatting.
    pub skip_leading: usize,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self { skip_leading: 2 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CabinConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.retrieval.top_k, 1);
        assert!((config.retrieval.similarity_threshold - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.cache.capacity, 100);
        assert_eq!(config.segmenter.skip_leading, 2);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = CabinConfig::default();
        config.general.bind_addr = "0.0.0.0:9000".to_string();
        config.retrieval.top_k = 3;
        config.cache.warm_on_start = true;
        config.save(&path).unwrap();

        let loaded = CabinConfig::load(&path).unwrap();
        assert_eq!(loaded.general.bind_addr, "0.0.0.0:9000");
        assert_eq!(loaded.retrieval.top_k, 3);
        assert!(loaded.cache.warm_on_start);
    }

    #[test]
    fn test_load_missing_file_errors() {
        let result = CabinConfig::load(Path::new("/nonexistent/cabin/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = CabinConfig::load_or_default(Path::new("/nonexistent/cabin/config.toml"));
        assert_eq!(config.cache.capacity, 100);
    }

    #[test]
    fn test_load_or_default_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "this is not [valid toml").unwrap();

        let config = CabinConfig::load_or_default(&path);
        assert_eq!(config.retrieval.top_k, 1);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[retrieval]\ntop_k = 5\n").unwrap();

        let config = CabinConfig::load(&path).unwrap();
        assert_eq!(config.retrieval.top_k, 5);
        // Untouched sections keep their defaults.
        assert_eq!(config.retrieval.timeout_ms, 5000);
        assert_eq!(config.generation.timeout_ms, 30000);
        assert_eq!(config.segmenter.skip_leading, 2);
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("config.toml");
        CabinConfig::default().save(&path).unwrap();
        assert!(path.exists());
    }
}
