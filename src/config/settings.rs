//! Configuration settings for askdata.

use crate::error::{ConfigError, Result};
use crate::query::{SimilarityPolicy, DEFAULT_DECIMAL_PLACES, DEFAULT_SIMILARITY_THRESHOLD};
use crate::schema::DEFAULT_SAMPLE_SIZE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub classifier: ClassifierConfig,
    pub embedding: EmbeddingConfig,
    pub session: SessionConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::ReadFile)?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default locations or use defaults.
    pub fn load() -> Result<Self> {
        let config_paths = [
            // Current directory
            PathBuf::from("askdata.toml"),
            PathBuf::from("config.toml"),
            // User config directory
            dirs::config_dir()
                .map(|p| p.join("askdata/config.toml"))
                .unwrap_or_default(),
            // Home directory
            dirs::home_dir()
                .map(|p| p.join(".askdata/config.toml"))
                .unwrap_or_default(),
        ];

        for path in &config_paths {
            if !path.as_os_str().is_empty() && path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Config::default())
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        let threshold = self.classifier.similarity_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "similarity_threshold must be in (0, 1], got {}",
                threshold
            ))
            .into());
        }
        if self.classifier.max_similarity_matches == Some(0) {
            return Err(
                ConfigError::Invalid("max_similarity_matches must be > 0".to_string()).into(),
            );
        }
        if self.classifier.sample_size == 0 {
            return Err(ConfigError::Invalid("sample_size must be > 0".to_string()).into());
        }

        if self.embedding.enabled {
            if self.embedding.model.trim().is_empty() {
                return Err(ConfigError::MissingField("embedding.model".to_string()).into());
            }
            if self.embedding.cache_capacity == 0 {
                return Err(
                    ConfigError::Invalid("embedding.cache_capacity must be > 0".to_string()).into(),
                );
            }
        }

        if self.session.max_history == 0 {
            return Err(ConfigError::Invalid("max_history must be > 0".to_string()).into());
        }
        if self.output.decimal_places > 12 {
            return Err(ConfigError::Invalid("decimal_places must be <= 12".to_string()).into());
        }

        Ok(())
    }
}

/// Expand `~` and environment variables in a user-supplied path.
pub fn expand_path(path: &str) -> PathBuf {
    match shellexpand::full(path) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => PathBuf::from(shellexpand::tilde(path).as_ref()),
    }
}

/// Intent classifier configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Minimum similarity for a column to count as mentioned
    pub similarity_threshold: f32,
    /// Cap on columns matched by similarity in one query
    pub max_similarity_matches: Option<usize>,
    /// Non-null values examined per column during schema inference
    pub sample_size: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            max_similarity_matches: None,
            sample_size: DEFAULT_SAMPLE_SIZE,
        }
    }
}

impl ClassifierConfig {
    pub fn similarity_policy(&self) -> SimilarityPolicy {
        SimilarityPolicy {
            threshold: self.similarity_threshold,
            max_matches: self.max_similarity_matches,
        }
    }
}

/// Embedding configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Match columns by embedding similarity as well as exact tokens
    pub enabled: bool,
    /// Model name for local embeddings
    pub model: String,
    /// Maximum number of cached embeddings
    pub cache_capacity: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            model: "BAAI/bge-small-en-v1.5".to_string(),
            cache_capacity: 1024,
        }
    }
}

/// Session configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Entries kept in the in-memory history; oldest are dropped first
    pub max_history: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { max_history: 100 }
    }
}

/// Output configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Decimal places for statistical display values
    pub decimal_places: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            decimal_places: DEFAULT_DECIMAL_PLACES,
        }
    }
}
