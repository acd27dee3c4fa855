//! Adapter configuration.
//!
//! Configuration is loaded in the following order (later overrides earlier):
//! 1. Default values
//! 2. YAML config file (if specified via SEARCHPROTO_CONFIG)
//! 3. Environment variables

use searchproto_protocol::{CompressionConfig, CompressionSettings, CompressionType};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Highest zstd compression level accepted.
const MAX_ZSTD_LEVEL: u8 = 22;

/// Adapter configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Compression applied to encoded replies.
    pub compression: CompressionConfig,
    /// Metrics configuration.
    pub metrics: MetricsConfig,
}

impl Config {
    /// Loads configuration from file, then applies environment variable overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("SEARCHPROTO_CONFIG") {
            config = Self::from_file(&path)?;
        }

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;
        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;
        Ok(config)
    }

    /// Loads configuration from environment variables only.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    fn apply_env_overrides(&mut self) {
        apply_compression_overrides(&mut self.compression);
        self.metrics.apply_env_overrides();
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let compression = &self.compression;
        if compression.compression_type == CompressionType::Zstd
            && compression.level > MAX_ZSTD_LEVEL
        {
            return Err(ConfigError::ValidationError(format!(
                "zstd level must be between 0 and {}, got {}",
                MAX_ZSTD_LEVEL, compression.level
            )));
        }
        if !(1..=100).contains(&compression.threshold) {
            return Err(ConfigError::ValidationError(format!(
                "compression threshold must be between 1 and 100 percent, got {}",
                compression.threshold
            )));
        }
        Ok(())
    }

    /// Builds the shared compression handle for an adapter.
    pub fn compression_settings(&self) -> CompressionSettings {
        CompressionSettings::new(self.compression)
    }

    /// Saves configuration to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = serde_yaml::to_string(self)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;
        Ok(())
    }
}

fn apply_compression_overrides(compression: &mut CompressionConfig) {
    if let Ok(kind) = std::env::var("SEARCHPROTO_COMPRESSION_TYPE") {
        match kind.parse() {
            Ok(parsed) => compression.compression_type = parsed,
            Err(e) => tracing::warn!("Ignoring SEARCHPROTO_COMPRESSION_TYPE: {}", e),
        }
    }

    if let Ok(level) = std::env::var("SEARCHPROTO_COMPRESSION_LEVEL") {
        if let Ok(n) = level.parse() {
            compression.level = n;
        }
    }

    if let Ok(size) = std::env::var("SEARCHPROTO_COMPRESSION_MIN_SIZE") {
        if let Ok(n) = size.parse() {
            compression.min_size = n;
        }
    }

    if let Ok(threshold) = std::env::var("SEARCHPROTO_COMPRESSION_THRESHOLD") {
        if let Ok(n) = threshold.parse() {
            compression.threshold = n;
        }
    }
}

/// Metrics configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Collect adapter metrics.
    pub enabled: bool,
}

impl MetricsConfig {
    fn apply_env_overrides(&mut self) {
        if let Ok(enabled) = std::env::var("SEARCHPROTO_METRICS_ENABLED") {
            self.enabled = enabled == "1" || enabled.to_lowercase() == "true";
        }
    }
}

/// Configuration error.
#[derive(Debug)]
pub enum ConfigError {
    IoError(PathBuf, std::io::Error),
    ParseError(PathBuf, String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(path, e) => {
                write!(f, "failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::ValidationError(msg) => {
                write!(f, "configuration validation failed: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
