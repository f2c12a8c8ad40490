//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use chrono::FixedOffset;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Container sizing and bucketing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Initial key capacity for new containers
    #[serde(default = "default_series_capacity")]
    pub series_capacity: usize,

    /// Initial tag capacity for lookup tables
    #[serde(default = "default_lookup_capacity")]
    pub lookup_capacity: usize,

    /// Vector dimension used by the CSV importer
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// UTC offset applied when bucketing by calendar day
    #[serde(default)]
    pub bucket_offset_minutes: i32,
}

fn default_series_capacity() -> usize {
    1024
}

fn default_lookup_capacity() -> usize {
    256
}

fn default_dimension() -> usize {
    1
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            series_capacity: default_series_capacity(),
            lookup_capacity: default_lookup_capacity(),
            dimension: default_dimension(),
            bucket_offset_minutes: 0,
        }
    }
}

impl StorageConfig {
    /// Bucketing offset as a chrono offset
    pub fn bucket_offset(&self) -> Result<FixedOffset, ConfigError> {
        offset_from_minutes(self.bucket_offset_minutes).ok_or(ConfigError::Invalid {
            field: "bucket_offset_minutes",
            error: format!("{} is outside ±24h", self.bucket_offset_minutes),
        })
    }
}

fn offset_from_minutes(minutes: i32) -> Option<FixedOffset> {
    minutes.checked_mul(60).and_then(FixedOffset::east_opt)
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| match e {
            ConfigError::Parse { error, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                error,
            },
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            error: e.to_string(),
        })?;
        config.storage.bucket_offset()?;
        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("chronostore").join("config.toml")),
            Some(PathBuf::from("./chronostore.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any `CHRONOSTORE_*` key source
    ///
    /// Values that do not parse are logged and skipped.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(level) = var("CHRONOSTORE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("CHRONOSTORE_LOG_FORMAT") {
            self.logging.format = format;
        }

        if let Some(offset) = var("CHRONOSTORE_BUCKET_OFFSET_MINUTES") {
            match offset.parse() {
                Ok(minutes) if offset_from_minutes(minutes).is_some() => {
                    self.storage.bucket_offset_minutes = minutes;
                }
                _ => tracing::warn!("Ignoring invalid CHRONOSTORE_BUCKET_OFFSET_MINUTES={}", offset),
            }
        }
        if let Some(dimension) = var("CHRONOSTORE_DIMENSION") {
            match dimension.parse() {
                Ok(d) => self.storage.dimension = d,
                Err(_) => tracing::warn!("Ignoring invalid CHRONOSTORE_DIMENSION={}", dimension),
            }
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid value for {field}: {error}")]
    Invalid { field: &'static str, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Chronostore Configuration
#
# Environment variables override these settings:
# - CHRONOSTORE_LOG_LEVEL
# - CHRONOSTORE_LOG_FORMAT
# - CHRONOSTORE_BUCKET_OFFSET_MINUTES
# - CHRONOSTORE_DIMENSION

[storage]
# Initial key capacity for new containers
series_capacity = 1024

# Initial tag capacity for lookup tables
lookup_capacity = 256

# Number of value columns per CSV record
dimension = 1

# UTC offset (minutes) used when bucketing records by calendar day
bucket_offset_minutes = 0

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
