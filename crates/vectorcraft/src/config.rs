//! Configuration management for VectorCraft.
//!
//! Configuration is loaded from a TOML file with sensible defaults; every
//! section implements `Default` so an absent file or section is never an
//! error. Validation runs once at load time.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for VectorCraft.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Engine acquisition settings
    pub engine: EngineConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// One prioritized location from which the vector engine can be acquired.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSourceConfig {
    /// Short name used in logs and error messages
    pub name: String,

    /// Base URL of the tracing service
    pub endpoint: String,
}

/// Engine acquisition settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Ordered source list; tried top to bottom, first success wins
    pub sources: Vec<EngineSourceConfig>,

    /// Per-source availability probe timeout in milliseconds
    pub probe_timeout_ms: u64,

    /// Timeout for a single trace call in milliseconds
    pub trace_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sources: vec![
                EngineSourceConfig {
                    name: "primary".to_string(),
                    endpoint: "https://trace.vectorcraft.dev".to_string(),
                },
                EngineSourceConfig {
                    name: "mirror".to_string(),
                    endpoint: "https://trace-mirror.vectorcraft.dev".to_string(),
                },
            ],
            probe_timeout_ms: 5_000,
            trace_timeout_ms: 60_000,
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum input file size in megabytes
    pub max_file_size_mb: u64,

    /// Image decode timeout in milliseconds
    pub decode_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 50,
            decode_timeout_ms: 5_000,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level ("trace", "debug", "info", "warn", "error")
    pub level: String,

    /// Output format ("pretty" or "json")
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories, falling back to
    /// `~/.vectorcraft/config.toml` if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "vectorcraft", "vectorcraft")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".vectorcraft").join("config.toml")
            })
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.sources.is_empty() {
            return Err(ConfigError::ValidationError(
                "engine.sources must list at least one source".to_string(),
            ));
        }
        for source in &self.engine.sources {
            if source.endpoint.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "engine source '{}' has an empty endpoint",
                    source.name
                )));
            }
        }
        if self.engine.trace_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "engine.trace_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.limits.decode_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.decode_timeout_ms must be greater than zero".to_string(),
            ));
        }
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "unknown logging level '{other}'"
                )))
            }
        }
        Ok(())
    }
}
