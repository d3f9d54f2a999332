//! Error types for the VectorCraft orchestration core.
//!
//! Errors are organized by stage (configuration, ingestion, engine
//! acquisition, tracing) so callers can surface clear, actionable messages
//! without string matching.

use thiserror::Error;

/// Top-level error type for VectorCraft operations.
#[derive(Error, Debug)]
pub enum VectorcraftError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Image ingestion errors
    #[error("Ingest error: {0}")]
    Ingest(#[from] IngestError),

    /// Trace orchestration errors
    #[error("Trace error: {0}")]
    Trace(#[from] TraceError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Image ingestion errors.
#[derive(Error, Debug)]
pub enum IngestError {
    /// The supplied bytes could not be decoded into an image
    #[error("Failed to decode image '{name}': {message}")]
    DecodeFailed { name: String, message: String },

    /// File exceeds the configured size limit
    #[error("File too large: '{name}' ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        name: String,
        size_mb: u64,
        max_mb: u64,
    },

    /// Decode did not finish within the configured timeout
    #[error("Decode timed out for '{name}' after {timeout_ms}ms")]
    Timeout { name: String, timeout_ms: u64 },
}

/// Engine acquisition and invocation errors.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A single source could not hand back a working engine
    #[error("Engine source '{source_name}' failed: {message}")]
    Probe {
        source_name: String,
        message: String,
    },

    /// Every configured source was attempted and none produced an engine
    #[error(
        "Vector engine unavailable: all {sources_attempted} configured source(s) failed. \
         Check network access to the engine endpoints or adjust [engine] sources in the config."
    )]
    Unavailable { sources_attempted: usize },

    /// The engine's trace call itself failed
    #[error("Engine trace call failed: {message}")]
    Trace { message: String },

    /// The engine did not answer within the configured timeout
    #[error("Engine call timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

/// Trace orchestration errors.
#[derive(Error, Debug)]
pub enum TraceError {
    /// Trace requested with no acquired image
    #[error("No image acquired; upload an image before tracing")]
    NoImage,

    /// A trace is already outstanding; re-entrant requests are rejected
    #[error("A trace is already in progress")]
    TraceInFlight,

    /// Engine acquisition or invocation failed
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Convenience type alias for VectorCraft results.
pub type Result<T> = std::result::Result<T, VectorcraftError>;
