//! Typed engine errors.
//!
//! Domain failure (a role losing) is never an error: it travels through the
//! agent `failed` flag and ancestor walks. These types cover lifecycle and
//! configuration mistakes only.

use std::path::PathBuf;

/// Engine lifecycle and configuration failures.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// `start` was called on an engine whose workers are already running.
    #[error("engine is already running")]
    AlreadyRunning,
    /// `stop` was called on an engine with no running workers.
    #[error("engine is not running")]
    NotRunning,
    /// Configuration rejected by validation.
    #[error("invalid engine configuration: {detail}")]
    InvalidConfig { detail: String },
    /// The OS refused to spawn a worker thread.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
    /// Workers that panicked instead of stopping on their stop token.
    #[error("{count} worker thread(s) panicked")]
    WorkerPanicked { count: usize },
}

/// Failure loading configuration text.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The config text is not valid JSON for the target type.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}
