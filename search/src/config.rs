use std::path::Path;

use crate::error::{ConfigError, EngineError};

/// Engine configuration loaded from JSON.
///
/// Every field has a default, so `{}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct EngineConfig {
    /// Number of worker pairs (one exploration and one application worker
    /// each).
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Maximum models whose explored findings are memoized.
    #[serde(default = "default_explore_cache_capacity")]
    pub explore_cache_capacity: usize,

    /// Maximum `(model, finding)` transitions memoized.
    #[serde(default = "default_asset_cache_capacity")]
    pub asset_cache_capacity: usize,
}

fn default_workers() -> usize {
    std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
}
fn default_explore_cache_capacity() -> usize {
    65_536
}
fn default_asset_cache_capacity() -> usize {
    262_144
}

impl EngineConfig {
    /// Parse a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the text is not a valid config.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read and parse a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read and
    /// [`ConfigError::Parse`] if its contents are not a valid config.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Reject configurations the engine cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] for zero workers or a zero
    /// cache capacity.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.workers == 0 {
            return Err(EngineError::InvalidConfig {
                detail: "workers must be at least 1".into(),
            });
        }
        if self.explore_cache_capacity == 0 {
            return Err(EngineError::InvalidConfig {
                detail: "explore_cache_capacity must be at least 1".into(),
            });
        }
        if self.asset_cache_capacity == 0 {
            return Err(EngineError::InvalidConfig {
                detail: "asset_cache_capacity must be at least 1".into(),
            });
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            explore_cache_capacity: default_explore_cache_capacity(),
            asset_cache_capacity: default_asset_cache_capacity(),
        }
    }
}
