//! Per-search policy: deadline and transition-cache usage.

use std::time::Duration;

/// Policy for one root search (one [`crate::context::Context`]).
///
/// Engine-wide settings live in [`crate::config::EngineConfig`]; this is
/// what may differ between sequential searches sharing an engine.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct SearchPolicyV1 {
    /// Wall-clock budget from context creation (or reset) to deadline.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Extra settle time granted after a deadline before giving up waiting.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Store freshly computed transitions in the engine asset cache.
    #[serde(default = "default_true")]
    pub feed_asset_cache: bool,
    /// Consult the engine asset cache before calling `Model::apply`.
    #[serde(default = "default_true")]
    pub use_asset_cache: bool,
}

fn default_timeout_ms() -> u64 {
    1_000
}
fn default_poll_interval_ms() -> u64 {
    10
}
fn default_true() -> bool {
    true
}

impl SearchPolicyV1 {
    /// Policy with the given timeout and defaults elsewhere.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for SearchPolicyV1 {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            feed_asset_cache: true,
            use_asset_cache: true,
        }
    }
}
