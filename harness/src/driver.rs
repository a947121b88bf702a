//! Reference driver: plays a match by searching every ply on one engine.
//!
//! Each ply gets a fresh [`Context`] for the current model and role. The
//! driver waits for completion or the deadline (forcing completion on
//! timeout), takes the best result, applies it to its own model and moves
//! on. When the search yields nothing acceptable, the first legal move is
//! played and the ply is marked as a fallback.

use std::fmt::Display;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use greedy_kernel::goal::Goal;
use greedy_kernel::model::Model;
use greedy_search::{Challenge, Context, Engine, EngineError, SearchPolicyV1, Termination};
use tracing::{debug, info};

use crate::transcript::{MatchOutcomeV1, MatchTranscriptV1, MoveSourceV1, PlyRecordV1};

/// Driver failures. Losing a match is an outcome, not an error.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("transcript serialization failed: {0}")]
    Transcript(#[from] serde_json::Error),
    #[error("transcript file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Per-match driver settings.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct DriverConfig {
    /// Search budget per ply.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Stop after this many plies even if the match is not over.
    #[serde(default = "default_max_plies")]
    pub max_plies: u32,
    #[serde(default = "default_true")]
    pub feed_asset_cache: bool,
    #[serde(default = "default_true")]
    pub use_asset_cache: bool,
}

fn default_timeout_ms() -> u64 {
    250
}
fn default_poll_interval_ms() -> u64 {
    5
}
fn default_max_plies() -> u32 {
    64
}
fn default_true() -> bool {
    true
}

impl DriverConfig {
    /// The search policy applied to every ply.
    #[must_use]
    pub fn policy(&self) -> SearchPolicyV1 {
        SearchPolicyV1 {
            timeout_ms: self.timeout_ms,
            poll_interval_ms: self.poll_interval_ms,
            feed_asset_cache: self.feed_asset_cache,
            use_asset_cache: self.use_asset_cache,
        }
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            max_plies: default_max_plies(),
            feed_asset_cache: true,
            use_asset_cache: true,
        }
    }
}

/// Play from `initial` until the model is terminal, the mover has no legal
/// finding, or `config.max_plies` plies have been played.
///
/// `goal_for(role)` supplies the goal of the search run for `role`.
///
/// # Errors
///
/// Returns [`DriverError::Engine`] with [`EngineError::NotRunning`] if the
/// engine has no workers.
pub fn play_match<M, G>(
    engine: &Engine<M>,
    initial: M,
    goal_for: impl Fn(M::Role) -> G,
    config: &DriverConfig,
) -> Result<MatchTranscriptV1, DriverError>
where
    M: Model,
    M::Finding: Display,
    G: Goal<M> + 'static,
{
    if !engine.is_running() {
        return Err(EngineError::NotRunning.into());
    }
    let policy = config.policy();
    let mut model = Arc::new(initial);
    let mut plies = Vec::new();
    let mut ply = 0u32;

    let outcome = loop {
        if let Some(role) = model.is_terminal() {
            break MatchOutcomeV1::Terminal {
                role: format!("{role:?}"),
            };
        }
        let role = model.current_role();
        let legal = engine.explore_cached(&model);
        if legal.is_empty() {
            break MatchOutcomeV1::NoMoves {
                role: format!("{role:?}"),
            };
        }
        if ply >= config.max_plies {
            break MatchOutcomeV1::PlyLimit;
        }

        let context = Context::new(Arc::clone(&model), role, goal_for(role), policy.clone());
        engine.search(&context);
        let termination =
            context.await_completion(Duration::from_millis(config.poll_interval_ms), true);
        debug!(
            ply,
            ?termination,
            seen = context.seen_len(),
            results = context.results_len(),
            "ply search finished"
        );

        let (finding, rank, source) = match context.take_result().map(Challenge::into_parts) {
            Some((finding, rank)) => (finding, Some(rank), MoveSourceV1::Search),
            None => (legal[0].clone(), None, MoveSourceV1::Fallback),
        };
        info!(
            ply,
            role = ?role,
            finding = %finding,
            rank = ?rank,
            fallback = source == MoveSourceV1::Fallback,
            timed_out = termination == Termination::TimedOut,
            "ply decided"
        );

        plies.push(PlyRecordV1 {
            ply,
            role: format!("{role:?}"),
            finding: finding.to_string(),
            rank,
            source,
        });
        model = Arc::new(model.apply(&finding));
        ply += 1;
    };

    info!(plies = plies.len(), ?outcome, "match finished");
    Ok(MatchTranscriptV1::new(plies, outcome))
}
