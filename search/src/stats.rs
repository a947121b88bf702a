//! Engine-wide pipeline counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Pipeline events counted by [`EngineStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Event {
    /// An agent's findings were published (or skipped) by an exploration
    /// worker.
    Expansion,
    ChallengePublished,
    /// A challenge reached the transition step.
    Application,
    /// `Model::apply` actually ran (asset cache miss or bypass).
    ApplyCall,
    Transposition,
    Termination,
    GoalPrune,
    HistoryPrune,
    /// Work dropped because its context had completed.
    Abandoned,
    Requeued,
}

/// Monotonic counters shared by every worker of one engine.
#[derive(Debug, Default)]
pub struct EngineStats {
    expansions: AtomicU64,
    challenges_published: AtomicU64,
    applications: AtomicU64,
    apply_calls: AtomicU64,
    transpositions: AtomicU64,
    terminations: AtomicU64,
    goal_prunes: AtomicU64,
    history_prunes: AtomicU64,
    abandoned: AtomicU64,
    requeued: AtomicU64,
}

impl EngineStats {
    pub(crate) fn record(&self, event: Event) {
        let counter = match event {
            Event::Expansion => &self.expansions,
            Event::ChallengePublished => &self.challenges_published,
            Event::Application => &self.applications,
            Event::ApplyCall => &self.apply_calls,
            Event::Transposition => &self.transpositions,
            Event::Termination => &self.terminations,
            Event::GoalPrune => &self.goal_prunes,
            Event::HistoryPrune => &self.history_prunes,
            Event::Abandoned => &self.abandoned,
            Event::Requeued => &self.requeued,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Read every counter. Cache counters are supplied by the caller as
    /// `(hits, misses)` pairs.
    #[must_use]
    pub fn snapshot(&self, explore_cache: (u64, u64), asset_cache: (u64, u64)) -> StatsSnapshot {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        StatsSnapshot {
            expansions: load(&self.expansions),
            challenges_published: load(&self.challenges_published),
            applications: load(&self.applications),
            apply_calls: load(&self.apply_calls),
            transpositions: load(&self.transpositions),
            terminations: load(&self.terminations),
            goal_prunes: load(&self.goal_prunes),
            history_prunes: load(&self.history_prunes),
            abandoned: load(&self.abandoned),
            requeued: load(&self.requeued),
            explore_cache_hits: explore_cache.0,
            explore_cache_misses: explore_cache.1,
            asset_cache_hits: asset_cache.0,
            asset_cache_misses: asset_cache.1,
        }
    }
}

/// Point-in-time copy of the engine counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct StatsSnapshot {
    pub expansions: u64,
    pub challenges_published: u64,
    pub applications: u64,
    pub apply_calls: u64,
    pub transpositions: u64,
    pub terminations: u64,
    pub goal_prunes: u64,
    pub history_prunes: u64,
    pub abandoned: u64,
    pub requeued: u64,
    pub explore_cache_hits: u64,
    pub explore_cache_misses: u64,
    pub asset_cache_hits: u64,
    pub asset_cache_misses: u64,
}
