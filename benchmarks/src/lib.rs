//! Shared helpers for greedy benchmark suites.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use greedy_harness::worlds::nim::{Nim, Player};
use greedy_kernel::goal::ExhaustiveGoal;
use greedy_kernel::model::Model;
use greedy_search::{Context, Engine, EngineConfig, SearchPolicyV1};

/// A named starting position for whole-search benchmarks.
pub struct Regime {
    pub name: &'static str,
    pub heaps: Vec<u8>,
}

/// Nim positions whose state spaces grow by roughly an order of magnitude
/// each.
#[must_use]
pub fn nim_regimes() -> Vec<Regime> {
    vec![
        Regime {
            name: "small",
            heaps: vec![2, 3],
        },
        Regime {
            name: "medium",
            heaps: vec![3, 4, 5],
        },
        Regime {
            name: "wide",
            heaps: vec![2, 3, 4, 5],
        },
    ]
}

/// Started engine with `workers` pairs and default cache sizes.
///
/// # Panics
///
/// Panics if the engine cannot be built or started. Benchmark setup
/// failures are fatal.
#[must_use]
pub fn started_engine<M: Model>(workers: usize) -> Engine<M> {
    let mut engine = Engine::new(EngineConfig {
        workers,
        ..EngineConfig::default()
    })
    .expect("valid engine config");
    engine.start().expect("engine starts");
    engine
}

/// Search `heaps` exhaustively and block until the engine is idle.
/// Returns the number of distinct positions the search saw.
///
/// # Panics
///
/// Panics if the engine is still busy after a minute.
pub fn exhaust_nim(engine: &Engine<Nim>, heaps: &[u8]) -> usize {
    let policy = SearchPolicyV1::with_timeout(Duration::from_secs(60));
    let context = Context::new(Nim::new(heaps.to_vec()), Player::One, ExhaustiveGoal, policy);
    engine.search(&context);
    let limit = Instant::now() + Duration::from_secs(60);
    while !engine.is_quiescent() {
        assert!(Instant::now() < limit, "benchmark search never went quiet");
        thread::yield_now();
    }
    context.seen_len()
}

/// Every position reachable from `heaps`, each once, as shared models.
#[must_use]
pub fn reachable_positions(heaps: &[u8]) -> Vec<Arc<Nim>> {
    let mut seen = std::collections::HashSet::new();
    let mut frontier = vec![Arc::new(Nim::new(heaps.to_vec()))];
    let mut out = Vec::new();
    while let Some(model) = frontier.pop() {
        if !seen.insert(Arc::clone(&model)) {
            continue;
        }
        for finding in model.explore() {
            frontier.push(Arc::new(model.apply(&finding)));
        }
        out.push(model);
    }
    out
}
