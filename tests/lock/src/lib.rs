//! Shared fixtures for the cross-crate lock tests.

#![forbid(unsafe_code)]

pub mod scripted;

use std::thread;
use std::time::{Duration, Instant};

use greedy_kernel::model::Model;
use greedy_search::{Engine, EngineConfig};

/// Running engine with `workers` pairs and small caches.
///
/// # Panics
///
/// Panics if the engine cannot be built or started.
#[must_use]
pub fn running_engine<M: Model>(workers: usize) -> Engine<M> {
    greedy_harness::logging::init_for_tests();
    let mut engine = Engine::new(EngineConfig {
        workers,
        explore_cache_capacity: 4_096,
        asset_cache_capacity: 4_096,
    })
    .expect("valid engine config");
    engine.start().expect("engine starts");
    engine
}

/// Block until the engine has no queued or in-progress work.
///
/// # Panics
///
/// Panics if the engine is still busy after ten seconds.
pub fn wait_quiescent<M: Model>(engine: &Engine<M>) {
    let limit = Instant::now() + Duration::from_secs(10);
    while !engine.is_quiescent() {
        assert!(Instant::now() < limit, "engine never went quiet");
        thread::sleep(Duration::from_millis(2));
    }
}
