//! Engine scenario locks: one-ply wins, fully pruned roots, asset cache
//! reuse across contexts, and shutdown residue.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use greedy_harness::worlds::nim::{Nim, Player};
use greedy_kernel::goal::{ExhaustiveGoal, Goal, TerminalGoal};
use greedy_kernel::model::Model;
use greedy_search::{Context, SearchPolicyV1, Termination};
use lock_tests::scripted::{Script, ScriptedState, Side};
use lock_tests::{running_engine, wait_quiescent};

fn root(script: &Arc<Script>) -> ScriptedState {
    script.state(0, Side::Max)
}

fn patient() -> SearchPolicyV1 {
    SearchPolicyV1::with_timeout(Duration::from_secs(30))
}

// ---------------------------------------------------------------------------
// ACCEPTANCE: TERMINAL-IN-ONE-PLY
// ---------------------------------------------------------------------------

#[test]
fn terminal_in_one_ply_is_reported_with_child_rank() {
    let script = Script::builder()
        .edge(0, "win", 1, 1)
        .terminal(1, Side::Min)
        .value(1, 50)
        .build();
    let engine = running_engine::<ScriptedState>(2);
    let context = Context::new(root(&script), Side::Max, TerminalGoal, patient());
    engine.search(&context);

    assert_eq!(
        context.await_completion(Duration::from_millis(1), true),
        Termination::Completed
    );
    let (finding, rank) = context.take_result().expect("a result").into_parts();
    assert_eq!(finding.label, "win");
    assert_eq!(rank, script.state(1, Side::Min).rank(1, Side::Max));
    assert_eq!(rank, 49);
}

// ---------------------------------------------------------------------------
// ACCEPTANCE: ALL-CHILDREN-PRUNED
// ---------------------------------------------------------------------------

/// Prunes every state except the root.
struct PruneBelowRoot;

impl Goal<ScriptedState> for PruneBelowRoot {
    fn is_fulfilled(&self, _model: &ScriptedState) -> bool {
        false
    }

    fn should_prune(&self, model: &ScriptedState) -> bool {
        model.id != 0
    }
}

#[test]
fn pruned_children_stage_no_result() {
    let script = Script::builder()
        .edge(0, "left", 1, 2)
        .edge(0, "right", 2, 1)
        .edge(1, "deeper", 3, 1)
        .value(1, 10)
        .value(2, 20)
        .build();
    let engine = running_engine::<ScriptedState>(2);
    let context = Context::new(root(&script), Side::Max, PruneBelowRoot, patient());
    engine.search(&context);
    wait_quiescent(&engine);

    assert!(context.take_result().is_none());
    assert_eq!(engine.stats().goal_prunes, 2);
    assert_eq!(script.apply_count(1, "deeper"), 0);
    // Pruned children are still registered as seen.
    assert_eq!(context.seen_len(), 3);
}

// ---------------------------------------------------------------------------
// ACCEPTANCE: ASSET-CACHE-ACROSS-CONTEXTS
// ---------------------------------------------------------------------------

#[test]
fn second_context_reuses_cached_transition() {
    let script = Script::builder()
        .edge(0, "a", 1, 1)
        .edge(1, "b", 2, 1)
        .build();
    let engine = running_engine::<ScriptedState>(2);

    let first = Context::new(root(&script), Side::Max, ExhaustiveGoal, patient());
    engine.search(&first);
    wait_quiescent(&engine);
    assert_eq!(script.apply_count(0, "a"), 1);
    assert_eq!(script.apply_count(1, "b"), 1);

    let second = Context::new(root(&script), Side::Max, ExhaustiveGoal, patient());
    engine.search(&second);
    wait_quiescent(&engine);
    assert_eq!(script.apply_count(0, "a"), 1);
    assert_eq!(script.apply_count(1, "b"), 1);
    assert_eq!(second.seen_len(), 3);
    assert!(engine.stats().asset_cache_hits >= 2);

    let bypass = SearchPolicyV1 {
        use_asset_cache: false,
        ..patient()
    };
    let third = Context::new(root(&script), Side::Max, ExhaustiveGoal, bypass);
    engine.search(&third);
    wait_quiescent(&engine);
    assert_eq!(script.apply_count(0, "a"), 2);
}

#[test]
fn unfed_cache_stays_cold() {
    let script = Script::builder().edge(0, "a", 1, 1).build();
    let engine = running_engine::<ScriptedState>(1);
    let policy = SearchPolicyV1 {
        feed_asset_cache: false,
        ..patient()
    };
    for _ in 0..2 {
        let context = Context::new(root(&script), Side::Max, ExhaustiveGoal, policy.clone());
        engine.search(&context);
        wait_quiescent(&engine);
    }
    assert_eq!(script.apply_count(0, "a"), 2);
    assert_eq!(engine.stats().asset_cache_hits, 0);
}

// ---------------------------------------------------------------------------
// ACCEPTANCE: SHUTDOWN-RELEASES-CONTEXTS
// ---------------------------------------------------------------------------

#[test]
fn stop_drains_queues_and_releases_the_context() {
    let mut engine = running_engine::<Nim>(1);
    let context = Context::new(
        Nim::new(vec![4, 4, 4, 4]),
        Player::One,
        ExhaustiveGoal,
        patient(),
    );
    let root = engine.search(&context);
    thread::sleep(Duration::from_millis(20));

    let report = engine.stop().expect("clean stop");
    assert_eq!(report.workers_joined, 2);
    let depths = engine.queue_depths();
    assert_eq!((depths.agents, depths.challenges), (0, 0));
    assert!(!engine.is_running());

    drop(root);
    assert_eq!(Arc::strong_count(&context), 1);
}

#[test]
fn dropping_a_running_engine_stops_it() {
    let context = {
        let engine = running_engine::<Nim>(2);
        let context = Context::new(
            Nim::new(vec![5, 5, 5]),
            Player::One,
            ExhaustiveGoal,
            patient(),
        );
        let _ = engine.search(&context);
        thread::sleep(Duration::from_millis(10));
        context
    };
    assert_eq!(Arc::strong_count(&context), 1);
}
