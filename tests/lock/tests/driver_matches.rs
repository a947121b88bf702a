//! Driver locks: forced wins, transcript files and digest stability.

use greedy_harness::driver::{play_match, DriverConfig};
use greedy_harness::transcript::{
    MatchOutcomeV1, MatchTranscriptV1, MoveSourceV1, DOMAIN_MATCH_TRANSCRIPT,
};
use greedy_harness::worlds::nim::{Nim, Player};
use greedy_harness::worlds::tictactoe::{Board, Mark};
use greedy_kernel::goal::TerminalForGoal;
use greedy_kernel::role::Role;
use lock_tests::running_engine;
use sha2::{Digest, Sha256};

fn generous() -> DriverConfig {
    DriverConfig {
        timeout_ms: 5_000,
        ..DriverConfig::default()
    }
}

fn single_heap_match() -> MatchTranscriptV1 {
    let engine = running_engine::<Nim>(2);
    play_match(
        &engine,
        Nim::new(vec![3]),
        |role: Player| TerminalForGoal::new(role.next()),
        &generous(),
    )
    .expect("match runs")
}

// ---------------------------------------------------------------------------
// ACCEPTANCE: FORCED-WIN
// ---------------------------------------------------------------------------

#[test]
fn immediate_tictactoe_win_is_taken() {
    let engine = running_engine::<Board>(2);
    let board = Board::parse("XX.OO....").expect("valid layout");
    let transcript = play_match(
        &engine,
        board,
        |role: Mark| TerminalForGoal::new(role.next()),
        &generous(),
    )
    .expect("match runs");

    assert_eq!(transcript.plies.len(), 1);
    let ply = &transcript.plies[0];
    assert_eq!(ply.role, "X");
    assert_eq!(ply.finding, "X@2");
    assert_eq!(ply.rank, Some(999));
    assert_eq!(ply.source, MoveSourceV1::Search);
    assert_eq!(transcript.outcome, MatchOutcomeV1::Terminal { role: "O".into() });
}

#[test]
fn finished_position_records_no_plies() {
    let engine = running_engine::<Nim>(1);
    let transcript = play_match(
        &engine,
        Nim::new(vec![0, 0]),
        |role: Player| TerminalForGoal::new(role.next()),
        &generous(),
    )
    .expect("match runs");
    assert!(transcript.plies.is_empty());
    assert_eq!(transcript.outcome, MatchOutcomeV1::Terminal { role: "One".into() });
}

// ---------------------------------------------------------------------------
// ACCEPTANCE: TRANSCRIPT-ARTIFACT
// ---------------------------------------------------------------------------

#[test]
fn forced_match_digest_is_reproducible() {
    let first = single_heap_match();
    let second = single_heap_match();
    assert_eq!(first, second);
    assert_eq!(
        first.digest().expect("digest"),
        second.digest().expect("digest")
    );
}

#[test]
fn transcript_file_survives_a_round_trip() {
    let transcript = single_heap_match();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nim.json");
    transcript.write_json(&path).expect("write");

    let restored = MatchTranscriptV1::read_json(&path).expect("read");
    assert_eq!(restored, transcript);
    assert_eq!(
        restored.digest().expect("digest"),
        transcript.digest().expect("digest")
    );

    let raw: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&path).expect("raw bytes")).expect("json");
    assert_eq!(raw["schema_version"], "match_transcript.v1");
    assert_eq!(raw["plies"][0]["finding"], "heap 0 take 3");
    assert_eq!(raw["plies"][0]["source"], "search");
    assert_eq!(raw["outcome"]["type"], "terminal");
}

#[test]
fn digest_covers_domain_prefix_and_json_bytes() {
    let transcript = single_heap_match();
    let mut hasher = Sha256::new();
    hasher.update(DOMAIN_MATCH_TRANSCRIPT);
    hasher.update(transcript.to_json_bytes().expect("json"));
    let expected = format!("sha256:{}", hex::encode(hasher.finalize()));
    assert_eq!(transcript.digest().expect("digest"), expected);
}
