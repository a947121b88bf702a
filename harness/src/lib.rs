//! Greedy Harness: drives the engine through whole matches.
//!
//! The harness plays a problem ply by ply on a running
//! [`greedy_search::Engine`] and records the result as a
//! [`transcript::MatchTranscriptV1`] artifact. It also ships the sample
//! worlds used by the tests and benchmarks, and the tracing subscriber
//! setup.
//!
//! The harness does NOT implement search; it delegates to the engine.
//! Worlds provide domain rules only.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod driver;
pub mod logging;
pub mod transcript;
pub mod worlds;
