//! Greedy Search: concurrent anytime best-first search engine.
//!
//! This crate provides the engine layer. It depends only on `greedy_kernel`
//! and does NOT depend on `greedy_harness`.
//!
//! # Crate dependency graph
//!
//! ```text
//! greedy_kernel  ←  greedy_search  ←  greedy_harness
//! (contract)        (engine)          (driver, transcript, worlds)
//! ```
//!
//! # Key types
//!
//! - [`Engine`]: worker pools, work queues and the shared caches
//! - [`Context`]: coordination state of one root search
//! - [`Agent`]: handle onto a node of a context's search tree
//! - [`Challenge`]: a pending `(agent, finding)` unit of work
//! - [`Asset`]: memoization key of a transition
//! - [`EngineConfig`] / [`SearchPolicyV1`]: engine-wide and per-search settings

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod agent;
pub mod asset;
pub mod cache;
pub mod challenge;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod policy;
pub mod queue;
pub mod stats;

#[cfg(test)]
mod test_support;

pub use agent::{Agent, AgentId, AgentSummary};
pub use asset::Asset;
pub use challenge::Challenge;
pub use config::EngineConfig;
pub use context::{Context, Termination};
pub use engine::{Engine, QueueDepths, ShutdownReport};
pub use error::{ConfigError, EngineError};
pub use policy::SearchPolicyV1;
pub use stats::StatsSnapshot;
