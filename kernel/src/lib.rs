//! Greedy Kernel: the problem contract searched by the engine.
//!
//! A problem is a turn-taking state machine: a [`model::Model`] acted on by
//! [`role::Role`]s through [`finding::Finding`]s. A [`goal::Goal`] tells a
//! root search when it is done, what to prune and what to report early.
//!
//! # Module Dependency Direction
//!
//! `role` ← `finding` ← `model` ← `goal`
//!
//! The kernel knows nothing about search; `greedy_search` depends on it,
//! never the other way round.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod finding;
pub mod goal;
pub mod model;
pub mod role;
