//! Scripted graph model with instrumented transitions.
//!
//! A [`Script`] is a small directed graph of numbered states. Two sides
//! alternate; the state identity used for transpositions is `(id, side to
//! move)`. Every `apply` is counted per `(from, label)` so tests can prove
//! when the asset cache answered instead of the model.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use greedy_kernel::finding::Finding;
use greedy_kernel::model::Model;
use greedy_kernel::role::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Max,
    Min,
}

impl Role for Side {
    fn next(self) -> Self {
        match self {
            Self::Max => Self::Min,
            Self::Min => Self::Max,
        }
    }
}

/// Edge of the script taken by `role`. Equality ignores `priority`.
#[derive(Debug, Clone)]
pub struct ScriptedMove {
    pub role: Side,
    pub label: &'static str,
    pub target: u32,
    pub priority: i64,
}

impl PartialEq for ScriptedMove {
    fn eq(&self, other: &Self) -> bool {
        self.role == other.role && self.label == other.label && self.target == other.target
    }
}

impl Eq for ScriptedMove {}

impl Hash for ScriptedMove {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.role.hash(state);
        self.label.hash(state);
        self.target.hash(state);
    }
}

impl Finding for ScriptedMove {
    type Role = Side;

    fn role(&self) -> Side {
        self.role
    }

    fn priority(&self) -> i64 {
        self.priority
    }

    fn set_priority(&mut self, priority: i64) {
        self.priority = priority;
    }
}

#[derive(Debug, Clone)]
struct Edge {
    label: &'static str,
    target: u32,
    priority: i64,
}

/// Immutable graph plus the transition counters.
#[derive(Debug, Default)]
pub struct Script {
    edges: HashMap<u32, Vec<Edge>>,
    /// State id to the side that has lost there.
    terminal: HashMap<u32, Side>,
    /// Static value of a state for `Side::Max`; `Side::Min` sees the
    /// negation.
    values: HashMap<u32, i64>,
    apply_calls: Mutex<HashMap<(u32, &'static str), usize>>,
}

/// Builder for [`Script`].
#[derive(Debug, Default)]
pub struct ScriptBuilder {
    script: Script,
}

impl ScriptBuilder {
    #[must_use]
    pub fn edge(mut self, from: u32, label: &'static str, target: u32, priority: i64) -> Self {
        self.script.edges.entry(from).or_default().push(Edge {
            label,
            target,
            priority,
        });
        self
    }

    /// `loser` has lost at `state`. The side to move there must be `loser`
    /// for the state to count as terminal.
    #[must_use]
    pub fn terminal(mut self, state: u32, loser: Side) -> Self {
        self.script.terminal.insert(state, loser);
        self
    }

    #[must_use]
    pub fn value(mut self, state: u32, value: i64) -> Self {
        self.script.values.insert(state, value);
        self
    }

    #[must_use]
    pub fn build(self) -> Arc<Script> {
        Arc::new(self.script)
    }
}

impl Script {
    #[must_use]
    pub fn builder() -> ScriptBuilder {
        ScriptBuilder::default()
    }

    /// State `id` with `to_move` to act.
    #[must_use]
    pub fn state(self: &Arc<Self>, id: u32, to_move: Side) -> ScriptedState {
        ScriptedState {
            id,
            to_move,
            script: Arc::clone(self),
        }
    }

    /// How many times `apply` ran for the edge `label` out of `from`.
    #[must_use]
    pub fn apply_count(&self, from: u32, label: &'static str) -> usize {
        self.calls().get(&(from, label)).copied().unwrap_or(0)
    }

    fn record_apply(&self, from: u32, label: &'static str) {
        *self.calls().entry((from, label)).or_insert(0) += 1;
    }

    fn calls(&self) -> MutexGuard<'_, HashMap<(u32, &'static str), usize>> {
        self.apply_calls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A node of a [`Script`].
#[derive(Debug, Clone)]
pub struct ScriptedState {
    pub id: u32,
    pub to_move: Side,
    script: Arc<Script>,
}

impl PartialEq for ScriptedState {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.to_move == other.to_move
    }
}

impl Eq for ScriptedState {}

impl Hash for ScriptedState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.to_move.hash(state);
    }
}

impl Model for ScriptedState {
    type Role = Side;
    type Finding = ScriptedMove;

    fn explore(&self) -> Vec<ScriptedMove> {
        self.script
            .edges
            .get(&self.id)
            .map(|edges| {
                edges
                    .iter()
                    .map(|edge| ScriptedMove {
                        role: self.to_move,
                        label: edge.label,
                        target: edge.target,
                        priority: edge.priority,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn apply(&self, finding: &ScriptedMove) -> Self {
        self.script.record_apply(self.id, finding.label);
        Self {
            id: finding.target,
            to_move: self.to_move.next(),
            script: Arc::clone(&self.script),
        }
    }

    fn rank(&self, depth: u32, role: Side) -> i64 {
        let value = self.script.values.get(&self.id).copied().unwrap_or(0);
        let value = match role {
            Side::Max => value,
            Side::Min => -value,
        };
        value - i64::from(depth)
    }

    fn current_role(&self) -> Side {
        self.to_move
    }

    fn is_terminal_for(&self, role: Side) -> bool {
        role == self.to_move && self.script.terminal.get(&self.id) == Some(&role)
    }
}
