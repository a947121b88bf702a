//! Search goals: completion, pruning and snapshot predicates.

use crate::model::Model;
use crate::role::Role;

/// Caller-supplied predicates steering one root search.
pub trait Goal<M: Model>: Send + Sync {
    /// Reaching `model` completes the search.
    fn is_fulfilled(&self, model: &M) -> bool;

    /// Branches through `model` are not worth expanding.
    fn should_prune(&self, _model: &M) -> bool {
        false
    }

    /// `model` is worth reporting as a result even if it is not terminal.
    fn is_snapshot(&self, _model: &M) -> bool {
        false
    }
}

/// Completes on any terminal state.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalGoal;

impl<M: Model> Goal<M> for TerminalGoal {
    fn is_fulfilled(&self, model: &M) -> bool {
        model.is_terminal().is_some()
    }
}

/// Completes on a state that is terminal for one specific role.
#[derive(Debug, Clone, Copy)]
pub struct TerminalForGoal<R: Role> {
    role: R,
}

impl<R: Role> TerminalForGoal<R> {
    #[must_use]
    pub fn new(role: R) -> Self {
        Self { role }
    }

    #[must_use]
    pub fn role(&self) -> R {
        self.role
    }
}

impl<M: Model> Goal<M> for TerminalForGoal<M::Role> {
    fn is_fulfilled(&self, model: &M) -> bool {
        model.is_terminal_for(self.role)
    }
}

/// Never completes: the search runs until its deadline or until nothing is
/// left to expand.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExhaustiveGoal;

impl<M: Model> Goal<M> for ExhaustiveGoal {
    fn is_fulfilled(&self, _model: &M) -> bool {
        false
    }
}
