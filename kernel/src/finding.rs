//! Candidate actions.

use std::fmt::Debug;
use std::hash::Hash;

use crate::role::Role;

/// One legal action available to a role at a model state.
///
/// `priority` is a selection weight among the candidates of one node, not
/// an outcome score. The engine only rewrites it when staging a result,
/// where it carries the rank of the line the finding opens.
///
/// Equality and hashing take part in transition memoization, so two
/// findings that lead to the same successor from the same model should
/// compare equal.
pub trait Finding: Clone + Eq + Hash + Debug + Send + Sync + 'static {
    /// The role type of the problem this finding belongs to.
    type Role: Role;

    /// The role that performs this action.
    fn role(&self) -> Self::Role;

    /// Selection weight; higher is tried first.
    fn priority(&self) -> i64;

    /// Overwrite the selection weight.
    fn set_priority(&mut self, priority: i64);

    /// Copy of this finding carrying `priority`.
    #[must_use]
    fn with_priority(&self, priority: i64) -> Self {
        let mut stamped = self.clone();
        stamped.set_priority(priority);
        stamped
    }
}
