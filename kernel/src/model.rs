//! Problem state contract.

use std::fmt::Debug;
use std::hash::Hash;

use crate::finding::Finding;
use crate::role::{rotation, Role};

/// The problem state acted upon by findings.
///
/// # Contract
///
/// - `explore` is deterministic: equal models yield the same findings.
///   The engine memoizes it per model.
/// - `apply` is pure. It returns a fresh state and never mutates `self`;
///   the engine memoizes it per `(model, finding)`.
/// - Equality and hashing define transposition identity: two models are
///   the same search node iff they compare equal, whatever path led there.
/// - `rank` is total and comparable across siblings sharing a current
///   role. Comparing ranks computed for different current roles has no
///   meaning.
pub trait Model: Eq + Hash + Debug + Send + Sync + 'static {
    /// Turn-taking identity type.
    type Role: Role;
    /// Action type.
    type Finding: Finding<Role = Self::Role>;

    /// Legal findings at this state, in preference order.
    fn explore(&self) -> Vec<Self::Finding>;

    /// The state reached by performing `finding`.
    #[must_use]
    fn apply(&self, finding: &Self::Finding) -> Self
    where
        Self: Sized;

    /// Score of this state for `role` when reached at `depth` plies from the
    /// search root. Higher is better.
    fn rank(&self, depth: u32, role: Self::Role) -> i64;

    /// The role to act at this state.
    fn current_role(&self) -> Self::Role;

    /// Whether the problem has reached an end state attributed to `role`.
    fn is_terminal_for(&self, role: Self::Role) -> bool;

    /// The first role, in turn order from the current role, this state is
    /// terminal for.
    fn is_terminal(&self) -> Option<Self::Role> {
        rotation(self.current_role()).find(|role| self.is_terminal_for(*role))
    }
}
