//! Turn-taking identities.

use std::fmt::Debug;
use std::hash::Hash;

/// A turn-taking actor identity within a modeled problem.
///
/// Roles are small immutable values. `next` must form a cycle: starting
/// from any role and calling `next` repeatedly returns to that role.
pub trait Role: Copy + Eq + Hash + Debug + Send + Sync + 'static {
    /// The role that acts after this one.
    #[must_use]
    fn next(self) -> Self;
}

/// Iterator over every role of a cycle, starting at `start`.
#[derive(Debug, Clone)]
pub struct Rotation<R: Role> {
    start: R,
    current: Option<R>,
}

impl<R: Role> Iterator for Rotation<R> {
    type Item = R;

    fn next(&mut self) -> Option<R> {
        let role = self.current?;
        let following = role.next();
        self.current = if following == self.start {
            None
        } else {
            Some(following)
        };
        Some(role)
    }
}

/// All roles in turn order, beginning with `start` and ending with the role
/// whose successor is `start`.
#[must_use]
pub fn rotation<R: Role>(start: R) -> Rotation<R> {
    Rotation {
        start,
        current: Some(start),
    }
}
