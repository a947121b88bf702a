//! Units of application work.

use std::cmp::Ordering;

use greedy_kernel::finding::Finding;
use greedy_kernel::model::Model;

use crate::agent::Agent;

/// A pending `(agent, finding)` pair.
///
/// Ordered by the finding's priority alone; queues serve equal priorities
/// first-in, first-out. When taken from a context's results, the priority
/// carries the rank of the line the finding opens.
pub struct Challenge<M: Model> {
    agent: Agent<M>,
    finding: M::Finding,
}

impl<M: Model> Challenge<M> {
    #[must_use]
    pub fn new(agent: Agent<M>, finding: M::Finding) -> Self {
        Self { agent, finding }
    }

    #[must_use]
    pub fn agent(&self) -> &Agent<M> {
        &self.agent
    }

    #[must_use]
    pub fn finding(&self) -> &M::Finding {
        &self.finding
    }

    #[must_use]
    pub fn priority(&self) -> i64 {
        self.finding.priority()
    }

    /// The external `(finding, rank)` view of a result.
    #[must_use]
    pub fn into_parts(self) -> (M::Finding, i64) {
        let rank = self.finding.priority();
        (self.finding, rank)
    }

    pub(crate) fn into_work(self) -> (Agent<M>, M::Finding) {
        (self.agent, self.finding)
    }
}

impl<M: Model> PartialEq for Challenge<M> {
    fn eq(&self, other: &Self) -> bool {
        self.priority() == other.priority()
    }
}

impl<M: Model> Eq for Challenge<M> {}

impl<M: Model> PartialOrd for Challenge<M> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<M: Model> Ord for Challenge<M> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority().cmp(&other.priority())
    }
}

impl<M: Model> std::fmt::Debug for Challenge<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Challenge")
            .field("agent", &self.agent.id())
            .field("finding", &self.finding)
            .finish()
    }
}
