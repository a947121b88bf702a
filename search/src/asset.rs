//! Memoization key for model transitions.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use greedy_kernel::model::Model;

/// A `(model, finding)` pair: the key of a memoized `Model::apply`.
///
/// Two assets are equal iff both the models and the findings are equal.
pub struct Asset<M: Model> {
    model: Arc<M>,
    finding: M::Finding,
}

impl<M: Model> Asset<M> {
    #[must_use]
    pub fn new(model: Arc<M>, finding: M::Finding) -> Self {
        Self { model, finding }
    }

    #[must_use]
    pub fn model(&self) -> &M {
        &self.model
    }

    #[must_use]
    pub fn finding(&self) -> &M::Finding {
        &self.finding
    }

    /// Compute the transition this asset names.
    #[must_use]
    pub fn resolve(&self) -> M {
        self.model.apply(&self.finding)
    }
}

impl<M: Model> Clone for Asset<M> {
    fn clone(&self) -> Self {
        Self {
            model: Arc::clone(&self.model),
            finding: self.finding.clone(),
        }
    }
}

impl<M: Model> PartialEq for Asset<M> {
    fn eq(&self, other: &Self) -> bool {
        self.finding == other.finding && self.model == other.model
    }
}

impl<M: Model> Eq for Asset<M> {}

impl<M: Model> Hash for Asset<M> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.model.hash(state);
        self.finding.hash(state);
    }
}

impl<M: Model> std::fmt::Debug for Asset<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Asset")
            .field("model", &self.model)
            .field("finding", &self.finding)
            .finish()
    }
}
