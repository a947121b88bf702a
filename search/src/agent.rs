//! Search-tree nodes.
//!
//! Every agent of one root search lives in its context's arena,
//! addressed by [`AgentId`]. Parent links are indices into that arena, so
//! ancestry walks never keep a subtree alive and never form reference
//! cycles. An [`Agent`] value is a cheap handle onto one arena slot.
//!
//! The arena only grows. Finished subtrees stay until the context itself
//! is dropped; the context's seen set already holds every model for the
//! same lifetime, so releasing nodes early would not bound memory.

use std::cmp::Ordering;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use greedy_kernel::finding::Finding;
use greedy_kernel::model::Model;

use crate::context::Context;

/// Index of an agent within its context's arena. Lower ids are older.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(usize);

impl AgentId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

pub(crate) struct AgentNode<M: Model> {
    model: Arc<M>,
    finding: Option<M::Finding>,
    parent: Option<AgentId>,
    depth: u32,
    score: i64,
    /// Write-once: set by a descendant that reached a terminal state.
    failed: AtomicBool,
}

impl<M: Model> AgentNode<M> {
    fn is_failed(&self) -> bool {
        self.failed.load(AtomicOrdering::Acquire)
    }
}

/// Append-only store of every agent of one context.
pub(crate) struct AgentArena<M: Model> {
    nodes: RwLock<Vec<AgentNode<M>>>,
}

impl<M: Model> AgentArena<M> {
    pub(crate) fn new() -> Self {
        Self {
            nodes: RwLock::new(Vec::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<AgentNode<M>>> {
        self.nodes.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, node: AgentNode<M>) -> AgentId {
        let mut nodes = self.nodes.write().unwrap_or_else(PoisonError::into_inner);
        let id = AgentId(nodes.len());
        nodes.push(node);
        id
    }

    pub(crate) fn len(&self) -> usize {
        self.read().len()
    }

    fn node<T>(&self, id: AgentId, visit: impl FnOnce(&AgentNode<M>) -> T) -> Option<T> {
        self.read().get(id.0).map(visit)
    }

    /// Run `visit` over the nodes from `id` up to the root, under one read
    /// lock.
    fn lineage<T>(&self, id: AgentId, visit: impl FnOnce(Lineage<'_, M>) -> T) -> T {
        let nodes = self.read();
        visit(Lineage {
            nodes: nodes.as_slice(),
            next: Some(id),
        })
    }

    pub(crate) fn summaries(&self) -> Vec<AgentSummary<M::Finding>> {
        self.read()
            .iter()
            .enumerate()
            .map(|(index, node)| summarize(AgentId(index), node))
            .collect()
    }
}

/// Leaf-to-root walk over arena nodes. Includes the starting node.
struct Lineage<'a, M: Model> {
    nodes: &'a [AgentNode<M>],
    next: Option<AgentId>,
}

impl<'a, M: Model> Iterator for Lineage<'a, M> {
    type Item = &'a AgentNode<M>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.nodes.get(self.next?.0)?;
        self.next = node.parent;
        Some(node)
    }
}

fn summarize<M: Model>(id: AgentId, node: &AgentNode<M>) -> AgentSummary<M::Finding> {
    AgentSummary {
        id,
        parent: node.parent,
        depth: node.depth,
        failed: node.is_failed(),
        finding: node.finding.clone(),
    }
}

/// Diagnostic view of one arena slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSummary<F> {
    pub id: AgentId,
    pub parent: Option<AgentId>,
    pub depth: u32,
    pub failed: bool,
    pub finding: Option<F>,
}

/// Queue ordering key: higher score first, then shallower, then older.
///
/// `score` is `rank(depth, current_role)` computed once when the agent is
/// created. Agents whose current roles differ still compare by that number,
/// which keeps the order total but carries no game-theoretic meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AgentKey {
    score: i64,
    depth: u32,
    id: AgentId,
}

impl PartialOrd for AgentKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AgentKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .cmp(&other.score)
            .then_with(|| other.depth.cmp(&self.depth))
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// Handle onto one node of a context's search tree.
pub struct Agent<M: Model> {
    context: Arc<Context<M>>,
    id: AgentId,
    model: Arc<M>,
    finding: Option<M::Finding>,
    depth: u32,
    key: AgentKey,
}

impl<M: Model> Agent<M> {
    /// Create the depth-0 agent of `context`.
    ///
    /// The initial model is registered as seen; a second root on the same
    /// context (after [`Context::reset`]) is allowed.
    #[must_use]
    pub fn root(context: &Arc<Context<M>>) -> Self {
        let model = Arc::clone(context.initial_model());
        context.register_seen(Arc::clone(&model));
        Self::attach(context, model, None, None, 0)
    }

    /// Create the child reached by `finding`, registering `model` in the
    /// context's seen set. Returns `None` if an equal model was already
    /// registered (a transposition).
    #[must_use]
    pub fn spawn_child(&self, model: Arc<M>, finding: M::Finding) -> Option<Self> {
        if !self.context.register_seen(Arc::clone(&model)) {
            return None;
        }
        Some(Self::attach(
            &self.context,
            model,
            Some(finding),
            Some(self.id),
            self.depth + 1,
        ))
    }

    fn attach(
        context: &Arc<Context<M>>,
        model: Arc<M>,
        finding: Option<M::Finding>,
        parent: Option<AgentId>,
        depth: u32,
    ) -> Self {
        let score = model.rank(depth, model.current_role());
        let id = context.agents().push(AgentNode {
            model: Arc::clone(&model),
            finding: finding.clone(),
            parent,
            depth,
            score,
            failed: AtomicBool::new(false),
        });
        Self {
            context: Arc::clone(context),
            id,
            model,
            finding,
            depth,
            key: AgentKey { score, depth, id },
        }
    }

    /// Rebuild the handle for an existing arena slot.
    pub(crate) fn resolve(context: &Arc<Context<M>>, id: AgentId) -> Option<Self> {
        context.agents().node(id, |node| Self {
            context: Arc::clone(context),
            id,
            model: Arc::clone(&node.model),
            finding: node.finding.clone(),
            depth: node.depth,
            key: AgentKey {
                score: node.score,
                depth: node.depth,
                id,
            },
        })
    }

    #[must_use]
    pub fn id(&self) -> AgentId {
        self.id
    }

    #[must_use]
    pub fn context(&self) -> &Arc<Context<M>> {
        &self.context
    }

    #[must_use]
    pub fn model(&self) -> &Arc<M> {
        &self.model
    }

    /// The finding that produced this agent; `None` for the root.
    #[must_use]
    pub fn finding(&self) -> Option<&M::Finding> {
        self.finding.as_ref()
    }

    #[must_use]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// `rank(depth, current_role)` as computed at creation.
    #[must_use]
    pub fn score(&self) -> i64 {
        self.key.score
    }

    #[must_use]
    pub fn parent(&self) -> Option<AgentId> {
        self.context.agents().node(self.id, |node| node.parent).flatten()
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.context
            .agents()
            .node(self.id, AgentNode::is_failed)
            .unwrap_or(false)
    }

    /// Findings from the root to this agent.
    #[must_use]
    pub fn path(&self) -> Vec<M::Finding> {
        let mut path: Vec<_> = self.context.agents().lineage(self.id, |lineage| {
            lineage.filter_map(|node| node.finding.clone()).collect()
        });
        path.reverse();
        path
    }

    /// The finding taken at depth 1: the root mover's decision on this
    /// branch.
    #[must_use]
    pub fn first_move(&self) -> Option<M::Finding> {
        if self.depth == 0 {
            return None;
        }
        self.context.agents().lineage(self.id, |mut lineage| {
            lineage
                .find(|node| node.depth == 1)
                .and_then(|node| node.finding.clone())
        })
    }

    /// Whether this agent or any ancestor is flagged failed.
    #[must_use]
    pub fn ancestor_failed(&self) -> bool {
        self.context
            .agents()
            .lineage(self.id, |mut lineage| lineage.any(AgentNode::is_failed))
    }

    /// Whether this agent or any ancestor whose own finding was made by
    /// `role` is flagged failed.
    #[must_use]
    pub fn ancestor_failed_for(&self, role: M::Role) -> bool {
        self.context.agents().lineage(self.id, |mut lineage| {
            lineage.any(|node| {
                node.is_failed()
                    && node
                        .finding
                        .as_ref()
                        .is_some_and(|finding| finding.role() == role)
            })
        })
    }

    /// Findings of every failure-flagged agent on the walk, root first.
    #[must_use]
    pub fn collect_failed_ancestors(&self) -> Vec<M::Finding> {
        let mut failed: Vec<_> = self.context.agents().lineage(self.id, |lineage| {
            lineage
                .filter(|node| node.is_failed())
                .filter_map(|node| node.finding.clone())
                .collect()
        });
        failed.reverse();
        failed
    }

    /// Stage this branch's first move as a result, stamped with this
    /// agent's rank for the context's initial role.
    ///
    /// No-op when the first move belongs to another role.
    pub fn submit_result(&self) {
        let Some(first) = self.first_move() else {
            return;
        };
        let role = self.context.initial_role();
        if first.role() != role {
            return;
        }
        let rank = self.model.rank(self.depth, role);
        self.context.register_result(self, first.with_priority(rank));
    }

    /// Flag this agent failed. Never cleared.
    pub fn mark_failed(&self) {
        debug_assert!(
            self.finding.is_some(),
            "the root agent has no finding to fail"
        );
        self.context.agents().node(self.id, |node| {
            node.failed.store(true, AtomicOrdering::Release);
        });
    }

    #[must_use]
    pub fn summary(&self) -> Option<AgentSummary<M::Finding>> {
        self.context
            .agents()
            .node(self.id, |node| summarize(self.id, node))
    }
}

impl<M: Model> Clone for Agent<M> {
    fn clone(&self) -> Self {
        Self {
            context: Arc::clone(&self.context),
            id: self.id,
            model: Arc::clone(&self.model),
            finding: self.finding.clone(),
            depth: self.depth,
            key: self.key,
        }
    }
}

impl<M: Model> PartialEq for Agent<M> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<M: Model> Eq for Agent<M> {}

impl<M: Model> PartialOrd for Agent<M> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<M: Model> Ord for Agent<M> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl<M: Model> std::fmt::Debug for Agent<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.id)
            .field("depth", &self.depth)
            .field("score", &self.key.score)
            .field("finding", &self.finding)
            .finish_non_exhaustive()
    }
}
