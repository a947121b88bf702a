//! Per-root-search coordination state.
//!
//! A [`Context`] is shared by the driver and every queued work item of one
//! root search. It owns the agent arena, the transposition table, the best
//! rank per role, the staged results and the completion latch. Nothing in
//! it is shared with other contexts; only the engine caches are.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver, Sender};
use greedy_kernel::finding::Finding;
use greedy_kernel::goal::Goal;
use greedy_kernel::model::Model;
use tracing::{debug, trace};

use crate::agent::{Agent, AgentArena, AgentId, AgentSummary};
use crate::challenge::Challenge;
use crate::policy::SearchPolicyV1;
use crate::queue::PriorityBuffer;

/// How [`Context::await_completion`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Completion was announced before the deadline.
    Completed,
    /// The deadline elapsed first.
    TimedOut,
}

/// A result waiting in the context: the agent that produced it and the
/// first move stamped with its rank.
struct Staged<F> {
    agent: AgentId,
    finding: F,
}

impl<F: Finding> PartialEq for Staged<F> {
    fn eq(&self, other: &Self) -> bool {
        self.finding.priority() == other.finding.priority()
    }
}

impl<F: Finding> Eq for Staged<F> {}

impl<F: Finding> PartialOrd for Staged<F> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<F: Finding> Ord for Staged<F> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.finding.priority().cmp(&other.finding.priority())
    }
}

/// Coordination state of one root search.
pub struct Context<M: Model> {
    goal: Arc<dyn Goal<M>>,
    initial_model: Arc<M>,
    initial_role: M::Role,
    policy: SearchPolicyV1,
    agents: AgentArena<M>,
    seen: Mutex<HashSet<Arc<M>>>,
    best_rank: Mutex<HashMap<M::Role, i64>>,
    results: Mutex<PriorityBuffer<Staged<M::Finding>>>,
    inflight: AtomicI64,
    completed: AtomicBool,
    signal_tx: Sender<()>,
    signal_rx: Receiver<()>,
    /// `None` when the timeout is too large to represent.
    deadline: Mutex<Option<Instant>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<M: Model> Context<M> {
    /// Create a context solving for `initial_role` from `initial_model`.
    /// The deadline clock starts now.
    pub fn new<G>(
        initial_model: impl Into<Arc<M>>,
        initial_role: M::Role,
        goal: G,
        policy: SearchPolicyV1,
    ) -> Arc<Self>
    where
        G: Goal<M> + 'static,
    {
        let (signal_tx, signal_rx) = channel::unbounded();
        let deadline = Instant::now().checked_add(policy.timeout());
        Arc::new(Self {
            goal: Arc::new(goal),
            initial_model: initial_model.into(),
            initial_role,
            policy,
            agents: AgentArena::new(),
            seen: Mutex::new(HashSet::new()),
            best_rank: Mutex::new(HashMap::new()),
            results: Mutex::new(PriorityBuffer::new()),
            inflight: AtomicI64::new(0),
            completed: AtomicBool::new(false),
            signal_tx,
            signal_rx,
            deadline: Mutex::new(deadline),
        })
    }

    #[must_use]
    pub fn goal(&self) -> &dyn Goal<M> {
        self.goal.as_ref()
    }

    #[must_use]
    pub fn initial_model(&self) -> &Arc<M> {
        &self.initial_model
    }

    #[must_use]
    pub fn initial_role(&self) -> M::Role {
        self.initial_role
    }

    #[must_use]
    pub fn policy(&self) -> &SearchPolicyV1 {
        &self.policy
    }

    pub(crate) fn agents(&self) -> &AgentArena<M> {
        &self.agents
    }

    /// Insert `model` into the seen set. Returns `false` if an equal model
    /// was already present.
    pub(crate) fn register_seen(&self, model: Arc<M>) -> bool {
        lock(&self.seen).insert(model)
    }

    /// Stage `finding` as a result produced by `agent`.
    pub fn register_result(&self, agent: &Agent<M>, finding: M::Finding) {
        trace!(agent = agent.id().index(), rank = finding.priority(), "result staged");
        lock(&self.results).push(Staged {
            agent: agent.id(),
            finding,
        });
    }

    /// Pop the best staged result whose branch has not been refuted for the
    /// initial role. Refuted results are discarded on the way.
    ///
    /// `None` means every known first move currently loses, or nothing has
    /// been computed yet.
    pub fn take_result(self: &Arc<Self>) -> Option<Challenge<M>> {
        loop {
            let staged = lock(&self.results).pop()?;
            let Some(agent) = Agent::resolve(self, staged.agent) else {
                continue;
            };
            if agent.ancestor_failed_for(self.initial_role) {
                trace!(agent = staged.agent.index(), "refuted result discarded");
                continue;
            }
            return Some(Challenge::new(agent, staged.finding));
        }
    }

    /// Record `rank` for `role` if it beats the stored best. Ties keep the
    /// earlier observation.
    pub fn record_best(&self, role: M::Role, rank: i64) -> bool {
        let mut best = lock(&self.best_rank);
        match best.get(&role) {
            Some(&stored) if stored >= rank => false,
            _ => {
                best.insert(role, rank);
                true
            }
        }
    }

    /// Latch completion and wake any waiter. Returns whether this call
    /// flipped the latch.
    pub fn announce_completion(&self) -> bool {
        let flipped = self
            .completed
            .compare_exchange(false, true, AtomicOrdering::AcqRel, AtomicOrdering::Acquire)
            .is_ok();
        if flipped {
            debug!(seen = self.seen_len(), "search completed");
            // The context holds the receiver, so the channel is never closed.
            let _ = self.signal_tx.send(());
        }
        flipped
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed.load(AtomicOrdering::Acquire)
    }

    #[must_use]
    pub fn is_deadline_exceeded(&self) -> bool {
        lock(&self.deadline).is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Block until completion is announced or the deadline elapses.
    ///
    /// On timeout, sleep `poll_interval` more so in-flight results can land,
    /// then force completion if `treat_timeout_as_complete` is set.
    pub fn await_completion(
        &self,
        poll_interval: Duration,
        treat_timeout_as_complete: bool,
    ) -> Termination {
        loop {
            if self.is_completed() {
                return Termination::Completed;
            }
            let deadline = *lock(&self.deadline);
            let signalled = match deadline {
                Some(deadline) => self.signal_rx.recv_deadline(deadline).is_ok(),
                None => self.signal_rx.recv().is_ok(),
            };
            if !signalled {
                break;
            }
        }
        debug!(
            inflight = self.inflight(),
            results = self.results_len(),
            "search deadline elapsed"
        );
        std::thread::sleep(poll_interval);
        if treat_timeout_as_complete {
            self.announce_completion();
        }
        Termination::TimedOut
    }

    /// Re-arm for another root injection: clear the completion latch and
    /// drop stale signals. Seen models, best ranks and staged results are
    /// kept.
    ///
    /// The deadline clock also restarts from now with the policy timeout.
    /// An earlier deadline does not carry over, so a reset context gets a
    /// full budget again.
    pub fn reset(&self) {
        self.completed.store(false, AtomicOrdering::Release);
        while self.signal_rx.try_recv().is_ok() {}
        *lock(&self.deadline) = Instant::now().checked_add(self.policy.timeout());
    }

    pub(crate) fn begin_challenge(&self) {
        self.inflight.fetch_add(1, AtomicOrdering::AcqRel);
    }

    pub(crate) fn finish_challenge(&self) {
        self.inflight.fetch_sub(1, AtomicOrdering::AcqRel);
    }

    /// Challenges published for this context and not yet taken.
    #[must_use]
    pub fn inflight(&self) -> i64 {
        self.inflight.load(AtomicOrdering::Acquire)
    }

    #[must_use]
    pub fn seen_len(&self) -> usize {
        lock(&self.seen).len()
    }

    #[must_use]
    pub fn has_seen(&self, model: &M) -> bool {
        lock(&self.seen).contains(model)
    }

    #[must_use]
    pub fn results_len(&self) -> usize {
        lock(&self.results).len()
    }

    #[must_use]
    pub fn best_rank(&self, role: M::Role) -> Option<i64> {
        lock(&self.best_rank).get(&role).copied()
    }

    #[must_use]
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    #[must_use]
    pub fn agent_summaries(&self) -> Vec<AgentSummary<M::Finding>> {
        self.agents.summaries()
    }
}

impl<M: Model> std::fmt::Debug for Context<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("initial_role", &self.initial_role)
            .field("completed", &self.is_completed())
            .field("inflight", &self.inflight())
            .field("agents", &self.agent_count())
            .finish_non_exhaustive()
    }
}
