//! The concurrent search substrate.
//!
//! An [`Engine`] runs `N` exploration workers and `N` application workers
//! connected by two priority work queues:
//!
//! ```text
//!   inject ──► agent queue ──► exploration ──► challenge queue ──► application
//!                  ▲                                                    │
//!                  └──────────────────── surviving children ◄───────────┘
//! ```
//!
//! Exploration turns an agent into challenges, one per finding. Application
//! resolves the transition, deduplicates it against the context's seen set
//! and runs the decision chain that stages results, propagates failure,
//! prunes and requeues. One engine serves any number of sequential
//! contexts; the explore and asset caches are shared by all of them.

use std::cmp::Reverse;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use greedy_kernel::finding::Finding;
use greedy_kernel::model::Model;
use tracing::{debug, info, trace, warn};

use crate::agent::Agent;
use crate::asset::Asset;
use crate::cache::{AssetCache, ExploreCache};
use crate::challenge::Challenge;
use crate::config::EngineConfig;
use crate::context::Context;
use crate::error::EngineError;
use crate::queue::{QueueProbe, Take, WorkQueue};
use crate::stats::{EngineStats, Event, StatsSnapshot};

/// Residue accounting returned by [`Engine::stop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ShutdownReport {
    pub workers_joined: usize,
    /// Queued agents dropped after the workers stopped.
    pub discarded_agents: usize,
    /// Queued challenges dropped after the workers stopped.
    pub discarded_challenges: usize,
}

/// Items waiting in each queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct QueueDepths {
    pub agents: usize,
    pub challenges: usize,
}

/// State shared by the engine handle and every worker thread.
struct Shared<M: Model> {
    agents: WorkQueue<Agent<M>>,
    challenges: WorkQueue<Challenge<M>>,
    explore_cache: ExploreCache<M>,
    asset_cache: AssetCache<M>,
    stats: EngineStats,
}

/// Concurrent best-first search engine over models of type `M`.
pub struct Engine<M: Model> {
    config: EngineConfig,
    shared: Arc<Shared<M>>,
    explorers: Vec<JoinHandle<()>>,
    appliers: Vec<JoinHandle<()>>,
}

fn idle(probe: QueueProbe) -> bool {
    probe.queued == 0 && probe.active == 0
}

fn capacity(value: usize, field: &str) -> Result<NonZeroUsize, EngineError> {
    NonZeroUsize::new(value).ok_or_else(|| EngineError::InvalidConfig {
        detail: format!("{field} must be at least 1"),
    })
}

impl<M: Model> Engine<M> {
    /// Build a stopped engine.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] if `config` fails validation.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let shared = Shared {
            agents: WorkQueue::new(),
            challenges: WorkQueue::new(),
            explore_cache: ExploreCache::new(capacity(
                config.explore_cache_capacity,
                "explore_cache_capacity",
            )?),
            asset_cache: AssetCache::new(capacity(
                config.asset_cache_capacity,
                "asset_cache_capacity",
            )?),
            stats: EngineStats::default(),
        };
        Ok(Self {
            config,
            shared: Arc::new(shared),
            explorers: Vec::new(),
            appliers: Vec::new(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.explorers.is_empty() || !self.appliers.is_empty()
    }

    /// Spawn the worker pairs.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::AlreadyRunning`] if workers are running, or
    /// [`EngineError::Spawn`] if a thread could not be created. Workers
    /// spawned before a failure are stopped again.
    pub fn start(&mut self) -> Result<(), EngineError> {
        if self.is_running() {
            return Err(EngineError::AlreadyRunning);
        }
        for index in 0..self.config.workers {
            if let Err(err) = self.spawn_pair(index) {
                warn!(index, error = %err, "worker spawn failed; stopping partial pool");
                let _ = self.stop();
                return Err(err.into());
            }
        }
        info!(workers = self.config.workers, "engine started");
        Ok(())
    }

    fn spawn_pair(&mut self, index: usize) -> std::io::Result<()> {
        let shared = Arc::clone(&self.shared);
        self.explorers.push(
            thread::Builder::new()
                .name(format!("greedy-explore-{index}"))
                .spawn(move || shared.run_exploration())?,
        );
        let shared = Arc::clone(&self.shared);
        self.appliers.push(
            thread::Builder::new()
                .name(format!("greedy-apply-{index}"))
                .spawn(move || shared.run_application())?,
        );
        Ok(())
    }

    /// Stop every worker, join them and drop whatever is still queued.
    ///
    /// Stop tokens are served ahead of queued work, so this returns as soon
    /// as each worker finishes its current item.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotRunning`] if no workers are running, or
    /// [`EngineError::WorkerPanicked`] if any worker had panicked. Queues are
    /// drained in both cases where workers existed.
    pub fn stop(&mut self) -> Result<ShutdownReport, EngineError> {
        if !self.is_running() {
            return Err(EngineError::NotRunning);
        }
        for _ in 0..self.explorers.len() {
            self.shared.agents.push_stop();
        }
        for _ in 0..self.appliers.len() {
            self.shared.challenges.push_stop();
        }
        let handles: Vec<_> = self
            .explorers
            .drain(..)
            .chain(self.appliers.drain(..))
            .collect();
        let total = handles.len();
        let panicked = handles
            .into_iter()
            .map(JoinHandle::join)
            .filter(Result::is_err)
            .count();
        let report = ShutdownReport {
            workers_joined: total - panicked,
            discarded_agents: self.shared.agents.drain(),
            discarded_challenges: self.shared.challenges.drain(),
        };
        if panicked > 0 {
            warn!(panicked, "engine stopped with panicked workers");
            return Err(EngineError::WorkerPanicked { count: panicked });
        }
        info!(
            workers = report.workers_joined,
            discarded_agents = report.discarded_agents,
            discarded_challenges = report.discarded_challenges,
            "engine stopped"
        );
        Ok(report)
    }

    /// Queue `agent` for exploration. Agents queued on a stopped engine wait
    /// for the next [`Engine::start`].
    pub fn inject(&self, agent: Agent<M>) {
        debug!(agent = agent.id().index(), depth = agent.depth(), "agent injected");
        self.shared.agents.push(agent);
    }

    /// Create the root agent of `context`, inject it and return it.
    pub fn search(&self, context: &Arc<Context<M>>) -> Agent<M> {
        let root = Agent::root(context);
        self.inject(root.clone());
        root
    }

    /// Findings of `model` through the engine's explore cache.
    #[must_use]
    pub fn explore_cached(&self, model: &Arc<M>) -> Arc<[M::Finding]> {
        self.shared.explore(model)
    }

    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        self.shared.stats.snapshot(
            self.shared.explore_cache.counters(),
            self.shared.asset_cache.counters(),
        )
    }

    #[must_use]
    pub fn queue_depths(&self) -> QueueDepths {
        QueueDepths {
            agents: self.shared.agents.len(),
            challenges: self.shared.challenges.len(),
        }
    }

    /// Whether both queues are empty, no worker holds an item and no push
    /// happened while checking.
    #[must_use]
    pub fn is_quiescent(&self) -> bool {
        let probe = || (self.shared.agents.probe(), self.shared.challenges.probe());
        let (agents, challenges) = probe();
        if !idle(agents) || !idle(challenges) {
            return false;
        }
        let (agents_after, challenges_after) = probe();
        idle(agents_after)
            && idle(challenges_after)
            && agents_after.pushes == agents.pushes
            && challenges_after.pushes == challenges.pushes
    }
}

impl<M: Model> Drop for Engine<M> {
    fn drop(&mut self) {
        if self.is_running() {
            if let Err(err) = self.stop() {
                warn!(error = %err, "engine drop could not stop cleanly");
            }
        }
    }
}

impl<M: Model> std::fmt::Debug for Engine<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("running", &self.is_running())
            .field("queue_depths", &self.queue_depths())
            .finish_non_exhaustive()
    }
}

impl<M: Model> Shared<M> {
    fn run_exploration(&self) {
        debug!("exploration worker started");
        while let Take::Work(agent) = self.agents.take() {
            self.expand(&agent);
            self.agents.done();
        }
        debug!("exploration worker stopped");
    }

    fn run_application(&self) {
        debug!("application worker started");
        while let Take::Work(challenge) = self.challenges.take() {
            self.apply(challenge);
            self.challenges.done();
        }
        debug!("application worker stopped");
    }

    fn explore(&self, model: &Arc<M>) -> Arc<[M::Finding]> {
        self.explore_cache
            .get_or_insert_with(Arc::clone(model), || model.explore().into())
    }

    /// Publish one challenge per finding of `agent`, best first.
    fn expand(&self, agent: &Agent<M>) {
        let context = agent.context();
        if context.is_completed() {
            self.stats.record(Event::Abandoned);
            return;
        }
        let findings = self.explore(agent.model());
        self.stats.record(Event::Expansion);
        let mut challenges: Vec<_> = findings
            .iter()
            .map(|finding| Challenge::new(agent.clone(), finding.clone()))
            .collect();
        challenges.sort_by_key(|challenge| Reverse(challenge.priority()));
        for challenge in challenges {
            if context.is_completed() {
                self.stats.record(Event::Abandoned);
                break;
            }
            context.begin_challenge();
            self.challenges.push(challenge);
            self.stats.record(Event::ChallengePublished);
        }
    }

    /// The successor of `model` under `finding`, through the asset cache as
    /// the context's policy allows.
    fn transition(&self, context: &Context<M>, model: &Arc<M>, finding: &M::Finding) -> Arc<M> {
        let policy = context.policy();
        let asset = Asset::new(Arc::clone(model), finding.clone());
        if policy.use_asset_cache {
            if let Some(next) = self.asset_cache.get(&asset) {
                return next;
            }
        }
        self.stats.record(Event::ApplyCall);
        let next = Arc::new(asset.resolve());
        if policy.feed_asset_cache {
            self.asset_cache.insert(asset, Arc::clone(&next));
        }
        next
    }

    fn apply(&self, challenge: Challenge<M>) {
        let (agent, finding) = challenge.into_work();
        let context = Arc::clone(agent.context());
        context.finish_challenge();
        if context.is_completed() {
            self.stats.record(Event::Abandoned);
            return;
        }
        self.stats.record(Event::Application);
        let next = self.transition(&context, agent.model(), &finding);
        let Some(child) = agent.spawn_child(next, finding.clone()) else {
            trace!(parent = agent.id().index(), ?finding, "transposition");
            self.stats.record(Event::Transposition);
            return;
        };
        self.decide(&context, &agent, child, &finding);
    }

    /// Decision chain for a freshly created child. The order is fixed:
    /// failure propagation runs before any rule that reads failure flags,
    /// and the first-result guarantee runs last.
    fn decide(
        &self,
        context: &Context<M>,
        agent: &Agent<M>,
        child: Agent<M>,
        finding: &M::Finding,
    ) {
        let goal = context.goal();
        let model = child.model().as_ref();

        if let Some(role) = model.is_terminal() {
            trace!(child = child.id().index(), depth = child.depth(), ?role, "terminal");
            self.stats.record(Event::Termination);
            child.submit_result();
            if goal.is_fulfilled(model) {
                context.announce_completion();
            }
            if agent.finding().is_some() {
                agent.mark_failed();
            }
            return;
        }

        if context.is_deadline_exceeded() {
            child.submit_result();
        }

        if goal.should_prune(model) {
            trace!(child = child.id().index(), "goal prune");
            self.stats.record(Event::GoalPrune);
            return;
        }

        if agent.ancestor_failed() {
            trace!(child = child.id().index(), "history prune");
            self.stats.record(Event::HistoryPrune);
            return;
        }

        let role = finding.role();
        if context.record_best(role, agent.model().rank(agent.depth(), role)) {
            child.submit_result();
        }

        if goal.is_snapshot(model) {
            child.submit_result();
        }

        if context.results_len() == 0 {
            child.submit_result();
        }

        if context.is_completed() {
            self.stats.record(Event::Abandoned);
            return;
        }
        trace!(child = child.id().index(), score = child.score(), "requeue");
        self.stats.record(Event::Requeued);
        self.agents.push(child);
    }
}
