//! Tiny two-player model shared by the unit tests of this crate.

use std::sync::Arc;

use greedy_kernel::finding::Finding;
use greedy_kernel::goal::Goal;
use greedy_kernel::model::Model;
use greedy_kernel::role::Role;

use crate::context::Context;
use crate::policy::SearchPolicyV1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    First,
    Second,
}

impl Role for Side {
    fn next(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Step {
    pub by: Side,
    pub amount: u8,
    pub priority: i64,
}

impl Finding for Step {
    type Role = Side;

    fn role(&self) -> Side {
        self.by
    }

    fn priority(&self) -> i64 {
        self.priority
    }

    fn set_priority(&mut self, priority: i64) {
        self.priority = priority;
    }
}

/// Subtraction game: take one or two from a counter; the side to move at
/// zero has lost.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Line {
    pub remaining: u8,
    pub to_move: Side,
}

impl Line {
    pub fn start(remaining: u8) -> Self {
        Self {
            remaining,
            to_move: Side::First,
        }
    }
}

impl Model for Line {
    type Role = Side;
    type Finding = Step;

    fn explore(&self) -> Vec<Step> {
        (1..=self.remaining.min(2))
            .map(|amount| Step {
                by: self.to_move,
                amount,
                priority: i64::from(amount),
            })
            .collect()
    }

    fn apply(&self, finding: &Step) -> Self {
        Self {
            remaining: self.remaining - finding.amount,
            to_move: self.to_move.next(),
        }
    }

    fn rank(&self, depth: u32, role: Side) -> i64 {
        let depth = i64::from(depth);
        match (self.remaining, self.to_move == role) {
            (0, true) => depth - 100,
            (0, false) => 100 - depth,
            _ => -depth,
        }
    }

    fn current_role(&self) -> Side {
        self.to_move
    }

    fn is_terminal_for(&self, role: Side) -> bool {
        self.remaining == 0 && self.to_move == role
    }
}

pub fn step(by: Side, amount: u8) -> Step {
    Step {
        by,
        amount,
        priority: i64::from(amount),
    }
}

/// Context over `Line::start(remaining)` solving for `Side::First`.
pub fn context<G: Goal<Line> + 'static>(
    remaining: u8,
    goal: G,
    policy: SearchPolicyV1,
) -> Arc<Context<Line>> {
    Context::new(Line::start(remaining), Side::First, goal, policy)
}
