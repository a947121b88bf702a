//! Normal-play Nim: players alternately remove stones from one heap; the
//! player facing only empty heaps has lost.

use std::fmt;

use greedy_kernel::finding::Finding;
use greedy_kernel::model::Model;
use greedy_kernel::role::Role;

/// Selection bonus for moves that leave a zero nim-sum.
const BALANCING_BONUS: i64 = 100;

const WIN: i64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    One,
    Two,
}

impl Role for Player {
    fn next(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }
}

/// Remove `take` stones from heap `heap`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NimMove {
    pub player: Player,
    pub heap: usize,
    pub take: u8,
    pub priority: i64,
}

impl Finding for NimMove {
    type Role = Player;

    fn role(&self) -> Player {
        self.player
    }

    fn priority(&self) -> i64 {
        self.priority
    }

    fn set_priority(&mut self, priority: i64) {
        self.priority = priority;
    }
}

impl fmt::Display for NimMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "heap {} take {}", self.heap, self.take)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Nim {
    heaps: Vec<u8>,
    to_move: Player,
}

impl Nim {
    /// Position with the given heaps and player one to move.
    #[must_use]
    pub fn new(heaps: Vec<u8>) -> Self {
        Self {
            heaps,
            to_move: Player::One,
        }
    }

    #[must_use]
    pub fn heaps(&self) -> &[u8] {
        &self.heaps
    }

    #[must_use]
    pub fn nim_sum(&self) -> u8 {
        self.heaps.iter().fold(0, |acc, heap| acc ^ heap)
    }

    fn is_exhausted(&self) -> bool {
        self.heaps.iter().all(|heap| *heap == 0)
    }
}

impl Model for Nim {
    type Role = Player;
    type Finding = NimMove;

    fn explore(&self) -> Vec<NimMove> {
        let sum = self.nim_sum();
        let mut moves = Vec::new();
        for (heap, &size) in self.heaps.iter().enumerate() {
            for take in 1..=size {
                let balancing = sum ^ size ^ (size - take) == 0;
                moves.push(NimMove {
                    player: self.to_move,
                    heap,
                    take,
                    priority: i64::from(take) + if balancing { BALANCING_BONUS } else { 0 },
                });
            }
        }
        moves
    }

    fn apply(&self, finding: &NimMove) -> Self {
        let mut heaps = self.heaps.clone();
        if let Some(size) = heaps.get_mut(finding.heap) {
            *size = size.saturating_sub(finding.take);
        }
        Self {
            heaps,
            to_move: self.to_move.next(),
        }
    }

    fn rank(&self, depth: u32, role: Player) -> i64 {
        let depth = i64::from(depth);
        if self.is_exhausted() {
            return if self.to_move == role {
                depth - WIN
            } else {
                WIN - depth
            };
        }
        // A nonzero nim-sum wins for the side to move.
        let mover_wins = self.nim_sum() != 0;
        if mover_wins == (self.to_move == role) {
            10 - depth
        } else {
            -10 - depth
        }
    }

    fn current_role(&self) -> Player {
        self.to_move
    }

    fn is_terminal_for(&self, role: Player) -> bool {
        self.is_exhausted() && self.to_move == role
    }
}
