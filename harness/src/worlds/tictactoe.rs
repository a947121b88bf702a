//! Tic-tac-toe. Completing a line wins; the side to move at a completed
//! line has lost. A full board without a line is a draw: no moves and no
//! terminal role.

use std::fmt;

use greedy_kernel::finding::Finding;
use greedy_kernel::model::Model;
use greedy_kernel::role::Role;

const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

const WIN: i64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mark {
    X,
    O,
}

impl Role for Mark {
    fn next(self) -> Self {
        match self {
            Self::X => Self::O,
            Self::O => Self::X,
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::X => "X",
            Self::O => "O",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Place {
    pub mark: Mark,
    pub cell: usize,
    pub priority: i64,
}

impl Finding for Place {
    type Role = Mark;

    fn role(&self) -> Mark {
        self.mark
    }

    fn priority(&self) -> i64 {
        self.priority
    }

    fn set_priority(&mut self, priority: i64) {
        self.priority = priority;
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.mark, self.cell)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [Option<Mark>; 9],
    to_move: Mark,
}

impl Board {
    /// Empty board, X to move.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cells: [None; 9],
            to_move: Mark::X,
        }
    }

    /// Board from a 9-character row-major string of `X`, `O` and `.`.
    /// The side to move follows from the mark counts.
    #[must_use]
    pub fn parse(layout: &str) -> Option<Self> {
        let mut cells = [None; 9];
        let mut count = 0;
        for (cell, symbol) in cells.iter_mut().zip(layout.chars()) {
            *cell = match symbol {
                'X' => Some(Mark::X),
                'O' => Some(Mark::O),
                '.' => None,
                _ => return None,
            };
            count += 1;
        }
        if count != 9 || layout.chars().count() != 9 {
            return None;
        }
        let xs = cells.iter().filter(|c| **c == Some(Mark::X)).count();
        let os = cells.iter().filter(|c| **c == Some(Mark::O)).count();
        let to_move = match xs.checked_sub(os)? {
            0 => Mark::X,
            1 => Mark::O,
            _ => return None,
        };
        Some(Self { cells, to_move })
    }

    #[must_use]
    pub fn winner(&self) -> Option<Mark> {
        LINES.iter().find_map(|line| {
            let [a, b, c] = line.map(|i| self.cells[i]);
            match (a, b, c) {
                (Some(a), Some(b), Some(c)) if a == b && b == c => Some(a),
                _ => None,
            }
        })
    }

    /// Lines still open only to `mark`, minus lines open only to the
    /// opponent.
    fn line_balance(&self, mark: Mark) -> i64 {
        LINES
            .iter()
            .map(|line| {
                let own = line.iter().any(|&i| self.cells[i] == Some(mark));
                let theirs = line.iter().any(|&i| self.cells[i] == Some(mark.next()));
                match (own, theirs) {
                    (true, false) => 1,
                    (false, true) => -1,
                    _ => 0,
                }
            })
            .sum()
    }

    fn completes_line(&self, cell: usize, mark: Mark) -> bool {
        LINES.iter().filter(|line| line.contains(&cell)).any(|line| {
            line.iter()
                .all(|&i| i == cell || self.cells[i] == Some(mark))
        })
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

fn placement_weight(cell: usize) -> i64 {
    match cell {
        4 => 3,
        0 | 2 | 6 | 8 => 2,
        _ => 1,
    }
}

impl Model for Board {
    type Role = Mark;
    type Finding = Place;

    fn explore(&self) -> Vec<Place> {
        if self.winner().is_some() {
            return Vec::new();
        }
        (0..9)
            .filter(|&cell| self.cells[cell].is_none())
            .map(|cell| {
                let bonus = if self.completes_line(cell, self.to_move) {
                    10
                } else {
                    0
                };
                Place {
                    mark: self.to_move,
                    cell,
                    priority: placement_weight(cell) + bonus,
                }
            })
            .collect()
    }

    fn apply(&self, finding: &Place) -> Self {
        let mut cells = self.cells;
        if let Some(cell) = cells.get_mut(finding.cell) {
            *cell = Some(finding.mark);
        }
        Self {
            cells,
            to_move: self.to_move.next(),
        }
    }

    fn rank(&self, depth: u32, role: Mark) -> i64 {
        let depth = i64::from(depth);
        match self.winner() {
            Some(winner) if winner == role => WIN - depth,
            Some(_) => depth - WIN,
            None => self.line_balance(role) - depth,
        }
    }

    fn current_role(&self) -> Mark {
        self.to_move
    }

    fn is_terminal_for(&self, role: Mark) -> bool {
        self.winner().is_some_and(|winner| winner != role)
    }
}
