//! Sample worlds used by the driver, tests and benchmarks.

pub mod nim;
pub mod tictactoe;
