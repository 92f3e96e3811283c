//! Search strategies sharing one signature: a start board and a heuristic
//! in, a move path or a [`SearchError`] out. Each strategy owns its budget.

pub mod astar;
pub mod bfs;
pub mod ida_star;
pub mod monte_carlo;
pub mod staged;

use std::time::{Duration, Instant};

use crate::heuristic::Heuristic;
use crate::puzzle::{Puzzle, Tile, EMPTY};

pub use astar::AStar;
pub use bfs::{BoundedBfs, GraphSearch};
pub use ida_star::IdaStar;
pub use monte_carlo::{MonteCarloRetry, RankedMove};
pub use staged::{Stage, StagedPlacement};

/// Why a strategy returned without a path. Neither is a fault: both make
/// the dispatcher escalate to the next strategy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("{strategy} timed out after {elapsed:?}")]
    Timeout {
        strategy: &'static str,
        elapsed: Duration,
    },
    #[error("{strategy} exhausted its search space after {expanded} expansions")]
    Exhausted { strategy: &'static str, expanded: u64 },
    #[error("{strategy} gave up after {attempts} attempts")]
    GaveUp {
        strategy: &'static str,
        attempts: usize,
    },
    #[error("{strategy} could not place tile {tile}")]
    Unplaced { strategy: &'static str, tile: Tile },
}

/// A search algorithm bound to its own resource budget.
pub trait Strategy {
    fn name(&self) -> &'static str;

    /// Find a move sequence from `start` to the goal. A solved `start`
    /// yields an empty path.
    fn solve(&self, start: &Puzzle, heuristic: &dyn Heuristic) -> Result<Vec<Tile>, SearchError>;
}

/// Expansions between two reads of the wall clock.
const CLOCK_INTERVAL: u64 = 256;

/// Wall-clock budget sampled at a fixed cadence of expansions.
#[derive(Debug)]
pub(crate) struct Deadline {
    started: Instant,
    limit: Option<Duration>,
    ticks: u64,
}

impl Deadline {
    pub(crate) fn new(limit: Option<Duration>) -> Self {
        Self {
            started: Instant::now(),
            limit,
            ticks: 0,
        }
    }

    /// Call once per expansion. The clock is read on the first call and
    /// every [`CLOCK_INTERVAL`] calls after that.
    pub(crate) fn expired(&mut self) -> bool {
        let sample = self.ticks % CLOCK_INTERVAL == 0;
        self.ticks += 1;
        sample && self.limit.is_some_and(|limit| self.started.elapsed() >= limit)
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Parent-linked arena of the moves that reached each discovered board.
#[derive(Debug)]
pub(crate) struct Trail {
    nodes: Vec<(Option<usize>, Tile)>,
}

impl Trail {
    /// A trail holding only the start board, at index 0.
    pub(crate) fn new() -> Self {
        Self {
            nodes: vec![(None, EMPTY)],
        }
    }

    pub(crate) const ROOT: usize = 0;

    pub(crate) fn push(&mut self, parent: usize, tile: Tile) -> usize {
        self.nodes.push((Some(parent), tile));
        self.nodes.len() - 1
    }

    /// Moves from the start board to `node`, in order.
    pub(crate) fn path(&self, node: usize) -> Vec<Tile> {
        let mut path = Vec::new();
        let mut current = node;
        while let (Some(parent), tile) = self.nodes[current] {
            path.push(tile);
            current = parent;
        }
        path.reverse();
        path
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::puzzle::{Puzzle, Tile};

    pub fn board(size: usize, cells: &[Tile]) -> Puzzle {
        Puzzle::from_cells(size, cells.to_vec()).unwrap()
    }

    /// Assert that `moves` is a legal sequence ending on the goal.
    pub fn assert_solves(start: &Puzzle, moves: &[Tile]) {
        let end = start.apply_moves(moves).unwrap();
        assert!(end.is_solved(), "path {moves:?} ends on\n{end}");
    }

    /// A 5x5 board the chain cannot finish under millisecond budgets.
    pub fn hard_5x5() -> Puzzle {
        let mut cells: Vec<Tile> = (1..25).rev().collect();
        cells.push(0);
        // Reversing 24 tiles is an even permutation: this board is solvable.
        board(5, &cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trail_rebuilds_paths() {
        let mut trail = Trail::new();
        let a = trail.push(Trail::ROOT, 8);
        let b = trail.push(a, 5);
        let c = trail.push(Trail::ROOT, 6);
        assert_eq!(trail.path(Trail::ROOT), Vec::<Tile>::new());
        assert_eq!(trail.path(b), vec![8, 5]);
        assert_eq!(trail.path(c), vec![6]);
    }

    #[test]
    fn test_deadline_without_limit_never_expires() {
        let mut deadline = Deadline::new(None);
        assert!((0..1000).all(|_| !deadline.expired()));
    }

    #[test]
    fn test_zero_deadline_expires_on_first_sample() {
        let mut deadline = Deadline::new(Some(Duration::ZERO));
        assert!(deadline.expired());
    }

    #[test]
    fn test_search_error_display() {
        let err = SearchError::Exhausted {
            strategy: "bfs",
            expanded: 12,
        };
        assert_eq!(err.to_string(), "bfs exhausted its search space after 12 expansions");
        let err = SearchError::GaveUp {
            strategy: "monte-carlo",
            attempts: 3,
        };
        assert_eq!(err.to_string(), "monte-carlo gave up after 3 attempts");
    }
}
