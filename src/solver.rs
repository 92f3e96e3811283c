//! Per-size strategy chains with escalating fallback.

use std::sync::OnceLock;
use std::time::Instant;

use crate::config::SolverConfig;
use crate::error::PuzzleError;
use crate::heuristic::{Combined, Heuristic, Manhattan};
use crate::pattern_db::PatternDatabase;
use crate::puzzle::{Puzzle, Tile};
use crate::search::{
    AStar, BoundedBfs, GraphSearch, IdaStar, MonteCarloRetry, StagedPlacement, Strategy,
};

/// Board sizes the dispatcher has a chain for.
pub const SUPPORTED_SIZES: [usize; 3] = [3, 4, 5];

/// Sizes whose chain consults a pattern database.
const PATTERN_SIZES: [usize; 2] = [3, 4];

/// Result of a dispatch. Running out of strategies is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Solved {
        moves: Vec<Tile>,
        strategy: &'static str,
    },
    NoSolution,
}

impl Outcome {
    pub fn moves(&self) -> Option<&[Tile]> {
        match self {
            Outcome::Solved { moves, .. } => Some(moves),
            Outcome::NoSolution => None,
        }
    }

    pub fn is_solved(&self) -> bool {
        matches!(self, Outcome::Solved { .. })
    }
}

/// Runs a fixed strategy chain per board size and returns the first path
/// any strategy finds.
///
/// Owns the pattern databases, each built at most once on first use and
/// shared read-only by every later solve. A `Solver` can be shared across
/// threads; each call keeps its own frontier and visited set.
#[derive(Debug, Default)]
pub struct Solver {
    config: SolverConfig,
    pattern_dbs: [OnceLock<Option<PatternDatabase>>; SUPPORTED_SIZES.len()],
}

impl Solver {
    pub fn new(config: SolverConfig) -> Self {
        config.validate();
        Self {
            config,
            pattern_dbs: Default::default(),
        }
    }

    /// Use an already-built database instead of building one lazily.
    ///
    /// Only 3x3 and 4x4 chains read a pattern database; a database for any
    /// other size is handed back unused.
    pub fn with_pattern_database(
        config: SolverConfig,
        db: PatternDatabase,
    ) -> Result<Self, PatternDatabase> {
        if !PATTERN_SIZES.contains(&db.size()) {
            return Err(db);
        }
        let solver = Self::new(config);
        if let Some(slot) = solver.db_slot(db.size()) {
            slot.get_or_init(|| Some(db));
        }
        Ok(solver)
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    fn db_slot(&self, size: usize) -> Option<&OnceLock<Option<PatternDatabase>>> {
        let idx = SUPPORTED_SIZES.iter().position(|&s| s == size)?;
        self.pattern_dbs.get(idx)
    }

    /// The pattern database for `size`, built on first request.
    pub fn pattern_database(&self, size: usize) -> Option<&PatternDatabase> {
        self.db_slot(size)?
            .get_or_init(|| PatternDatabase::for_size(size))
            .as_ref()
    }

    /// Validate `cells` as a `size`×`size` board and solve it.
    pub fn solve(&self, cells: &[Tile], size: usize) -> Result<Outcome, PuzzleError> {
        if !SUPPORTED_SIZES.contains(&size) {
            return Err(PuzzleError::UnsupportedSize(size));
        }
        let puzzle = Puzzle::from_cells(size, cells.to_vec())?;
        Ok(self.solve_puzzle(&puzzle))
    }

    /// Run the chain for an already well-formed board.
    pub fn solve_puzzle(&self, puzzle: &Puzzle) -> Outcome {
        let size = puzzle.size();
        if self.config.reject_unsolvable && !puzzle.is_solvable() {
            tracing::info!(size, "board has the wrong parity; skipping search");
            return Outcome::NoSolution;
        }

        let heuristic: Box<dyn Heuristic + '_> = if PATTERN_SIZES.contains(&size) {
            Box::new(Combined::new(self.pattern_database(size)))
        } else {
            Box::new(Manhattan)
        };

        let started = Instant::now();
        for strategy in self.chain(size) {
            let name = strategy.name();
            tracing::debug!(strategy = name, size, "starting strategy");
            let attempt = Instant::now();

            match strategy.solve(puzzle, heuristic.as_ref()) {
                Ok(moves) => {
                    tracing::info!(
                        strategy = name,
                        size,
                        moves = moves.len(),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "solved"
                    );
                    return Outcome::Solved {
                        moves,
                        strategy: name,
                    };
                }
                Err(err) => tracing::debug!(
                    strategy = name,
                    %err,
                    elapsed_ms = attempt.elapsed().as_millis() as u64,
                    "strategy failed; escalating"
                ),
            }
        }

        tracing::info!(
            size,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "no solution found"
        );
        Outcome::NoSolution
    }

    /// Strategies tried for `size`, in order.
    pub(crate) fn chain(&self, size: usize) -> Vec<Box<dyn Strategy>> {
        if !SUPPORTED_SIZES.contains(&size) {
            return Vec::new();
        }
        let budgets = self.config.budgets(size);
        let mut chain: Vec<Box<dyn Strategy>> = vec![Box::new(IdaStar::new(budgets.ida_star))];
        if size >= 4 && self.config.staged.enabled {
            let staged = StagedPlacement::for_size(size).with_overrides(&self.config.staged);
            chain.push(Box::new(staged));
        }
        chain.push(Box::new(AStar::new(budgets.astar)));
        chain.push(Box::new(BoundedBfs::new(budgets.bfs)));
        if size >= 4 {
            chain.push(Box::new(GraphSearch::new(budgets.graph.time_limit())));
        }
        if size == 5 {
            chain.push(Box::new(MonteCarloRetry::new(self.config.monte_carlo.clone())));
        }
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(solver: &Solver, size: usize) -> Vec<&'static str> {
        solver.chain(size).iter().map(|s| s.name()).collect()
    }

    #[test]
    fn test_chain_per_size() {
        let solver = Solver::default();
        assert_eq!(names(&solver, 3), vec!["ida*", "a*", "bfs"]);
        assert_eq!(names(&solver, 4), vec!["ida*", "a*", "bfs", "graph"]);
        assert_eq!(names(&solver, 5), vec!["ida*", "a*", "bfs", "graph", "monte-carlo"]);
        assert!(names(&solver, 6).is_empty());
    }

    #[test]
    fn test_staged_joins_larger_chains_when_enabled() {
        let config = SolverConfig::from_toml_str("[staged]\nenabled = true").unwrap();
        let solver = Solver::new(config);
        assert_eq!(names(&solver, 3), vec!["ida*", "a*", "bfs"]);
        assert_eq!(names(&solver, 4), vec!["ida*", "staged", "a*", "bfs", "graph"]);
        assert_eq!(
            names(&solver, 5),
            vec!["ida*", "staged", "a*", "bfs", "graph", "monte-carlo"]
        );
    }

    #[test]
    fn test_pattern_database_only_for_3x3() {
        let solver = Solver::default();
        assert!(solver.pattern_database(4).is_none());
        assert!(solver.pattern_database(7).is_none());
        let db = solver.pattern_database(3).unwrap();
        // Built once and reused.
        assert!(std::ptr::eq(db, solver.pattern_database(3).unwrap()));
    }

    #[test]
    fn test_injected_database_is_used() {
        let db = PatternDatabase::build(3, &[1, 2, 3]).unwrap();
        let solver = Solver::with_pattern_database(SolverConfig::default(), db).unwrap();
        assert_eq!(solver.pattern_database(3).unwrap().tracked(), &[1, 2, 3]);
    }

    #[test]
    fn test_injected_4x4_database_is_used() {
        let db = PatternDatabase::build(4, &[1, 2]).unwrap();
        let solver = Solver::with_pattern_database(SolverConfig::default(), db).unwrap();
        assert_eq!(solver.pattern_database(4).unwrap().tracked(), &[1, 2]);
        assert!(solver.pattern_database(3).is_some());
    }

    #[test]
    fn test_database_for_unused_size_is_returned() {
        let db = PatternDatabase::build(5, &[1]).unwrap();
        let rejected = Solver::with_pattern_database(SolverConfig::default(), db).unwrap_err();
        assert_eq!(rejected.size(), 5);
        assert_eq!(rejected.tracked(), &[1]);
    }

    #[test]
    fn test_rejects_unsupported_size() {
        let solver = Solver::default();
        assert!(matches!(
            solver.solve(&[1, 2, 3, 0], 2),
            Err(PuzzleError::UnsupportedSize(2))
        ));
        let err = solver.solve(&[0; 36], 6).unwrap_err();
        assert_eq!(err.to_string(), "unsupported puzzle size 6");
    }

    #[test]
    fn test_rejects_malformed_board() {
        let solver = Solver::default();
        assert!(matches!(
            solver.solve(&[1, 2, 3, 4, 5, 6, 7, 8, 8], 3),
            Err(PuzzleError::DuplicateTile(8))
        ));
    }

    #[test]
    fn test_parity_precheck() {
        let config = SolverConfig {
            reject_unsolvable: true,
            ..Default::default()
        };
        let solver = Solver::new(config);
        let outcome = solver.solve(&[2, 1, 3, 4, 5, 6, 7, 8, 0], 3).unwrap();
        assert_eq!(outcome, Outcome::NoSolution);
        assert_eq!(outcome.moves(), None);
    }

    #[test]
    fn test_first_strategy_wins() {
        let solver = Solver::default();
        let outcome = solver.solve(&[1, 2, 3, 4, 5, 6, 7, 0, 8], 3).unwrap();
        assert_eq!(
            outcome,
            Outcome::Solved {
                moves: vec![8],
                strategy: "ida*"
            }
        );
    }
}
