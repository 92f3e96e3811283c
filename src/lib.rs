//! Sliding-tile puzzle solver for 3x3, 4x4 and 5x5 boards.
//!
//! # Key types
//!
//! - [`Solver`]: dispatches a board to its size's strategy chain
//! - [`Puzzle`]: immutable flattened board with adjacency
//! - [`Heuristic`]: Manhattan, linear conflict, pattern database, combined
//! - [`PatternDatabase`]: exact sub-puzzle distances built by BFS from the goal
//! - [`Strategy`]: IDA*, A*, bounded BFS, graph search, Monte-Carlo retry,
//!   staged tile placement
//! - [`SolverConfig`]: per-size budgets loaded from TOML

pub mod config;
pub mod error;
pub mod heuristic;
pub mod pattern_db;
pub mod puzzle;
pub mod render;
pub mod search;
pub mod solver;
pub mod symmetry;
pub mod visited;

pub use config::{Budget, ChainBudgets, MonteCarloConfig, SolverConfig, StagedConfig};
pub use error::PuzzleError;
pub use heuristic::{
    linear_conflict, manhattan, Combined, Heuristic, LinearConflict, Manhattan, PatternHeuristic,
};
pub use pattern_db::PatternDatabase;
pub use puzzle::{Direction, Puzzle, Tile, EMPTY};
pub use search::{
    AStar, BoundedBfs, GraphSearch, IdaStar, MonteCarloRetry, SearchError, Stage, StagedPlacement,
    Strategy,
};
pub use solver::{Outcome, Solver, SUPPORTED_SIZES};
pub use symmetry::{canonical, Symmetry};
pub use visited::CycleDetector;
