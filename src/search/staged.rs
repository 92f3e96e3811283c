//! Staged tile placement: settle the top rows a few tiles at a time,
//! freezing each settled cell, then solve what is left with one IDA* run.

use std::collections::VecDeque;

use crate::config::{Budget, StagedConfig};
use crate::heuristic::{linear_conflict, Heuristic};
use crate::pattern_db::UNTRACKED;
use crate::puzzle::{Puzzle, Tile, EMPTY};
use crate::visited::CycleDetector;

use super::{Deadline, IdaStar, SearchError, Strategy, Trail};

/// Tiles brought home together, and the IDA* budget for doing so.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub tiles: Vec<Tile>,
    pub budget: Budget,
}

/// Places tiles in their goal cells stage by stage. Cells settled by a
/// stage are frozen for every later one.
///
/// Each stage first runs a capped IDA* towards "every tile of the stage is
/// home", then falls back to a breadth-first search that only tells the
/// stage's tiles and the empty cell apart. Once all stages are placed, a
/// capped IDA* that never moves a frozen tile solves the remainder.
///
/// Paths are not shortest. Boards too deep for a full IDA* usually still
/// come out solved.
#[derive(Debug, Clone)]
pub struct StagedPlacement {
    stages: Vec<Stage>,
    fallback: Budget,
    finish: Budget,
}

impl StagedPlacement {
    pub const NAME: &'static str = "staged";

    pub fn new(stages: Vec<Stage>, fallback: Budget, finish: Budget) -> Self {
        Self {
            stages,
            fallback,
            finish,
        }
    }

    /// Built-in plan for `size`: tiles 1..6 on 4x4, 1..12 on 5x5 and no
    /// placement stage on smaller boards.
    pub fn for_size(size: usize) -> Self {
        let (placed, finish_nodes, finish_ms) = match size {
            4 => (6, 600_000, 16_000),
            5 => (12, 400_000, 9_000),
            _ => (0, 5_000_000, 30_000),
        };
        let finish = Budget::unlimited()
            .with_max_nodes(finish_nodes)
            .with_time_ms(finish_ms);
        let fallback = Budget::unlimited().with_max_depth(40).with_max_nodes(200_000);
        Self::new(plan(size, placed), fallback, finish)
    }

    /// Layer the budgets set in `config` over this plan's.
    pub fn with_overrides(mut self, config: &StagedConfig) -> Self {
        for stage in &mut self.stages {
            stage.budget = config.place.or(stage.budget);
        }
        self.fallback = config.fallback.or(self.fallback);
        self.finish = config.finish.or(self.finish);
        self
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    fn place(
        &self,
        board: &Puzzle,
        stage: &Stage,
        frozen: &[bool],
    ) -> Result<Vec<Tile>, SearchError> {
        let home = |puzzle: &Puzzle| all_home(puzzle, &stage.tiles);
        let estimate = |puzzle: &Puzzle| placement_distance(puzzle, &stage.tiles);

        match IdaStar::new(stage.budget).solve_towards(board, &estimate, &home, frozen) {
            Ok(path) => return Ok(path),
            Err(err) => tracing::debug!(
                tiles = ?stage.tiles,
                %err,
                "placement ida* failed; falling back to breadth-first"
            ),
        }

        place_breadth_first(board, &stage.tiles, frozen, self.fallback).ok_or(
            SearchError::Unplaced {
                strategy: Self::NAME,
                tile: stage.tiles.first().copied().unwrap_or(EMPTY),
            },
        )
    }
}

/// Consecutive tiles from 1, one per stage, except that the last tile of a
/// row joins the stage before it: with the rest of its row frozen, the
/// row's last cell can only trade places with the cell below it.
fn plan(size: usize, placed: usize) -> Vec<Stage> {
    let mut stages: Vec<Stage> = Vec::new();
    for tile in (1..=placed).map(|tile| tile as Tile) {
        let last_in_row = Puzzle::goal_index(tile) % size == size - 1;
        if last_in_row {
            if let Some(stage) = stages.last_mut() {
                stage.tiles.push(tile);
                continue;
            }
        }
        stages.push(Stage {
            tiles: vec![tile],
            budget: stage_budget(size, tile),
        });
    }
    stages
}

fn stage_budget(size: usize, tile: Tile) -> Budget {
    let (nodes, ms) = match size {
        4 if tile as usize > size => (200_000, 3_500),
        4 => (300_000, 4_000),
        _ => (170_000, 3_000),
    };
    Budget::unlimited().with_max_nodes(nodes).with_time_ms(ms)
}

fn all_home(puzzle: &Puzzle, tiles: &[Tile]) -> bool {
    tiles
        .iter()
        .all(|&tile| puzzle.cells().get(Puzzle::goal_index(tile)) == Some(&tile))
}

/// Lower bound on the moves that bring `tiles` home: the grid distance of
/// each misplaced one, plus the slides needed before the empty cell
/// touches the nearest of them.
fn placement_distance(puzzle: &Puzzle, tiles: &[Tile]) -> usize {
    let size = puzzle.size();
    let (empty_row, empty_col) = (puzzle.empty_index() / size, puzzle.empty_index() % size);
    let mut total = 0;
    let mut approach: Option<usize> = None;

    for (idx, &tile) in puzzle.cells().iter().enumerate() {
        if tile == EMPTY || !tiles.contains(&tile) {
            continue;
        }
        let goal = Puzzle::goal_index(tile);
        if goal == idx {
            continue;
        }
        let (row, col) = (idx / size, idx % size);
        total += row.abs_diff(goal / size) + col.abs_diff(goal % size);
        let gap = row.abs_diff(empty_row) + col.abs_diff(empty_col) - 1;
        approach = Some(approach.map_or(gap, |best| best.min(gap)));
    }

    total + approach.unwrap_or(0)
}

/// Shortest placement of `tiles` within the budget, searching boards that
/// only tell `tiles` and the empty cell apart.
fn place_breadth_first(
    board: &Puzzle,
    tiles: &[Tile],
    frozen: &[bool],
    budget: Budget,
) -> Option<Vec<Tile>> {
    let project = |puzzle: &Puzzle| {
        let cells = puzzle
            .cells()
            .iter()
            .map(|&tile| {
                if tile == EMPTY || tiles.contains(&tile) {
                    tile
                } else {
                    UNTRACKED
                }
            })
            .collect();
        Puzzle::from_cells_unchecked(puzzle.size(), cells)
    };

    let mut deadline = Deadline::new(budget.time_limit());
    let mut visited = CycleDetector::new();
    let mut trail = Trail::new();
    let mut queue = VecDeque::from([(board.clone(), Trail::ROOT, 0usize)]);
    let mut expanded = 0u64;
    visited.seen(&project(board));

    while let Some((state, node, depth)) = queue.pop_front() {
        expanded += 1;
        if all_home(&state, tiles) {
            return Some(trail.path(node));
        }
        if budget.max_nodes.is_some_and(|max| expanded > max) || deadline.expired() {
            break;
        }
        if budget.max_depth.is_some_and(|max| depth >= max) {
            continue;
        }

        for (_, tile, next) in state.successors() {
            if frozen.get(next.empty_index()).copied().unwrap_or(false) {
                continue;
            }
            if !visited.seen(&project(&next)) {
                let child = trail.push(node, tile);
                queue.push_back((next, child, depth + 1));
            }
        }
    }

    tracing::trace!(?tiles, expanded, visited = visited.len(), "breadth-first placement gave up");
    None
}

impl Strategy for StagedPlacement {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn solve(&self, start: &Puzzle, heuristic: &dyn Heuristic) -> Result<Vec<Tile>, SearchError> {
        if start.is_solved() {
            return Ok(Vec::new());
        }

        let area = start.cells().len();
        let mut board = start.clone();
        let mut frozen = vec![false; area];
        let mut moves = Vec::new();

        for stage in &self.stages {
            let unplaceable = stage
                .tiles
                .iter()
                .find(|&&tile| tile == EMPTY || tile as usize >= area);
            if let Some(&tile) = unplaceable {
                return Err(SearchError::Unplaced {
                    strategy: Self::NAME,
                    tile,
                });
            }

            let path = self.place(&board, stage, &frozen)?;
            for &tile in &path {
                board = board.slide_tile(tile).map_err(|_| SearchError::Unplaced {
                    strategy: Self::NAME,
                    tile,
                })?;
            }
            moves.extend(path);
            for &tile in &stage.tiles {
                frozen[Puzzle::goal_index(tile)] = true;
            }
            tracing::debug!(tiles = ?stage.tiles, moves = moves.len(), "stage placed");
        }

        let finish = |puzzle: &Puzzle| heuristic.estimate(puzzle).max(linear_conflict(puzzle));
        let rest = IdaStar::new(self.finish).solve_towards(
            &board,
            &finish,
            &Puzzle::is_solved,
            &frozen,
        )?;
        moves.extend(rest);
        Ok(moves)
    }
}
