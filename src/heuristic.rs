//! Admissible lower bounds on the number of moves left to the goal.

use crate::pattern_db::PatternDatabase;
use crate::puzzle::{Puzzle, EMPTY};

/// A lower bound on the remaining moves from a board to the goal.
///
/// Implementations must never overestimate for IDA* and A* to return
/// shortest paths.
pub trait Heuristic: Send + Sync {
    fn estimate(&self, puzzle: &Puzzle) -> usize;
}

impl<F> Heuristic for F
where
    F: Fn(&Puzzle) -> usize + Send + Sync,
{
    fn estimate(&self, puzzle: &Puzzle) -> usize {
        self(puzzle)
    }
}

/// Sum over tiles of the grid distance to their goal cell.
pub fn manhattan(puzzle: &Puzzle) -> usize {
    let size = puzzle.size();
    puzzle
        .cells()
        .iter()
        .enumerate()
        .filter(|&(_, &tile)| tile != EMPTY)
        .map(|(idx, &tile)| {
            let goal = Puzzle::goal_index(tile);
            (idx / size).abs_diff(goal / size) + (idx % size).abs_diff(goal % size)
        })
        .sum()
}

/// Manhattan distance plus two moves for every tile that has to leave its
/// goal row (or column) to let the others in that line pass.
pub fn linear_conflict(puzzle: &Puzzle) -> usize {
    let size = puzzle.size();
    let cells = puzzle.cells();
    let mut conflicts = 0;

    // Each line lists the goal coordinate along the line of every tile
    // already sitting in its goal line, in current order.
    let mut line = Vec::with_capacity(size);
    for row in 0..size {
        line.clear();
        for col in 0..size {
            let tile = cells[row * size + col];
            if tile != EMPTY && Puzzle::goal_index(tile) / size == row {
                line.push(Puzzle::goal_index(tile) % size);
            }
        }
        conflicts += line.len() - longest_increasing(&line);
    }
    for col in 0..size {
        line.clear();
        for row in 0..size {
            let tile = cells[row * size + col];
            if tile != EMPTY && Puzzle::goal_index(tile) % size == col {
                line.push(Puzzle::goal_index(tile) / size);
            }
        }
        conflicts += line.len() - longest_increasing(&line);
    }

    manhattan(puzzle) + 2 * conflicts
}

fn longest_increasing(keys: &[usize]) -> usize {
    let mut best = vec![1; keys.len()];
    for i in 0..keys.len() {
        for j in 0..i {
            if keys[j] < keys[i] && best[j] + 1 > best[i] {
                best[i] = best[j] + 1;
            }
        }
    }
    best.into_iter().max().unwrap_or(0)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Manhattan;

impl Heuristic for Manhattan {
    fn estimate(&self, puzzle: &Puzzle) -> usize {
        manhattan(puzzle)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LinearConflict;

impl Heuristic for LinearConflict {
    fn estimate(&self, puzzle: &Puzzle) -> usize {
        linear_conflict(puzzle)
    }
}

/// Exact sub-puzzle distance from a [`PatternDatabase`], or Manhattan when
/// no database covers the board.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternHeuristic<'a> {
    db: Option<&'a PatternDatabase>,
}

impl<'a> PatternHeuristic<'a> {
    pub fn new(db: Option<&'a PatternDatabase>) -> Self {
        Self { db }
    }
}

impl Heuristic for PatternHeuristic<'_> {
    fn estimate(&self, puzzle: &Puzzle) -> usize {
        self.db
            .and_then(|db| db.distance(puzzle))
            .unwrap_or_else(|| manhattan(puzzle))
    }
}

/// `max(pattern database, linear conflict)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Combined<'a> {
    pattern: PatternHeuristic<'a>,
}

impl<'a> Combined<'a> {
    pub fn new(db: Option<&'a PatternDatabase>) -> Self {
        Self {
            pattern: PatternHeuristic::new(db),
        }
    }
}

impl Heuristic for Combined<'_> {
    fn estimate(&self, puzzle: &Puzzle) -> usize {
        self.pattern.estimate(puzzle).max(linear_conflict(puzzle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, VecDeque};

    fn board(size: usize, cells: &[u8]) -> Puzzle {
        Puzzle::from_cells(size, cells.to_vec()).unwrap()
    }

    /// True distance to the goal for every board reachable on a 3x3 grid.
    fn all_distances() -> HashMap<Puzzle, usize> {
        let goal = Puzzle::new(3);
        let mut dist = HashMap::from([(goal.clone(), 0)]);
        let mut queue = VecDeque::from([goal]);
        while let Some(state) = queue.pop_front() {
            let d = dist[&state];
            for (_, _, next) in state.successors() {
                if !dist.contains_key(&next) {
                    dist.insert(next.clone(), d + 1);
                    queue.push_back(next);
                }
            }
        }
        dist
    }

    #[test]
    fn test_solved_board_is_zero() {
        for size in 3..=5 {
            let solved = Puzzle::new(size);
            assert_eq!(manhattan(&solved), 0);
            assert_eq!(linear_conflict(&solved), 0);
            assert_eq!(Combined::new(None).estimate(&solved), 0);
        }
    }

    #[test]
    fn test_manhattan_counts_each_tile() {
        let puzzle = board(3, &[2, 0, 3, 1, 4, 5, 6, 7, 8]);
        // 2:1, 1:1, 4:2, 5:2, 6:3, 7:1, 8:1
        assert_eq!(manhattan(&puzzle), 11);
    }

    #[test]
    fn test_linear_conflict_reversed_pair() {
        let puzzle = board(3, &[2, 1, 3, 4, 5, 6, 7, 8, 0]);
        assert_eq!(manhattan(&puzzle), 2);
        assert_eq!(linear_conflict(&puzzle), 4);
    }

    #[test]
    fn test_linear_conflict_one_tile_blocking_three() {
        let mut cells: Vec<u8> = vec![4, 1, 2, 3];
        cells.extend(5..=15);
        cells.push(0);
        let puzzle = board(4, &cells);
        assert_eq!(manhattan(&puzzle), 6);
        // Only tile 4 has to leave the row.
        assert_eq!(linear_conflict(&puzzle), 8);
    }

    #[test]
    fn test_linear_conflict_column() {
        let puzzle = board(3, &[7, 2, 3, 4, 5, 6, 1, 8, 0]);
        assert_eq!(manhattan(&puzzle), 4);
        // Column 0 holds 7, 4, 1 fully reversed: two of them must leave it.
        assert_eq!(linear_conflict(&puzzle), 8);
    }

    #[test]
    fn test_closure_heuristic() {
        let zero = |_: &Puzzle| 0usize;
        assert_eq!(zero.estimate(&Puzzle::new(4)), 0);
    }

    #[test]
    fn test_pattern_heuristic_falls_back_without_database() {
        let puzzle = board(4, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 0, 15]);
        assert_eq!(PatternHeuristic::new(None).estimate(&puzzle), 1);
    }

    #[test]
    fn test_admissible_on_every_reachable_3x3_board() {
        let distances = all_distances();
        assert_eq!(distances.len(), 181_440);
        let db = PatternDatabase::build(3, &[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        let combined = Combined::new(Some(&db));

        for (puzzle, &dist) in &distances {
            let m = manhattan(puzzle);
            let lc = linear_conflict(puzzle);
            assert!(m <= lc, "{puzzle}");
            assert!(lc <= dist, "{puzzle} lc={lc} dist={dist}");
            assert_eq!(combined.estimate(puzzle), dist);
        }
    }
}
