use crate::config::Budget;
use crate::heuristic::Heuristic;
use crate::puzzle::{Direction, Puzzle, Tile};

use super::{Deadline, SearchError, Strategy};

/// Iterative-deepening A*: depth-first passes bounded by `g + h`, each
/// pass raising the bound to the smallest value that was pruned.
///
/// Memory is the current path only. Recursion depth never exceeds the
/// current bound plus one.
#[derive(Debug, Clone)]
pub struct IdaStar {
    budget: Budget,
}

impl IdaStar {
    pub const NAME: &'static str = "ida*";

    pub fn new(budget: Budget) -> Self {
        Self { budget }
    }
}

enum Descent {
    Found,
    /// Smallest `f` above the bound seen below this node, `usize::MAX` if none.
    Pruned(usize),
    Timeout,
    NodeLimit,
}

struct Pass<'a> {
    heuristic: &'a dyn Heuristic,
    goal: &'a dyn Fn(&Puzzle) -> bool,
    /// Cells whose tiles may not move.
    frozen: &'a [bool],
    deadline: Deadline,
    budget: Budget,
    expanded: u64,
    path: Vec<Tile>,
}

impl Pass<'_> {
    fn search(
        &mut self,
        node: &Puzzle,
        g: usize,
        h: usize,
        bound: usize,
        last: Option<Direction>,
    ) -> Descent {
        if self.deadline.expired() {
            return Descent::Timeout;
        }
        self.expanded += 1;
        if self.budget.max_nodes.is_some_and(|max| self.expanded > max) {
            return Descent::NodeLimit;
        }

        let f = g + h;
        if f > bound {
            return Descent::Pruned(f);
        }
        if (self.goal)(node) {
            return Descent::Found;
        }
        if self.budget.max_depth.is_some_and(|max| g >= max) {
            return Descent::Pruned(usize::MAX);
        }

        // Never slide the tile straight back into the cell it just left.
        let mut children: Vec<_> = node
            .successors()
            .filter(|(dir, _, next)| {
                !last.is_some_and(|prev| *dir == prev.opposite())
                    && !self.frozen.get(next.empty_index()).copied().unwrap_or(false)
            })
            .map(|(dir, tile, next)| {
                let h = self.heuristic.estimate(&next);
                (dir, tile, next, h)
            })
            .collect();
        children.sort_by_key(|&(_, _, _, h)| h);

        let mut min = usize::MAX;
        for (dir, tile, next, h) in children {
            self.path.push(tile);
            match self.search(&next, g + 1, h, bound, Some(dir)) {
                Descent::Pruned(t) => min = min.min(t),
                other => return other,
            }
            self.path.pop();
        }

        Descent::Pruned(min)
    }
}

impl IdaStar {
    /// Deepen from `start` until `goal` holds, never moving a tile out of a
    /// cell marked in `frozen`.
    pub(crate) fn solve_towards(
        &self,
        start: &Puzzle,
        heuristic: &dyn Heuristic,
        goal: &dyn Fn(&Puzzle) -> bool,
        frozen: &[bool],
    ) -> Result<Vec<Tile>, SearchError> {
        if goal(start) {
            return Ok(Vec::new());
        }

        let mut pass = Pass {
            heuristic,
            goal,
            frozen,
            deadline: Deadline::new(self.budget.time_limit()),
            budget: self.budget,
            expanded: 0,
            path: Vec::new(),
        };
        let h = heuristic.estimate(start);
        let mut bound = h;

        loop {
            match pass.search(start, 0, h, bound, None) {
                Descent::Found => return Ok(pass.path),
                Descent::Timeout => {
                    return Err(SearchError::Timeout {
                        strategy: Self::NAME,
                        elapsed: pass.deadline.elapsed(),
                    })
                }
                Descent::Pruned(usize::MAX) | Descent::NodeLimit => {
                    return Err(SearchError::Exhausted {
                        strategy: Self::NAME,
                        expanded: pass.expanded,
                    })
                }
                Descent::Pruned(next) => {
                    tracing::trace!(bound = next, expanded = pass.expanded, "ida* bound raised");
                    bound = next;
                }
            }
        }
    }
}

impl Strategy for IdaStar {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn solve(&self, start: &Puzzle, heuristic: &dyn Heuristic) -> Result<Vec<Tile>, SearchError> {
        self.solve_towards(start, heuristic, &Puzzle::is_solved, &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristic::{Combined, LinearConflict, Manhattan};
    use crate::pattern_db::PatternDatabase;
    use crate::search::test_support::{assert_solves, board, hard_5x5};

    #[test]
    fn test_solved_board_gives_empty_path() {
        let ida = IdaStar::new(Budget::unlimited().with_time_ms(0));
        for size in 3..=5 {
            assert_eq!(ida.solve(&Puzzle::new(size), &Manhattan), Ok(vec![]));
        }
    }

    #[test]
    fn test_one_move_away() {
        let ida = IdaStar::new(Budget::unlimited());
        let start = board(3, &[1, 2, 3, 4, 5, 6, 7, 0, 8]);
        assert_eq!(ida.solve(&start, &LinearConflict), Ok(vec![8]));
    }

    #[test]
    fn test_known_optimal_length() {
        let ida = IdaStar::new(Budget::unlimited());
        let start = board(3, &[2, 0, 3, 1, 4, 5, 6, 7, 8]);
        let db = PatternDatabase::for_size(3).unwrap();
        let moves = ida.solve(&start, &Combined::new(Some(&db))).unwrap();
        assert_solves(&start, &moves);
        assert_eq!(moves.len(), db.distance(&start).unwrap());
    }

    #[test]
    fn test_4x4_scramble() {
        let ida = IdaStar::new(Budget::unlimited().with_time_ms(20_000));
        let start = board(4, &[1, 2, 3, 4, 5, 6, 0, 8, 9, 10, 7, 11, 13, 14, 15, 12]);
        let moves = ida.solve(&start, &LinearConflict).unwrap();
        assert_solves(&start, &moves);
        assert_eq!(moves.len(), 3);
    }

    #[test]
    fn test_timeout_is_reported() {
        let ida = IdaStar::new(Budget::unlimited().with_time_ms(0));
        let err = ida.solve(&hard_5x5(), &Manhattan).unwrap_err();
        assert!(matches!(err, SearchError::Timeout { strategy: "ida*", .. }));
    }

    #[test]
    fn test_depth_cap_exhausts() {
        let ida = IdaStar::new(Budget::unlimited().with_max_depth(2));
        let start = board(3, &[2, 0, 3, 1, 4, 5, 6, 7, 8]);
        let err = ida.solve(&start, &Manhattan).unwrap_err();
        assert!(matches!(err, SearchError::Exhausted { strategy: "ida*", .. }));
    }

    #[test]
    fn test_node_cap_exhausts() {
        let ida = IdaStar::new(Budget::unlimited().with_max_nodes(10));
        let err = ida.solve(&hard_5x5(), &Manhattan).unwrap_err();
        assert_eq!(
            err,
            SearchError::Exhausted {
                strategy: "ida*",
                expanded: 11
            }
        );
    }

    #[test]
    fn test_frozen_cells_are_never_disturbed() {
        let ida = IdaStar::new(Budget::unlimited());
        // Tile 1 is home and the empty cell is next to it.
        let start = board(3, &[1, 8, 2, 0, 4, 3, 7, 6, 5]);
        let mut frozen = vec![false; 9];
        frozen[0] = true;
        let moves = ida
            .solve_towards(&start, &Manhattan, &Puzzle::is_solved, &frozen)
            .unwrap();
        assert_solves(&start, &moves);

        let mut replay = start.clone();
        for &tile in &moves {
            replay = replay.slide_tile(tile).unwrap();
            assert_eq!(replay.cells()[0], 1);
        }
    }

    #[test]
    fn test_custom_goal() {
        let ida = IdaStar::new(Budget::unlimited());
        let start = board(3, &[2, 0, 3, 1, 4, 5, 6, 7, 8]);
        let one_home = |p: &Puzzle| p.cells()[0] == 1;
        let moves = ida.solve_towards(&start, &Manhattan, &one_home, &[]).unwrap();
        let end = start.apply_moves(&moves).unwrap();
        assert_eq!(end.cells()[0], 1);
        assert!(!end.is_solved());
    }
}
