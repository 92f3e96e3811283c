use std::collections::VecDeque;
use std::time::Duration;

use crate::config::Budget;
use crate::heuristic::Heuristic;
use crate::puzzle::{Puzzle, Tile};
use crate::visited::CycleDetector;

use super::{Deadline, SearchError, Strategy, Trail};

/// Level-order search capped by depth and expanded-node count.
///
/// Ignores the heuristic, which makes it a safety net when the heuristic
/// misleads the informed strategies.
#[derive(Debug, Clone)]
pub struct BoundedBfs {
    budget: Budget,
}

impl BoundedBfs {
    pub const NAME: &'static str = "bfs";

    pub fn new(budget: Budget) -> Self {
        Self { budget }
    }
}

impl Strategy for BoundedBfs {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn solve(&self, start: &Puzzle, _heuristic: &dyn Heuristic) -> Result<Vec<Tile>, SearchError> {
        breadth_first(Self::NAME, start, self.budget)
    }
}

/// Uncapped breadth-first traversal of the whole state graph. Only the
/// wall clock stops it short of the goal or of exhausting the component.
#[derive(Debug, Clone)]
pub struct GraphSearch {
    time_limit: Option<Duration>,
}

impl GraphSearch {
    pub const NAME: &'static str = "graph";

    pub fn new(time_limit: Option<Duration>) -> Self {
        Self { time_limit }
    }
}

impl Strategy for GraphSearch {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn solve(&self, start: &Puzzle, _heuristic: &dyn Heuristic) -> Result<Vec<Tile>, SearchError> {
        let budget = Budget {
            time_limit_ms: self.time_limit.map(|limit| limit.as_millis() as u64),
            ..Budget::unlimited()
        };
        breadth_first(Self::NAME, start, budget)
    }
}

fn breadth_first(
    strategy: &'static str,
    start: &Puzzle,
    budget: Budget,
) -> Result<Vec<Tile>, SearchError> {
    let mut deadline = Deadline::new(budget.time_limit());
    let mut visited = CycleDetector::new();
    let mut trail = Trail::new();
    let mut queue = VecDeque::from([(start.clone(), Trail::ROOT, 0usize)]);
    let mut expanded = 0u64;
    visited.seen(start);

    while let Some((state, node, depth)) = queue.pop_front() {
        expanded += 1;
        if state.is_solved() {
            return Ok(trail.path(node));
        }
        if budget.max_depth.is_some_and(|max| depth > max)
            || budget.max_nodes.is_some_and(|max| expanded > max)
        {
            break;
        }
        if deadline.expired() {
            return Err(SearchError::Timeout {
                strategy,
                elapsed: deadline.elapsed(),
            });
        }

        for (_, tile, next) in state.successors() {
            if !visited.seen(&next) {
                let child = trail.push(node, tile);
                queue.push_back((next, child, depth + 1));
            }
        }
    }

    tracing::trace!(strategy, expanded, visited = visited.len(), "breadth-first search gave up");
    Err(SearchError::Exhausted { strategy, expanded })
}
