use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ahash::AHashMap;

use crate::config::Budget;
use crate::heuristic::Heuristic;
use crate::puzzle::{Puzzle, Tile};

use super::{Deadline, SearchError, Strategy, Trail};

/// Best-first search on `f = g + h` with a best-known `g` per board.
///
/// Shortest paths are guaranteed for a consistent heuristic. Every
/// discovered board stays in memory until the call returns.
#[derive(Debug, Clone)]
pub struct AStar {
    budget: Budget,
}

impl AStar {
    pub const NAME: &'static str = "a*";

    pub fn new(budget: Budget) -> Self {
        Self { budget }
    }
}

/// Frontier entry. The heap pops the lowest `f`, then the lowest `g`, then
/// the earliest inserted.
#[derive(Debug)]
struct Frontier {
    f: usize,
    g: usize,
    seq: u64,
    node: usize,
    state: Puzzle,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap.
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.g.cmp(&self.g))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Work done by one A* call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Counters {
    expanded: u64,
    /// Popped entries skipped because a cheaper path had been queued since.
    stale: u64,
}

impl AStar {
    fn search(
        &self,
        start: &Puzzle,
        heuristic: &dyn Heuristic,
        counters: &mut Counters,
    ) -> Result<Vec<Tile>, SearchError> {
        if start.is_solved() {
            return Ok(Vec::new());
        }

        let mut deadline = Deadline::new(self.budget.time_limit());
        let mut trail = Trail::new();
        let mut best_g: AHashMap<Puzzle, usize> = AHashMap::new();
        best_g.insert(start.clone(), 0);
        let mut frontier = BinaryHeap::new();
        let mut seq = 0u64;

        frontier.push(Frontier {
            f: heuristic.estimate(start),
            g: 0,
            seq,
            node: Trail::ROOT,
            state: start.clone(),
        });

        while let Some(entry) = frontier.pop() {
            if best_g.get(&entry.state).is_some_and(|&g| g < entry.g) {
                counters.stale += 1;
                continue;
            }
            if entry.state.is_solved() {
                tracing::trace!(
                    expanded = counters.expanded,
                    frontier = frontier.len(),
                    "a* reached goal"
                );
                return Ok(trail.path(entry.node));
            }
            if deadline.expired() {
                return Err(SearchError::Timeout {
                    strategy: Self::NAME,
                    elapsed: deadline.elapsed(),
                });
            }
            counters.expanded += 1;
            if self.budget.max_nodes.is_some_and(|max| counters.expanded > max) {
                break;
            }
            if self.budget.max_depth.is_some_and(|max| entry.g >= max) {
                continue;
            }

            // A board comes back into the frontier whenever a strictly
            // cheaper path to it turns up, even after it was expanded.
            let g = entry.g + 1;
            for (_, tile, next) in entry.state.successors() {
                if best_g.get(&next).map_or(true, |&known| g < known) {
                    best_g.insert(next.clone(), g);
                    seq += 1;
                    frontier.push(Frontier {
                        f: g + heuristic.estimate(&next),
                        g,
                        seq,
                        node: trail.push(entry.node, tile),
                        state: next,
                    });
                }
            }
        }

        Err(SearchError::Exhausted {
            strategy: Self::NAME,
            expanded: counters.expanded,
        })
    }
}

impl Strategy for AStar {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn solve(&self, start: &Puzzle, heuristic: &dyn Heuristic) -> Result<Vec<Tile>, SearchError> {
        let mut counters = Counters::default();
        let result = self.search(start, heuristic, &mut counters);
        tracing::trace!(
            expanded = counters.expanded,
            stale = counters.stale,
            "a* finished"
        );
        result
    }
}
