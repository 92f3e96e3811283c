use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

use crate::config::{Budget, MonteCarloConfig};
use crate::heuristic::Heuristic;
use crate::puzzle::{Direction, Puzzle, Tile};

use super::{IdaStar, SearchError, Strategy};

/// Best-effort escalation: rank the legal moves by how often short random
/// walks from them stumble onto the goal, commit to the best one and hand
/// the rest to a freshly budgeted IDA*. Repeats for a bounded number of
/// outer attempts, each continuing from the last committed board.
#[derive(Debug, Clone)]
pub struct MonteCarloRetry {
    config: MonteCarloConfig,
}

/// A candidate move scored by its random-walk solve count.
#[derive(Debug, Clone)]
pub struct RankedMove {
    pub direction: Direction,
    pub tile: Tile,
    pub board: Puzzle,
    pub solved: usize,
}

impl MonteCarloRetry {
    pub const NAME: &'static str = "monte-carlo";

    pub fn new(config: MonteCarloConfig) -> Self {
        Self { config }
    }

    /// Legal moves from `state`, most promising first. Ties are broken at
    /// random.
    pub fn rank_moves<R: Rng + ?Sized>(&self, state: &Puzzle, rng: &mut R) -> Vec<RankedMove> {
        let mut ranked: Vec<RankedMove> = state
            .successors()
            .map(|(direction, tile, board)| {
                let solved = (0..self.config.rollouts)
                    .filter(|_| random_walk_solves(&board, self.config.walk_depth, rng))
                    .count();
                RankedMove {
                    direction,
                    tile,
                    board,
                    solved,
                }
            })
            .collect();

        ranked.shuffle(rng);
        ranked.sort_by(|a, b| b.solved.cmp(&a.solved));
        ranked
    }

    /// [`Strategy::solve`] with an injected source of randomness.
    pub fn solve_with_rng<R: Rng + ?Sized>(
        &self,
        start: &Puzzle,
        heuristic: &dyn Heuristic,
        rng: &mut R,
    ) -> Result<Vec<Tile>, SearchError> {
        if start.is_solved() {
            return Ok(Vec::new());
        }

        let retry = IdaStar::new(Budget::unlimited().with_time_ms(self.config.retry_time_limit_ms));
        let mut current = start.clone();
        let mut committed = Vec::new();
        let mut last: Option<Direction> = None;
        let mut attempts = 0;

        for attempt in 0..self.config.attempts {
            let best = self
                .rank_moves(&current, rng)
                .into_iter()
                .find(|candidate| last.map_or(true, |prev| candidate.direction != prev.opposite()));
            let Some(best) = best else {
                break;
            };

            tracing::debug!(
                attempt,
                tile = best.tile,
                direction = %best.direction,
                solved = best.solved,
                rollouts = self.config.rollouts,
                "monte-carlo committed move"
            );
            attempts += 1;
            committed.push(best.tile);
            last = Some(best.direction);
            current = best.board;

            match retry.solve(&current, heuristic) {
                Ok(rest) => {
                    committed.extend(rest);
                    return Ok(committed);
                }
                Err(err) => tracing::debug!(attempt, %err, "monte-carlo retry failed"),
            }
        }

        Err(SearchError::GaveUp {
            strategy: Self::NAME,
            attempts,
        })
    }
}

/// Whether a uniformly random walk of `depth` slides passes the goal.
fn random_walk_solves<R: Rng + ?Sized>(board: &Puzzle, depth: usize, rng: &mut R) -> bool {
    let mut walk = board.clone();
    for _ in 0..depth {
        if walk.is_solved() {
            return true;
        }
        if let Some(&dir) = walk.legal_directions().choose(rng) {
            walk.apply_move(dir);
        }
    }
    walk.is_solved()
}

impl Strategy for MonteCarloRetry {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn solve(&self, start: &Puzzle, heuristic: &dyn Heuristic) -> Result<Vec<Tile>, SearchError> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.solve_with_rng(start, heuristic, &mut rng)
    }
}
