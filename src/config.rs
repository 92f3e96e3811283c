//! Solver configuration, loadable from TOML.

use std::path::Path;
use std::time::Duration;

use crate::error::PuzzleError;

/// Resource caps for one strategy. Unset fields fall back to the built-in
/// chain defaults for the board size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct Budget {
    pub time_limit_ms: Option<u64>,
    pub max_nodes: Option<u64>,
    pub max_depth: Option<usize>,
}

impl Budget {
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn with_time_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    pub fn with_max_nodes(mut self, nodes: u64) -> Self {
        self.max_nodes = Some(nodes);
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_ms.map(Duration::from_millis)
    }

    /// Field-wise `self` if set, else `fallback`.
    pub fn or(self, fallback: Budget) -> Budget {
        Budget {
            time_limit_ms: self.time_limit_ms.or(fallback.time_limit_ms),
            max_nodes: self.max_nodes.or(fallback.max_nodes),
            max_depth: self.max_depth.or(fallback.max_depth),
        }
    }
}

/// Budgets for each entry of a size's strategy chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct ChainBudgets {
    pub ida_star: Budget,
    pub astar: Budget,
    pub bfs: Budget,
    /// Exhaustive graph search; only `time_limit_ms` applies.
    pub graph: Budget,
}

impl ChainBudgets {
    fn or(self, fallback: ChainBudgets) -> ChainBudgets {
        ChainBudgets {
            ida_star: self.ida_star.or(fallback.ida_star),
            astar: self.astar.or(fallback.astar),
            bfs: self.bfs.or(fallback.bfs),
            graph: self.graph.or(fallback.graph),
        }
    }

    /// Built-in escalation budgets for `size`.
    pub fn defaults_for(size: usize) -> Self {
        let (ida_ms, bfs_depth, bfs_nodes) = match size {
            3 => (20_000, 50, 1_000_000),
            4 => (20_000, 40, 300_000),
            _ => (30_000, 35, 200_000),
        };
        ChainBudgets {
            ida_star: Budget::unlimited().with_time_ms(ida_ms),
            astar: Budget::unlimited()
                .with_time_ms(DEFAULT_FALLBACK_MS)
                .with_max_nodes(DEFAULT_ASTAR_NODES),
            bfs: Budget::unlimited()
                .with_max_depth(bfs_depth)
                .with_max_nodes(bfs_nodes),
            graph: Budget::unlimited().with_time_ms(DEFAULT_FALLBACK_MS),
        }
    }

    fn all(&self) -> [(&'static str, &Budget); 4] {
        [
            ("ida_star", &self.ida_star),
            ("astar", &self.astar),
            ("bfs", &self.bfs),
            ("graph", &self.graph),
        ]
    }
}

const DEFAULT_FALLBACK_MS: u64 = 30_000;
const DEFAULT_ASTAR_NODES: u64 = 2_000_000;

/// Monte-Carlo move-ordering retry, the last entry of the 5x5 chain.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct MonteCarloConfig {
    /// Outer attempts, each committing one move.
    #[serde(default = "default_attempts")]
    pub attempts: usize,

    /// Random walks per candidate move.
    #[serde(default = "default_rollouts")]
    pub rollouts: usize,

    /// Slides per random walk.
    #[serde(default = "default_walk_depth")]
    pub walk_depth: usize,

    /// IDA* budget after each committed move.
    #[serde(default = "default_retry_time_limit_ms")]
    pub retry_time_limit_ms: u64,

    /// Seed for the walks; entropy when unset.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_attempts() -> usize {
    3
}
fn default_rollouts() -> usize {
    50
}
fn default_walk_depth() -> usize {
    10
}
fn default_retry_time_limit_ms() -> u64 {
    10_000
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            rollouts: default_rollouts(),
            walk_depth: default_walk_depth(),
            retry_time_limit_ms: default_retry_time_limit_ms(),
            seed: None,
        }
    }
}

/// Staged tile placement for 4x4 and 5x5 boards. Off unless `enabled`.
///
/// The budgets are overrides merged over the built-in plan for the size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct StagedConfig {
    /// Run staged placement right after IDA* in the 4x4 and 5x5 chains.
    pub enabled: bool,
    /// IDA* budget of every placement stage.
    pub place: Budget,
    /// Breadth-first placement tried when a stage's IDA* fails.
    pub fallback: Budget,
    /// IDA* that solves what is left once every stage is placed.
    pub finish: Budget,
}

/// Top-level solver configuration.
///
/// The per-size tables only hold overrides; see [`SolverConfig::budgets`].
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub size3: ChainBudgets,
    pub size4: ChainBudgets,
    pub size5: ChainBudgets,
    pub monte_carlo: MonteCarloConfig,
    pub staged: StagedConfig,
    /// Answer wrong-parity boards with no solution before searching.
    pub reject_unsolvable: bool,
}

impl SolverConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, PuzzleError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, PuzzleError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| PuzzleError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Effective budgets for `size`: overrides layered on the defaults.
    pub fn budgets(&self, size: usize) -> ChainBudgets {
        let overrides = match size {
            3 => self.size3,
            4 => self.size4,
            _ => self.size5,
        };
        overrides.or(ChainBudgets::defaults_for(size))
    }

    /// Log a warning for budgets that make a strategy give up immediately.
    pub fn validate(&self) {
        for size in 3..=5 {
            for (strategy, budget) in self.budgets(size).all() {
                if budget.time_limit_ms == Some(0) || budget.max_nodes == Some(0) {
                    tracing::warn!(
                        size,
                        strategy,
                        ?budget,
                        "budget allows no search; strategy will always fail"
                    );
                }
            }
        }
        if self.staged.enabled && self.staged.finish.max_nodes == Some(0) {
            tracing::warn!("staged.finish allows no search; staged placement will always fail");
        }
        if self.monte_carlo.attempts == 0 {
            tracing::warn!("monte_carlo.attempts = 0; retry is disabled");
        }
    }
}
