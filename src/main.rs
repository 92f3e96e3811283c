use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use rand::{rngs::StdRng, SeedableRng};
use tracing_subscriber::EnvFilter;

use slider_solver::render::{progress, render_board, render_solution};
use slider_solver::{Outcome, Puzzle, Solver, SolverConfig, Tile, EMPTY};

/// slider: solve 3x3, 4x4 and 5x5 sliding-tile puzzles.
#[derive(Parser)]
#[command(name = "slider", version, about)]
struct Cli {
    /// Path to a solver config TOML file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Solve a given board.
    Solve {
        /// Board side length (3, 4 or 5).
        #[arg(long)]
        size: usize,
        /// Row-major cells separated by commas or spaces; `0` or `_` is empty.
        #[arg(long)]
        board: String,
    },
    /// Generate a random solvable board and solve it.
    Shuffle {
        /// Board side length (3, 4 or 5).
        #[arg(long, default_value_t = 3)]
        size: usize,
        /// Seed for the generator.
        #[arg(long)]
        seed: Option<u64>,
        /// Random-walk this many slides from the goal instead of drawing a
        /// uniform permutation.
        #[arg(long)]
        scramble: Option<usize>,
    },
}

fn parse_board(text: &str) -> anyhow::Result<Vec<Tile>> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|cell| !cell.is_empty())
        .map(|cell| match cell {
            "_" => Ok(EMPTY),
            other => other
                .parse::<Tile>()
                .with_context(|| format!("invalid cell {other:?}")),
        })
        .collect()
}

fn run(solver: &Solver, puzzle: &Puzzle) -> anyhow::Result<()> {
    let mut stdout = io::stdout();
    println!("Initial puzzle ({}% solved):", progress(puzzle));
    render_board(&mut stdout, puzzle, None)?;

    match solver.solve_puzzle(puzzle) {
        Outcome::Solved { moves, strategy } => {
            println!("\nSolved by {strategy} in {} moves: {moves:?}\n", moves.len());
            render_solution(&mut stdout, puzzle, &moves)?;
        }
        Outcome::NoSolution => println!("\nNo solution found"),
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => SolverConfig::load(path)?,
        None => SolverConfig::default(),
    };
    let solver = Solver::new(config);

    match cli.command {
        Command::Solve { size, board } => {
            let cells = parse_board(&board)?;
            let puzzle = Puzzle::from_cells(size, cells)?;
            run(&solver, &puzzle)
        }
        Command::Shuffle {
            size,
            seed,
            scramble,
        } => {
            if !slider_solver::SUPPORTED_SIZES.contains(&size) {
                bail!("unsupported puzzle size {size}");
            }
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let mut puzzle = Puzzle::new(size);
            match scramble {
                Some(steps) => puzzle.scramble(steps, &mut rng),
                None => puzzle.shuffle(&mut rng),
            }
            run(&solver, &puzzle)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_board() {
        assert_eq!(parse_board("2,_,3, 1 4 5,6,7,8").unwrap(), vec![2, 0, 3, 1, 4, 5, 6, 7, 8]);
        assert!(parse_board("1,x").is_err());
    }

    #[test]
    fn test_cli_parses_solve() {
        let cli = Cli::try_parse_from([
            "slider",
            "solve",
            "--size",
            "3",
            "--board",
            "1,2,3,4,5,6,7,0,8",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Solve { size: 3, .. }));
        assert!(cli.config.is_none());
    }
}
