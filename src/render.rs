//! Colored terminal output for boards and solutions.

use std::io::{self, Write};

use crossterm::{
    queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
};

use crate::puzzle::{Puzzle, Tile, EMPTY};

/// Print `puzzle`, with tiles already in their goal cell in green and
/// `moved` in bold yellow.
pub fn render_board<W: Write>(out: &mut W, puzzle: &Puzzle, moved: Option<Tile>) -> io::Result<()> {
    for (idx, &tile) in puzzle.cells().iter().enumerate() {
        if tile == EMPTY {
            queue!(out, SetForegroundColor(Color::DarkGrey), Print("  _"))?;
        } else if Some(tile) == moved {
            queue!(
                out,
                SetAttribute(Attribute::Bold),
                SetForegroundColor(Color::Yellow),
                Print(format!("{:3}", tile)),
                SetAttribute(Attribute::Reset)
            )?;
        } else if Puzzle::goal_index(tile) == idx {
            queue!(out, SetForegroundColor(Color::Green), Print(format!("{:3}", tile)))?;
        } else {
            queue!(out, SetForegroundColor(Color::White), Print(format!("{:3}", tile)))?;
        }
        queue!(out, ResetColor)?;

        if (idx + 1) % puzzle.size() == 0 {
            queue!(out, Print("\n"))?;
        }
    }
    out.flush()
}

/// Share of tiles in their goal cell, as a whole percentage.
///
/// On 5x5 the twelve tiles that staged placement settles first weigh 70%
/// and the whole board the remaining 30%.
pub fn progress(puzzle: &Puzzle) -> u8 {
    let cells = puzzle.cells();
    let home = |count: usize| {
        cells[..count]
            .iter()
            .enumerate()
            .filter(|&(idx, &tile)| tile as usize == idx + 1)
            .count() as f64
    };
    let tiles = cells.len() - 1;
    let percent = if puzzle.size() == 5 {
        home(12) / 12.0 * 70.0 + home(tiles) / tiles as f64 * 30.0
    } else {
        home(tiles) / tiles as f64 * 100.0
    };
    percent.round() as u8
}

/// Print every board along `moves`, starting from `start`.
pub fn render_solution<W: Write>(out: &mut W, start: &Puzzle, moves: &[Tile]) -> io::Result<()> {
    let mut board = start.clone();
    for (step, &tile) in moves.iter().enumerate() {
        board = board
            .slide_tile(tile)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
        queue!(
            out,
            Print(format!(
                "{:>3}. slide {} ({}% solved)\n",
                step + 1,
                tile,
                progress(&board)
            ))
        )?;
        render_board(out, &board, Some(tile))?;
        queue!(out, Print("\n"))?;
    }
    out.flush()
}
