use rand::{seq::SliceRandom, Rng};
use std::fmt;

use crate::error::PuzzleError;

/// A tile identifier in `1..size²`, or [`EMPTY`].
pub type Tile = u8;

/// Marker for the empty cell.
pub const EMPTY: Tile = 0;

/// Largest board whose tile identifiers still fit in a [`Tile`].
const MAX_SIZE: usize = 15;

/// Direction a tile slides into the empty cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Left,
    Down,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Offset (row, col) the empty cell travels when a tile slides this way.
    pub fn as_offset(&self) -> (isize, isize) {
        match self {
            Direction::Up => (1, 0),
            Direction::Left => (0, 1),
            Direction::Down => (-1, 0),
            Direction::Right => (0, -1),
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            Direction::Up => "Up",
            Direction::Left => "Left",
            Direction::Down => "Down",
            Direction::Right => "Right",
        };
        write!(f, "{}", s)
    }
}

/// A sliding-tile board stored as a flattened, row-major permutation.
///
/// Search code treats a `Puzzle` as an immutable value: every transition
/// ([`Puzzle::try_move`], [`Puzzle::slide_tile`]) yields a new board.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Puzzle {
    size: usize,
    cells: Vec<Tile>,
    empty: usize,
}

impl Puzzle {
    /// The solved `size`×`size` board: ascending tiles, empty cell last.
    pub fn new(size: usize) -> Self {
        let area = size * size;
        let cells = (1..area)
            .map(|value| value as Tile)
            .chain(std::iter::once(EMPTY))
            .collect();

        Self {
            size,
            cells,
            empty: area - 1,
        }
    }

    /// Build a board from row-major cells, checking it is a permutation of
    /// `0..size²` with exactly one [`EMPTY`].
    pub fn from_cells(size: usize, cells: Vec<Tile>) -> Result<Self, PuzzleError> {
        if !(2..=MAX_SIZE).contains(&size) {
            return Err(PuzzleError::UnsupportedSize(size));
        }
        let area = size * size;
        if cells.len() != area {
            return Err(PuzzleError::CellCount {
                expected: area,
                actual: cells.len(),
            });
        }

        let mut present = vec![false; area];
        for &tile in &cells {
            if tile == EMPTY {
                continue;
            }
            if tile as usize >= area {
                return Err(PuzzleError::TileOutOfRange { tile, size });
            }
            if present[tile as usize] {
                return Err(PuzzleError::DuplicateTile(tile));
            }
            present[tile as usize] = true;
        }

        let empties = cells.iter().filter(|&&tile| tile == EMPTY).count();
        if empties != 1 {
            return Err(PuzzleError::EmptyCount(empties));
        }

        Ok(Self::from_cells_unchecked(size, cells))
    }

    /// Build a board without validating it. Behavior of every other method
    /// is unspecified if `cells` is not a well-formed board.
    pub fn from_cells_unchecked(size: usize, cells: Vec<Tile>) -> Self {
        let empty = cells.iter().position(|&tile| tile == EMPTY).unwrap_or(0);
        Self { size, cells, empty }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn cells(&self) -> &[Tile] {
        &self.cells
    }

    pub fn empty_index(&self) -> usize {
        self.empty
    }

    /// Index a tile occupies on the solved board.
    pub fn goal_index(tile: Tile) -> usize {
        tile as usize - 1
    }

    /// Slide the tile lying in `movement`'s direction into the empty cell.
    /// Returns `false` (leaving the board untouched) if no such tile exists.
    pub(crate) fn apply_move(&mut self, movement: Direction) -> bool {
        match self.target_of(movement) {
            Some(target) => {
                self.cells.swap(self.empty, target);
                self.empty = target;
                true
            }
            None => false,
        }
    }

    /// Cell whose tile would slide into the empty cell for `movement`.
    fn target_of(&self, movement: Direction) -> Option<usize> {
        let (dr, dc) = movement.as_offset();
        let new_r = (self.empty / self.size) as isize + dr;
        let new_c = (self.empty % self.size) as isize + dc;

        if new_r >= 0 && new_r < self.size as isize && new_c >= 0 && new_c < self.size as isize {
            Some(new_r as usize * self.size + new_c as usize)
        } else {
            None
        }
    }

    pub fn try_move(&self, dir: Direction) -> Option<Self> {
        let mut next = self.clone();
        if next.apply_move(dir) {
            Some(next)
        } else {
            None
        }
    }

    /// Every legal transition from this board, as the direction taken, the
    /// tile that moved and the resulting board.
    pub fn successors(&self) -> impl Iterator<Item = (Direction, Tile, Puzzle)> + '_ {
        Direction::ALL.into_iter().filter_map(move |dir| {
            self.try_move(dir).map(|next| {
                let tile = next.cells[self.empty];
                (dir, tile, next)
            })
        })
    }

    /// Directions that have a tile to slide from the current position.
    pub fn legal_directions(&self) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|&dir| self.target_of(dir).is_some())
            .collect()
    }

    /// Slide `tile` into the empty cell, failing if it is not orthogonally
    /// adjacent to it.
    pub fn slide_tile(&self, tile: Tile) -> Result<Self, PuzzleError> {
        Direction::ALL
            .into_iter()
            .find(|&dir| {
                self.target_of(dir)
                    .is_some_and(|target| tile != EMPTY && self.cells[target] == tile)
            })
            .and_then(|dir| self.try_move(dir))
            .ok_or(PuzzleError::IllegalMove { tile })
    }

    /// Replay a move sequence, one tile at a time.
    pub fn apply_moves(&self, moves: &[Tile]) -> Result<Self, PuzzleError> {
        moves
            .iter()
            .try_fold(self.clone(), |board, &tile| board.slide_tile(tile))
    }

    pub fn is_solved(&self) -> bool {
        let last = self.cells.len() - 1;
        self.cells[last] == EMPTY
            && self.cells[..last]
                .iter()
                .enumerate()
                .all(|(idx, &tile)| tile as usize == idx + 1)
    }

    /// Whether the goal is reachable, by inversion and blank-row parity.
    pub fn is_solvable(&self) -> bool {
        Self::parity_solvable(&self.cells, self.size, self.empty / self.size)
    }

    fn parity_solvable(flattened: &[Tile], size: usize, empty_row: usize) -> bool {
        let inversions = Self::count_inversions(flattened);

        if size % 2 == 1 {
            inversions % 2 == 0
        } else {
            (inversions + empty_row) % 2 == 1
        }
    }

    fn count_inversions(flattened: &[Tile]) -> usize {
        flattened
            .iter()
            .enumerate()
            .filter(|&(_, &val)| val != EMPTY)
            .map(|(i, &val)| {
                flattened[i + 1..]
                    .iter()
                    .filter(|&&next| next != EMPTY && next < val)
                    .count()
            })
            .sum()
    }

    /// Replace the board with a uniformly random solvable permutation.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        loop {
            self.cells.shuffle(rng);
            self.empty = self
                .cells
                .iter()
                .position(|&tile| tile == EMPTY)
                .unwrap_or(0);

            if self.is_solvable() {
                break;
            }
        }
    }

    /// Random walk of `steps` slides that never immediately undoes itself.
    pub fn scramble<R: Rng + ?Sized>(&mut self, steps: usize, rng: &mut R) {
        let mut last: Option<Direction> = None;
        for _ in 0..steps {
            let options: Vec<Direction> = self
                .legal_directions()
                .into_iter()
                .filter(|dir| last.map_or(true, |prev| *dir != prev.opposite()))
                .collect();
            if let Some(&dir) = options.choose(rng) {
                self.apply_move(dir);
                last = Some(dir);
            }
        }
    }
}

impl fmt::Display for Puzzle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.size) {
            for &val in row {
                if val == EMPTY {
                    write!(f, " _ ")?;
                } else {
                    write!(f, "{:2} ", val)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
