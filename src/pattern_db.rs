//! Exact-distance tables for sub-puzzles, built once by breadth-first
//! search outward from the goal.

use std::collections::hash_map::Entry;
use std::collections::VecDeque;
use std::time::Instant;

use ahash::AHashMap;

use crate::error::PuzzleError;
use crate::puzzle::{Puzzle, Tile, EMPTY};

/// Stand-in for every tile outside the tracked subset.
pub(crate) const UNTRACKED: Tile = Tile::MAX;

/// Bits used per packed cell index (enough for a 5x5 board).
const POSITION_BITS: u32 = 5;

/// Immutable map from the positions of a tracked tile subset (plus the
/// empty cell) to the exact number of moves needed to solve that subset.
///
/// Every move in the sub-puzzle costs one, so the stored distance never
/// exceeds the full board's distance.
#[derive(Debug, Clone)]
pub struct PatternDatabase {
    size: usize,
    tracked: Vec<Tile>,
    slots: Vec<Option<usize>>,
    table: AHashMap<u64, u8>,
}

impl PatternDatabase {
    /// The database used by default for `size`, if one is supported.
    ///
    /// Only 3x3 is supported; it tracks tiles 1..8 and so covers every
    /// reachable board exactly.
    pub fn for_size(size: usize) -> Option<Self> {
        match size {
            3 => Self::build(3, &[1, 2, 3, 4, 5, 6, 7, 8]).ok(),
            _ => None,
        }
    }

    /// Explore every configuration of `tracked` reachable from the goal.
    ///
    /// Fails if a tracked tile is [`EMPTY`], repeated or absent from a
    /// `size`x`size` board, or if the pattern is too wide for a packed key.
    pub fn build(size: usize, tracked: &[Tile]) -> Result<Self, PuzzleError> {
        let started = Instant::now();
        if size < 2 {
            return Err(PuzzleError::UnsupportedSize(size));
        }
        let area = size * size;
        if (tracked.len() + 1) as u32 * POSITION_BITS > u64::BITS || area > 1 << POSITION_BITS {
            return Err(PuzzleError::PatternTooLarge {
                tracked: tracked.len(),
                size,
            });
        }

        let mut slots = vec![None; area];
        for (slot, &tile) in tracked.iter().enumerate() {
            match slots.get_mut(tile as usize) {
                Some(_) if tile == EMPTY => return Err(PuzzleError::PatternTile { tile, size }),
                Some(Some(_)) => return Err(PuzzleError::DuplicateTile(tile)),
                Some(entry) => *entry = Some(slot),
                None => return Err(PuzzleError::PatternTile { tile, size }),
            }
        }

        let mut db = Self {
            size,
            tracked: tracked.to_vec(),
            slots,
            table: AHashMap::new(),
        };

        let goal: Vec<Tile> = Puzzle::new(size)
            .cells()
            .iter()
            .map(|&tile| db.abstract_tile(tile))
            .collect();
        let goal = Puzzle::from_cells_unchecked(size, goal);

        db.table.insert(db.key(goal.cells()), 0);
        let mut queue = VecDeque::from([(goal, 0u8)]);
        while let Some((state, depth)) = queue.pop_front() {
            for (_, _, next) in state.successors() {
                let key = db.key(next.cells());
                if let Entry::Vacant(slot) = db.table.entry(key) {
                    slot.insert(depth.saturating_add(1));
                    queue.push_back((next, depth.saturating_add(1)));
                }
            }
        }

        tracing::info!(
            size,
            tracked = db.tracked.len(),
            entries = db.table.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "pattern database built"
        );
        Ok(db)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn tracked(&self) -> &[Tile] {
        &self.tracked
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Exact distance of `puzzle`'s projection onto the tracked subset, or
    /// `None` if the board has another size or the projection was never
    /// reached from the goal.
    pub fn distance(&self, puzzle: &Puzzle) -> Option<usize> {
        if puzzle.size() != self.size {
            return None;
        }
        self.table
            .get(&self.key(puzzle.cells()))
            .map(|&depth| depth as usize)
    }

    fn abstract_tile(&self, tile: Tile) -> Tile {
        if tile == EMPTY || self.slot_of(tile).is_some() {
            tile
        } else {
            UNTRACKED
        }
    }

    fn slot_of(&self, tile: Tile) -> Option<usize> {
        self.slots.get(tile as usize).copied().flatten()
    }

    /// Pack the cell index of each tracked tile, then of the empty cell.
    fn key(&self, cells: &[Tile]) -> u64 {
        let mut positions = vec![0u64; self.tracked.len() + 1];
        for (idx, &tile) in cells.iter().enumerate() {
            if tile == EMPTY {
                positions[self.tracked.len()] = idx as u64;
            } else if let Some(slot) = self.slot_of(tile) {
                positions[slot] = idx as u64;
            }
        }
        positions
            .into_iter()
            .fold(0, |key, pos| (key << POSITION_BITS) | pos)
    }
}
