//! The eight rotations and reflections of a square board.

use crate::puzzle::{Puzzle, Tile};

/// An element of the board's dihedral symmetry group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symmetry {
    /// Quarter turns clockwise, 0..4.
    pub quarter_turns: u8,
    /// Mirror left-right before rotating.
    pub reflect: bool,
}

impl Symmetry {
    pub const ALL: [Symmetry; 8] = [
        Symmetry { quarter_turns: 0, reflect: false },
        Symmetry { quarter_turns: 0, reflect: true },
        Symmetry { quarter_turns: 1, reflect: false },
        Symmetry { quarter_turns: 1, reflect: true },
        Symmetry { quarter_turns: 2, reflect: false },
        Symmetry { quarter_turns: 2, reflect: true },
        Symmetry { quarter_turns: 3, reflect: false },
        Symmetry { quarter_turns: 3, reflect: true },
    ];

    /// Source cell for destination `(row, col)` on a `size`-wide grid.
    fn source(&self, size: usize, row: usize, col: usize) -> (usize, usize) {
        let last = size - 1;
        // Undo the rotation first, then the reflection.
        let (mut r, mut c) = (row, col);
        for _ in 0..self.quarter_turns % 4 {
            (r, c) = (last - c, r);
        }
        if self.reflect {
            c = last - c;
        }
        (r, c)
    }

    /// Apply to a flattened `size`×`size` grid.
    pub fn apply(&self, size: usize, cells: &[Tile]) -> Vec<Tile> {
        (0..size * size)
            .map(|idx| {
                let (r, c) = self.source(size, idx / size, idx % size);
                cells[r * size + c]
            })
            .collect()
    }
}

/// All eight symmetric variants of a board's flattened cells.
pub fn variants(puzzle: &Puzzle) -> Vec<Vec<Tile>> {
    Symmetry::ALL
        .iter()
        .map(|sym| sym.apply(puzzle.size(), puzzle.cells()))
        .collect()
}

/// Lexicographically smallest flattened variant, so symmetric boards share
/// one representative.
pub fn canonical(puzzle: &Puzzle) -> Vec<Tile> {
    canonical_cells(puzzle.size(), puzzle.cells())
}

fn canonical_cells(size: usize, cells: &[Tile]) -> Vec<Tile> {
    Symmetry::ALL
        .iter()
        .map(|sym| sym.apply(size, cells))
        .min()
        .unwrap_or_else(|| cells.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashSet;

    #[test]
    fn test_rotation_and_reflection() {
        let cells: Vec<Tile> = (0..9).collect();
        let quarter = Symmetry { quarter_turns: 1, reflect: false };
        assert_eq!(quarter.apply(3, &cells), vec![6, 3, 0, 7, 4, 1, 8, 5, 2]);
        let mirror = Symmetry { quarter_turns: 0, reflect: true };
        assert_eq!(mirror.apply(3, &cells), vec![2, 1, 0, 5, 4, 3, 8, 7, 6]);
    }

    #[test]
    fn test_eight_distinct_variants() {
        let cells: Vec<Tile> = (0..16).collect();
        let puzzle = Puzzle::from_cells_unchecked(4, cells);
        let distinct: HashSet<Vec<Tile>> = variants(&puzzle).into_iter().collect();
        assert_eq!(distinct.len(), 8);
    }

    #[test]
    fn test_canonical_invariant_under_every_symmetry() {
        let mut rng = StdRng::seed_from_u64(11);
        for size in 3..=5 {
            let mut puzzle = Puzzle::new(size);
            puzzle.shuffle(&mut rng);
            let expected = canonical(&puzzle);

            for variant in variants(&puzzle) {
                let image = Puzzle::from_cells_unchecked(size, variant);
                assert_eq!(canonical(&image), expected);
            }
        }
    }

    #[test]
    fn test_canonical_idempotent() {
        let puzzle = Puzzle::from_cells(3, vec![2, 0, 3, 1, 4, 5, 6, 7, 8]).unwrap();
        let once = canonical(&puzzle);
        let twice = canonical(&Puzzle::from_cells_unchecked(3, once.clone()));
        assert_eq!(once, twice);
        // Corners only map to corners; the smallest corner tile leads.
        assert_eq!(once[0], 2);
    }
}
