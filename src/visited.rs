use ahash::AHashSet;

use crate::puzzle::Puzzle;

/// Set of boards already expanded by one search call.
#[derive(Debug, Default)]
pub struct CycleDetector {
    seen: AHashSet<Puzzle>,
}

impl CycleDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `state`, returning whether it had been recorded before.
    pub fn seen(&mut self, state: &Puzzle) -> bool {
        if self.seen.contains(state) {
            return true;
        }
        self.seen.insert(state.clone());
        false
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seen_once_then_always() {
        let mut detector = CycleDetector::new();
        let a = Puzzle::new(3);
        let b = a.slide_tile(8).unwrap();

        assert!(!detector.seen(&a));
        assert!(detector.seen(&a));
        assert!(detector.seen(&a.clone()));
        assert!(!detector.seen(&b));
        assert!(detector.seen(&b));
        assert_eq!(detector.len(), 2);
    }

    #[test]
    fn test_boards_of_different_size_are_distinct() {
        let mut detector = CycleDetector::new();
        assert!(detector.is_empty());
        assert!(!detector.seen(&Puzzle::new(3)));
        assert!(!detector.seen(&Puzzle::new(4)));
    }

    #[test]
    fn test_counts_distinct_boards_along_a_walk() {
        let mut detector = CycleDetector::new();
        let mut board = Puzzle::new(3);
        let mut distinct = Vec::new();
        // Shuttling one tile back and forth revisits the same two boards.
        for _ in 0..10 {
            if !detector.seen(&board) {
                distinct.push(board.clone());
            }
            board = board.slide_tile(8).unwrap();
        }
        assert_eq!(distinct.len(), 2);
        assert_eq!(detector.len(), 2);
        assert!(distinct.iter().all(|b| detector.seen(b)));
    }
}
