use std::path::PathBuf;

use crate::puzzle::Tile;

/// Errors raised for malformed boards, illegal moves and bad configuration.
#[derive(Debug, thiserror::Error)]
pub enum PuzzleError {
    #[error("unsupported puzzle size {0}")]
    UnsupportedSize(usize),
    #[error("board has {actual} cells, expected {expected}")]
    CellCount { expected: usize, actual: usize },
    #[error("tile {tile} is out of range for a {size}x{size} board")]
    TileOutOfRange { tile: Tile, size: usize },
    #[error("tile {0} appears more than once")]
    DuplicateTile(Tile),
    #[error("board must contain exactly one empty cell, found {0}")]
    EmptyCount(usize),
    #[error("tile {tile} is not adjacent to the empty cell")]
    IllegalMove { tile: Tile },
    #[error("tile {tile} cannot be tracked by a pattern on a {size}x{size} board")]
    PatternTile { tile: Tile, size: usize },
    #[error("pattern of {tracked} tiles on a {size}x{size} board does not fit a packed key")]
    PatternTooLarge { tracked: usize, size: usize },
    #[error("failed to read config {}: {source}", path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}
