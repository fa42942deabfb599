/// Error types for grid access and level loading.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Misuse of the tile grid. Both variants indicate a caller bug.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("tile ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds { x: i32, y: i32, width: i32, height: i32 },

    #[error("{0:?} is not a tile symbol")]
    InvalidTile(char),
}

/// A level source could not be turned into a grid. Fatal to the run.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unable to open level {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("wrong number of characters in level: expected {expected}, found {found}")]
    WrongLength { expected: usize, found: usize },

    #[error("unknown symbol {symbol:?} at cell {index}")]
    UnknownSymbol { symbol: char, index: usize },

    #[error("level has no start marker")]
    MissingStart,

    #[error("second start marker at cell {index}")]
    DuplicateStart { index: usize },

    #[error("there is no level {number}")]
    NoSuchLevel { number: usize },
}
