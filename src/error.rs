//! Error types for loading levels and configuration.
//!
//! The simulation itself never fails: out-of-range access and vacant
//! moves are absorbed as no-ops. Only the edges that read text do.

use std::path::PathBuf;

use thiserror::Error;

/// A level layout that cannot be turned into a world.
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("level has no rows")]
    Empty,

    #[error("row {row} is {found} tiles wide, expected {expected}")]
    Ragged { row: usize, expected: usize, found: usize },

    #[error("unknown tile {glyph:?} at ({x}, {y})")]
    UnknownGlyph { glyph: char, x: usize, y: usize },

    #[error("level has no player start")]
    MissingPlayer,

    #[error("level has {0} player starts, expected exactly one")]
    MultiplePlayers(usize),

    #[error("border cell ({x}, {y}) is not a wall")]
    OpenBorder { x: usize, y: usize },

    #[error("bad metadata line {line:?}")]
    BadMetadata { line: String },

    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A `config.toml` that could not be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{key} must be {expected}")]
    Invalid { key: &'static str, expected: &'static str },
}
