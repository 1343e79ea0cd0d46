use std::path::PathBuf;

use crate::game::Coord;

/// Errors raised while building a board or session. Nothing exists yet
/// when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConstructionError {
    #[error("invalid board dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("unsupported board size {0} (must be even and leave room for both sides)")]
    UnsupportedSize(usize),

    #[error("the forced-capture variant requires force_capture to be enabled")]
    ContradictoryCapture,
}

/// Reasons a move is refused. The session is left untouched either way.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("game is over")]
    GameOver,

    #[error("illegal move {src} -> {dst}")]
    Illegal { src: Coord, dst: Coord },
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),

    #[error("invalid game settings: {0}")]
    Construction(#[from] ConstructionError),
}
