//! Core checkers logic: board and cell model, move generation, and the
//! session state machine with snapshot-based undo.

mod board;
mod cell;
mod moves;
mod observer;
mod occupant;
mod player;
pub mod rules;
mod session;
mod settings;

pub use board::{Board, HOME_ROWS, MAX_SIZE, STANDARD_SIZE};
pub use cell::{Cell, Coord, Decorations};
pub use moves::{MoveCandidate, MoveSet};
pub use observer::SessionObserver;
pub use occupant::Occupant;
pub use player::Player;
pub use session::{
    GameSession, GameState, MoveOutcome, Phase, PieceCounts, SelectOutcome, MIN_PLAYABLE_SIDE,
};
pub use settings::{Settings, Variant};
