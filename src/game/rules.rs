//! Move generation. Everything here is a pure function of the board, the
//! side to move and the chain lock.

use tracing::instrument;

use super::board::Board;
use super::cell::Coord;
use super::moves::{MoveCandidate, MoveSet};
use super::player::Player;

/// The four diagonals as (dx, dy).
pub const DIRECTIONS: [(i32, i32); 4] = [(-1, -1), (1, -1), (-1, 1), (1, 1)];

/// What a piece can do along one diagonal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reach {
    Step(Coord),
    Jump { landing: Coord, captured: Coord },
}

/// Diagonals a piece at `from` may use. Men only go forward.
pub fn directions(board: &Board, from: Coord, player: Player) -> Vec<(i32, i32)> {
    let king = board.get(from).is_some_and(|c| c.is_king());
    DIRECTIONS
        .into_iter()
        .filter(|&(_, dy)| king || dy == player.forward())
        .collect()
}

/// Look one diagonal out from `from`. A step needs an open neighbour; a
/// jump needs an opposing neighbour with an open cell right behind it.
pub fn reach_toward(board: &Board, from: Coord, (dx, dy): (i32, i32), player: Player) -> Option<Reach> {
    let next = from.offset(dx, dy)?;
    let cell = board.get(next)?;
    if cell.is_disabled() {
        return None;
    }
    if cell.is_open() {
        return Some(Reach::Step(next));
    }
    if cell.owner() != Some(player.other()) {
        return None;
    }
    let landing = next.offset(dx, dy)?;
    board
        .get(landing)
        .filter(|c| c.is_open())
        .map(|_| Reach::Jump {
            landing,
            captured: next,
        })
}

/// Every move available to the piece on `from`, or nothing if it does not
/// belong to `player` or sits on a retired square.
pub fn piece_moves(board: &Board, from: Coord, player: Player, jumps_only: bool) -> Vec<MoveCandidate> {
    let Some(cell) = board.get(from) else {
        return Vec::new();
    };
    if cell.owner() != Some(player) || cell.is_disabled() {
        return Vec::new();
    }
    directions(board, from, player)
        .into_iter()
        .filter_map(|dir| reach_toward(board, from, dir, player))
        .filter_map(|reach| match reach {
            Reach::Step(_) if jumps_only => None,
            Reach::Step(dst) => Some(MoveCandidate::step(from, dst, player)),
            Reach::Jump { landing, captured } => {
                Some(MoveCandidate::jump(from, landing, captured, player))
            }
        })
        .collect()
}

/// The full legal-move set for `turn`.
///
/// With a `lock`, only capture continuations of that one piece count. With
/// `force_capture`, non-captures are dropped whenever a capture exists.
#[instrument(level = "trace", skip(board))]
pub fn legal_moves(board: &Board, turn: Player, lock: Option<Coord>, force_capture: bool) -> MoveSet {
    let mut moves: MoveSet = match lock {
        Some(from) => piece_moves(board, from, turn, true).into_iter().collect(),
        None => board
            .cells()
            .filter(|c| c.owner() == Some(turn))
            .flat_map(|c| piece_moves(board, c.coord(), turn, false))
            .collect(),
    };
    if force_capture && moves.has_capture() {
        moves.retain_captures();
    }
    moves
}

/// Whether moving `src` to `dst` would be a capture for `turn`.
pub fn is_capture(board: &Board, src: Coord, dst: Coord, turn: Player) -> bool {
    piece_moves(board, src, turn, true)
        .iter()
        .any(|m| m.dst == dst)
}

/// Whether the piece that just landed on `cell` has another jump.
/// Forced capture plays no part here.
#[instrument(level = "trace", skip(board))]
pub fn can_continue_jump(board: &Board, cell: Coord, turn: Player) -> bool {
    !piece_moves(board, cell, turn, true).is_empty()
}
