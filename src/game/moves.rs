use std::collections::BTreeSet;
use std::fmt;

use super::cell::Coord;
use super::player::Player;

/// One legal transition, recomputed whenever the position changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MoveCandidate {
    pub src: Coord,
    pub dst: Coord,
    pub captured: Option<Coord>,
    pub player: Player,
}

impl MoveCandidate {
    pub fn step(src: Coord, dst: Coord, player: Player) -> Self {
        MoveCandidate {
            src,
            dst,
            captured: None,
            player,
        }
    }

    pub fn jump(src: Coord, dst: Coord, captured: Coord, player: Player) -> Self {
        MoveCandidate {
            src,
            dst,
            captured: Some(captured),
            player,
        }
    }

    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }
}

impl fmt::Display for MoveCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.src, self.dst)?;
        if let Some(captured) = self.captured {
            write!(f, " x {captured}")?;
        }
        Ok(())
    }
}

/// The legal-move set for one position. Consumed by membership, but kept
/// ordered so repeated queries iterate identically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveSet {
    moves: BTreeSet<MoveCandidate>,
}

impl MoveSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, candidate: MoveCandidate) -> bool {
        self.moves.insert(candidate)
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MoveCandidate> {
        self.moves.iter()
    }

    pub fn contains(&self, candidate: &MoveCandidate) -> bool {
        self.moves.contains(candidate)
    }

    /// The candidate moving `src` to `dst`, if legal.
    pub fn find(&self, src: Coord, dst: Coord) -> Option<&MoveCandidate> {
        self.moves.iter().find(|m| m.src == src && m.dst == dst)
    }

    pub fn has_capture(&self) -> bool {
        self.moves.iter().any(MoveCandidate::is_capture)
    }

    /// Drop every non-capturing candidate.
    pub fn retain_captures(&mut self) {
        self.moves.retain(MoveCandidate::is_capture);
    }

    /// Distinct cells that have at least one legal move.
    pub fn sources(&self) -> BTreeSet<Coord> {
        self.moves.iter().map(|m| m.src).collect()
    }

    /// Candidates starting from `src`.
    pub fn from_cell(&self, src: Coord) -> impl Iterator<Item = &MoveCandidate> {
        self.moves.iter().filter(move |m| m.src == src)
    }
}

impl FromIterator<MoveCandidate> for MoveSet {
    fn from_iter<I: IntoIterator<Item = MoveCandidate>>(iter: I) -> Self {
        MoveSet {
            moves: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a MoveSet {
    type Item = &'a MoveCandidate;
    type IntoIter = std::collections::btree_set::Iter<'a, MoveCandidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.iter()
    }
}
