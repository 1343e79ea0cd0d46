use std::fmt;

use super::occupant::Occupant;
use super::player::Player;

/// Grid coordinate, 0-indexed with the origin at the top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub x: usize,
    pub y: usize,
}

impl Coord {
    pub const fn new(x: usize, y: usize) -> Self {
        Coord { x, y }
    }

    /// Shift by a signed delta. `None` if either axis would go negative;
    /// the upper bound is the board's business.
    pub fn offset(self, dx: i32, dy: i32) -> Option<Coord> {
        let x = self.x.checked_add_signed(dx as isize)?;
        let y = self.y.checked_add_signed(dy as isize)?;
        Some(Coord { x, y })
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Presentation-only flags. Ignored by equality and by the rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Decorations {
    pub selected: bool,
    pub hover: bool,
    /// Piece has at least one legal move (move guides).
    pub movable: bool,
    /// Cell is a destination of the active piece (move guides).
    pub target: bool,
}

/// One grid slot. The coordinate is fixed for the lifetime of the board;
/// only the contents move.
#[derive(Debug, Clone, Copy)]
pub struct Cell {
    coord: Coord,
    occupant: Occupant,
    king: bool,
    disabled: bool,
    decor: Decorations,
}

impl Cell {
    pub fn new(coord: Coord, occupant: Occupant) -> Self {
        Cell {
            coord,
            occupant,
            king: false,
            disabled: false,
            decor: Decorations::default(),
        }
    }

    pub fn coord(&self) -> Coord {
        self.coord
    }

    pub fn occupant(&self) -> Occupant {
        self.occupant
    }

    pub fn owner(&self) -> Option<Player> {
        self.occupant.player()
    }

    pub fn is_king(&self) -> bool {
        self.king
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn is_blocked(&self) -> bool {
        self.occupant == Occupant::Blocked
    }

    /// Empty, not blocked and not retired: somewhere a piece may land.
    pub fn is_open(&self) -> bool {
        self.occupant.is_empty() && !self.disabled
    }

    pub fn decorations(&self) -> &Decorations {
        &self.decor
    }

    pub fn decorations_mut(&mut self) -> &mut Decorations {
        &mut self.decor
    }

    /// Anything that is not a piece cannot be a king.
    pub fn set_occupant(&mut self, occupant: Occupant) {
        self.occupant = occupant;
        if !occupant.is_piece() {
            self.king = false;
            self.decor.selected = false;
            self.decor.movable = false;
        }
    }

    /// Returns whether the flag was applied; only pieces can be crowned.
    pub fn set_king(&mut self, king: bool) -> bool {
        if king && !self.occupant.is_piece() {
            return false;
        }
        self.king = king;
        true
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// Exchange game contents with `other`, leaving both coordinates and
    /// decorations in their slots.
    pub(crate) fn swap_contents(&mut self, other: &mut Cell) {
        std::mem::swap(&mut self.occupant, &mut other.occupant);
        std::mem::swap(&mut self.king, &mut other.king);
        std::mem::swap(&mut self.disabled, &mut other.disabled);
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.coord == other.coord
            && self.occupant == other.occupant
            && self.king == other.king
            && self.disabled == other.disabled
    }
}

impl Eq for Cell {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_rejects_negative() {
        let c = Coord::new(0, 3);
        assert_eq!(c.offset(-1, 1), None);
        assert_eq!(c.offset(1, -1), Some(Coord::new(1, 2)));
    }

    #[test]
    fn test_clearing_occupant_clears_king() {
        let mut cell = Cell::new(Coord::new(1, 1), Occupant::PlayerOne);
        assert!(cell.set_king(true));
        cell.set_occupant(Occupant::Empty);
        assert!(!cell.is_king());
        assert!(!cell.set_king(true));
        assert!(!cell.is_king());
    }

    #[test]
    fn test_blocked_cannot_be_king() {
        let mut cell = Cell::new(Coord::new(0, 1), Occupant::Blocked);
        assert!(!cell.set_king(true));
        assert!(!cell.is_open());
    }

    #[test]
    fn test_decorations_ignored_by_equality() {
        let a = Cell::new(Coord::new(2, 2), Occupant::PlayerTwo);
        let mut b = a;
        b.decorations_mut().selected = true;
        b.decorations_mut().target = true;
        assert_eq!(a, b);
    }

    #[test]
    fn test_swap_keeps_coordinates() {
        let mut a = Cell::new(Coord::new(0, 0), Occupant::PlayerOne);
        a.set_king(true);
        let mut b = Cell::new(Coord::new(1, 1), Occupant::Empty);
        a.swap_contents(&mut b);
        assert_eq!(a.coord(), Coord::new(0, 0));
        assert_eq!(b.coord(), Coord::new(1, 1));
        assert_eq!(a.occupant(), Occupant::Empty);
        assert!(!a.is_king());
        assert_eq!(b.occupant(), Occupant::PlayerOne);
        assert!(b.is_king());
    }
}
