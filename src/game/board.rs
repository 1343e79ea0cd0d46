use std::fmt;

use super::cell::{Cell, Coord};
use super::occupant::Occupant;
use super::player::Player;
use crate::error::ConstructionError;

/// Side length of a standard checkers board.
pub const STANDARD_SIZE: usize = 8;
/// Largest supported side length.
pub const MAX_SIZE: usize = 16;
/// Rows each side fills at the start of a game.
pub const HOME_ROWS: usize = 3;

/// Width x height grid of cells stored row-major. The slot index is the
/// identity of a cell; moves exchange contents between slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    move_count: usize,
}

impl Board {
    /// Create a grid of empty cells with no checkerboard pattern.
    pub fn new(width: usize, height: usize) -> Result<Self, ConstructionError> {
        if width == 0 || height == 0 || width > MAX_SIZE || height > MAX_SIZE {
            return Err(ConstructionError::InvalidDimensions { width, height });
        }
        let cells = (0..height)
            .flat_map(|y| (0..width).map(move |x| Cell::new(Coord::new(x, y), Occupant::Empty)))
            .collect();
        Ok(Board {
            width,
            height,
            cells,
            move_count: 0,
        })
    }

    /// Square checkerboard without pieces. Cells where `x + y` is odd are
    /// blocked.
    pub fn empty(size: usize) -> Result<Self, ConstructionError> {
        if size < 4 || size % 2 != 0 {
            return Err(ConstructionError::UnsupportedSize(size));
        }
        let mut board = Board::new(size, size)?;
        for cell in board.cells.iter_mut() {
            let c = cell.coord();
            if (c.x + c.y) % 2 != 0 {
                cell.set_occupant(Occupant::Blocked);
            }
        }
        Ok(board)
    }

    /// Opening position: player one on the top three rows, player two on
    /// the bottom three.
    pub fn standard(size: usize) -> Result<Self, ConstructionError> {
        if size < HOME_ROWS * 2 + 2 {
            return Err(ConstructionError::UnsupportedSize(size));
        }
        let mut board = Board::empty(size)?;
        for cell in board.cells.iter_mut() {
            if cell.is_blocked() {
                continue;
            }
            let y = cell.coord().y;
            if y < HOME_ROWS {
                cell.set_occupant(Occupant::PlayerOne);
            } else if y >= size - HOME_ROWS {
                cell.set_occupant(Occupant::PlayerTwo);
            }
        }
        Ok(board)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of accepted moves played on this board.
    pub fn move_count(&self) -> usize {
        self.move_count
    }

    pub(crate) fn record_move(&mut self) {
        self.move_count += 1;
    }

    pub fn contains(&self, coord: Coord) -> bool {
        coord.x < self.width && coord.y < self.height
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        self.contains(coord).then(|| coord.y * self.width + coord.x)
    }

    pub fn get(&self, coord: Coord) -> Option<&Cell> {
        self.index(coord).map(|i| &self.cells[i])
    }

    pub(crate) fn get_mut(&mut self, coord: Coord) -> Option<&mut Cell> {
        self.index(coord).map(move |i| &mut self.cells[i])
    }

    /// Occupant at `coord`; off-board reads as Blocked.
    pub fn occupant(&self, coord: Coord) -> Occupant {
        self.get(coord).map_or(Occupant::Blocked, Cell::occupant)
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub(crate) fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.cells.iter_mut()
    }

    /// Put a piece on an open playable square. Returns false if the square
    /// is off-board, blocked, disabled or taken.
    pub fn place(&mut self, coord: Coord, player: Player, king: bool) -> bool {
        match self.get_mut(coord) {
            Some(cell) if cell.is_open() => {
                cell.set_occupant(player.to_occupant());
                cell.set_king(king);
                true
            }
            _ => false,
        }
    }

    /// Exchange the contents of two slots. Returns false if either is
    /// off-board.
    pub fn swap(&mut self, a: Coord, b: Coord) -> bool {
        let (Some(i), Some(j)) = (self.index(a), self.index(b)) else {
            return false;
        };
        if i == j {
            return true;
        }
        let mut first = self.cells[i];
        let mut second = self.cells[j];
        first.swap_contents(&mut second);
        self.cells[i] = first;
        self.cells[j] = second;
        true
    }

    /// Remove whatever piece stands on `coord`, returning its owner.
    pub fn eliminate(&mut self, coord: Coord) -> Option<Player> {
        let cell = self.get_mut(coord)?;
        let owner = cell.owner()?;
        cell.set_occupant(Occupant::Empty);
        Some(owner)
    }

    pub fn count(&self, player: Player) -> usize {
        self.cells().filter(|c| c.owner() == Some(player)).count()
    }

    pub fn king_count(&self, player: Player) -> usize {
        self.cells()
            .filter(|c| c.owner() == Some(player) && c.is_king())
            .count()
    }

    /// Playable squares with nothing on them.
    pub fn empty_count(&self) -> usize {
        self.cells().filter(|c| c.is_open()).count()
    }

    /// Offset of the outermost ring that has not been retired. Equal to
    /// half the side length once everything is disabled.
    pub fn ring_offset(&self) -> usize {
        let side = self.width.min(self.height);
        (0..side)
            .find(|&i| {
                self.get(Coord::new(i, i))
                    .is_some_and(|cell| !cell.is_disabled())
            })
            .unwrap_or(side / 2)
    }

    /// Coordinates of every cell on the ring at `offset`, corners once.
    pub fn ring(&self, offset: usize) -> Vec<Coord> {
        if offset * 2 >= self.width || offset * 2 >= self.height {
            return Vec::new();
        }
        let (min_x, max_x) = (offset, self.width - 1 - offset);
        let (min_y, max_y) = (offset, self.height - 1 - offset);
        self.cells()
            .map(Cell::coord)
            .filter(|c| {
                (min_x..=max_x).contains(&c.x)
                    && (min_y..=max_y).contains(&c.y)
                    && (c.x == min_x || c.x == max_x || c.y == min_y || c.y == max_y)
            })
            .collect()
    }

    pub fn clear_decorations(&mut self) {
        for cell in self.cells_mut() {
            *cell.decorations_mut() = Default::default();
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard(STANDARD_SIZE).expect("standard size is supported")
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            for x in 0..self.width {
                let cell = &self.cells[y * self.width + x];
                let symbol = match (cell.occupant(), cell.is_king()) {
                    _ if cell.is_disabled() => 'x',
                    (Occupant::Empty, _) => '.',
                    (Occupant::Blocked, _) => '#',
                    (Occupant::PlayerOne, false) => 'o',
                    (Occupant::PlayerOne, true) => 'O',
                    (Occupant::PlayerTwo, false) => 'w',
                    (Occupant::PlayerTwo, true) => 'W',
                };
                if x > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{symbol}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
