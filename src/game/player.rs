use super::occupant::Occupant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Player {
    One,
    Two,
}

impl Player {
    /// Get the other player
    pub fn other(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Convert player to occupant type
    pub fn to_occupant(self) -> Occupant {
        match self {
            Player::One => Occupant::PlayerOne,
            Player::Two => Occupant::PlayerTwo,
        }
    }

    /// Row delta of a non-king step. Player one starts at the top and
    /// moves toward increasing y.
    pub fn forward(self) -> i32 {
        match self {
            Player::One => 1,
            Player::Two => -1,
        }
    }

    /// Get player name for display
    pub fn name(self) -> &'static str {
        match self {
            Player::One => "Player One",
            Player::Two => "Player Two",
        }
    }
}
