use super::player::Player;

/// What sits on a grid slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Occupant {
    #[default]
    Empty,
    PlayerOne,
    PlayerTwo,
    /// Unplayable square. Never holds a piece.
    Blocked,
}

impl Occupant {
    /// The player owning this occupant, if it is a piece.
    pub fn player(self) -> Option<Player> {
        match self {
            Occupant::PlayerOne => Some(Player::One),
            Occupant::PlayerTwo => Some(Player::Two),
            Occupant::Empty | Occupant::Blocked => None,
        }
    }

    pub fn is_piece(self) -> bool {
        self.player().is_some()
    }

    pub fn is_empty(self) -> bool {
        self == Occupant::Empty
    }

    /// Empty or Blocked: nothing a ring shrink has to wait for.
    pub fn is_vacant(self) -> bool {
        !self.is_piece()
    }
}

impl From<Player> for Occupant {
    fn from(player: Player) -> Self {
        player.to_occupant()
    }
}
