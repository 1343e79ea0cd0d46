use super::player::Player;
use super::session::GameSession;

/// Callbacks fired synchronously, in registration order, from inside the
/// call that changed the session.
pub trait SessionObserver {
    /// After every accepted move (chain steps included) and every undo.
    fn on_board_changed(&mut self, _session: &GameSession) {}

    /// Once per session, when the game first ends.
    fn on_game_over(&mut self, _session: &GameSession, _winner: Player) {}
}
