use std::fmt;

use tracing::{debug, info, instrument, trace};

use super::board::Board;
use super::cell::{Cell, Coord};
use super::moves::{MoveCandidate, MoveSet};
use super::observer::SessionObserver;
use super::player::Player;
use super::rules;
use super::settings::{Settings, Variant};
use crate::error::{ConstructionError, MoveError};

/// Smallest side length reverse play may shrink the board to.
pub const MIN_PLAYABLE_SIDE: usize = 4;

/// Where the session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    InProgress(Player),
    /// Mid multi-jump: only `lock` may move, and only by capturing.
    AwaitingContinuation { turn: Player, lock: Coord },
    Terminal(Player),
}

/// Running piece counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PieceCounts {
    pub one: usize,
    pub two: usize,
}

impl PieceCounts {
    pub fn of(board: &Board) -> Self {
        PieceCounts {
            one: board.count(Player::One),
            two: board.count(Player::Two),
        }
    }

    pub fn get(&self, player: Player) -> usize {
        match player {
            Player::One => self.one,
            Player::Two => self.two,
        }
    }

    fn decrement(&mut self, player: Player) {
        let count = match player {
            Player::One => &mut self.one,
            Player::Two => &mut self.two,
        };
        *count = count.saturating_sub(1);
    }
}

/// Everything a move can change. History entries are independent copies
/// of this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    board: Board,
    turn: Player,
    counts: PieceCounts,
    lock: Option<Coord>,
    active: Option<Coord>,
    winner: Option<Player>,
}

impl GameState {
    fn new(board: Board, turn: Player) -> Self {
        GameState {
            counts: PieceCounts::of(&board),
            board,
            turn,
            lock: None,
            active: None,
            winner: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> Player {
        self.turn
    }

    pub fn counts(&self) -> PieceCounts {
        self.counts
    }

    pub fn lock(&self) -> Option<Coord> {
        self.lock
    }

    pub fn active(&self) -> Option<Coord> {
        self.active
    }

    pub fn winner(&self) -> Option<Player> {
        self.winner
    }
}

/// What an accepted move did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub candidate: MoveCandidate,
    /// Cells crowned during this ply.
    pub promoted: Vec<Coord>,
    /// Set when the same piece must keep jumping.
    pub chain: Option<Coord>,
    /// Reverse play retired a ring this ply.
    pub shrunk: bool,
    pub winner: Option<Player>,
}

/// Result of clicking a cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    Selected(Coord),
    Unchanged,
    Moved(MoveOutcome),
    Rejected(MoveError),
}

/// The authoritative game: board, turn, chain lock, history and observers.
pub struct GameSession {
    settings: Settings,
    state: GameState,
    legal: MoveSet,
    history: Vec<GameState>,
    observers: Vec<Box<dyn SessionObserver>>,
    game_over_notified: bool,
}

impl GameSession {
    /// Start a fresh game on the standard opening position.
    pub fn new(settings: Settings) -> Result<Self, ConstructionError> {
        settings.validate()?;
        let board = Board::standard(settings.board_size)?;
        Ok(Self::build(settings, GameState::new(board, Player::One)))
    }

    /// Start from an arbitrary position. Piece counts come from the board
    /// and the board size overrides `settings.board_size`.
    pub fn from_board(board: Board, settings: Settings, turn: Player) -> Result<Self, ConstructionError> {
        if board.width() != board.height() {
            return Err(ConstructionError::InvalidDimensions {
                width: board.width(),
                height: board.height(),
            });
        }
        let settings = Settings {
            board_size: board.width(),
            ..settings
        };
        if settings.variant == Variant::ForcedCapture && !settings.force_capture {
            return Err(ConstructionError::ContradictoryCapture);
        }
        let mut session = Self::build(settings, GameState::new(board, turn));
        let winner = session
            .wipeout_winner()
            .or_else(|| session.legal.is_empty().then(|| turn.other()));
        if let Some(winner) = winner {
            session.state.winner = Some(winner);
            session.refresh_legal();
        }
        Ok(session)
    }

    fn build(settings: Settings, state: GameState) -> Self {
        let mut session = GameSession {
            settings,
            state,
            legal: MoveSet::new(),
            history: Vec::new(),
            observers: Vec::new(),
            game_over_notified: false,
        };
        session.refresh_legal();
        session
    }

    pub fn add_observer(&mut self, observer: Box<dyn SessionObserver>) {
        self.observers.push(observer);
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn variant(&self) -> Variant {
        self.settings.variant
    }

    pub fn board(&self) -> &Board {
        &self.state.board
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn turn(&self) -> Player {
        self.state.turn
    }

    pub fn phase(&self) -> Phase {
        match (self.state.winner, self.state.lock) {
            (Some(winner), _) => Phase::Terminal(winner),
            (None, Some(lock)) => Phase::AwaitingContinuation {
                turn: self.state.turn,
                lock,
            },
            (None, None) => Phase::InProgress(self.state.turn),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state.winner.is_some()
    }

    pub fn winner(&self) -> Option<Player> {
        self.state.winner
    }

    /// Cached legal-move set; empty once the game is over.
    pub fn legal_moves(&self) -> &MoveSet {
        &self.legal
    }

    pub fn active(&self) -> Option<Coord> {
        self.state.active
    }

    pub fn lock_piece(&self) -> Option<Coord> {
        self.state.lock
    }

    pub fn piece_count(&self, player: Player) -> usize {
        self.state.counts.get(player)
    }

    pub fn empty_count(&self) -> usize {
        self.state.board.empty_count()
    }

    /// Pieces plus one bonus point per king, counted from the board.
    pub fn score(&self) -> (usize, usize) {
        let board = &self.state.board;
        let score = |p| board.count(p) + board.king_count(p);
        (score(Player::One), score(Player::Two))
    }

    pub fn history_depth(&self) -> usize {
        self.history.len()
    }

    pub fn snapshot(&self) -> GameState {
        self.state.clone()
    }

    /// Deep copy of the live state. History and observers stay behind.
    pub fn copy(&self) -> GameSession {
        GameSession {
            settings: self.settings,
            state: self.state.clone(),
            legal: self.legal.clone(),
            history: Vec::new(),
            observers: Vec::new(),
            game_over_notified: self.game_over_notified,
        }
    }

    /// Throw the current game away and set up a new one with the same
    /// settings. Observers are kept.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        // Settings were validated when the session was built.
        let board = Board::standard(self.settings.board_size).unwrap_or_default();
        self.state = GameState::new(board, Player::One);
        self.history.clear();
        self.game_over_notified = false;
        self.refresh_legal();
        self.notify();
    }

    /// Click handling: select one of the mover's pieces, or move the
    /// selected piece to `coord`.
    #[instrument(skip(self))]
    pub fn select_or_move(&mut self, coord: Coord) -> SelectOutcome {
        if self.is_terminal() {
            return SelectOutcome::Rejected(MoveError::GameOver);
        }
        match self.state.active {
            None => {
                let owner = self.state.board.get(coord).and_then(Cell::owner);
                if owner != Some(self.state.turn) {
                    return SelectOutcome::Unchanged;
                }
                self.state.active = Some(coord);
                self.refresh_guides();
                SelectOutcome::Selected(coord)
            }
            Some(active) if active == coord => SelectOutcome::Unchanged,
            Some(active) => match self.apply_move(active, coord) {
                Ok(outcome) => SelectOutcome::Moved(outcome),
                Err(err) => {
                    self.state.active = None;
                    self.refresh_guides();
                    SelectOutcome::Rejected(err)
                }
            },
        }
    }

    /// Boolean form of [`GameSession::apply_move`].
    pub fn make_move(&mut self, src: Coord, dst: Coord) -> bool {
        self.apply_move(src, dst).is_ok()
    }

    /// Play `src -> dst` if it is in the legal set. On failure nothing
    /// changes and no history entry is left behind.
    #[instrument(skip(self), fields(turn = ?self.state.turn))]
    pub fn apply_move(&mut self, src: Coord, dst: Coord) -> Result<MoveOutcome, MoveError> {
        if self.is_terminal() {
            trace!("move rejected: game over");
            return Err(MoveError::GameOver);
        }
        self.history.push(self.state.clone());
        let Some(candidate) = self.legal.find(src, dst).copied() else {
            self.history.pop();
            trace!(%src, %dst, "move rejected: not legal");
            return Err(MoveError::Illegal { src, dst });
        };

        let state = &mut self.state;
        state.board.swap(src, dst);
        state.board.record_move();
        if let Some(captured) = candidate.captured {
            if let Some(owner) = state.board.eliminate(captured) {
                state.counts.decrement(owner);
            }
            state.lock = rules::can_continue_jump(&state.board, dst, state.turn).then_some(dst);
        }
        debug!(%candidate, chain = ?state.lock, "move applied");

        let outcome = self.advance(candidate);
        self.state.active = self.state.lock;
        self.refresh_guides();
        self.notify();
        Ok(outcome)
    }

    /// Restore the state from before the last accepted move. Returns false
    /// when there is nothing to undo.
    #[instrument(skip(self))]
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.history.pop() else {
            return false;
        };
        self.state = previous;
        self.state.board.clear_decorations();
        self.refresh_legal();
        debug!(depth = self.history.len(), "move undone");
        self.notify();
        true
    }

    /// Drop move-guide highlights until the next refresh.
    pub fn clear_guides(&mut self) {
        for cell in self.state.board.cells_mut() {
            let decor = cell.decorations_mut();
            decor.movable = false;
            decor.target = false;
        }
    }

    /// Turn move guides on or off for the rest of the session.
    pub fn set_display_guide(&mut self, on: bool) {
        self.settings.display_guide = on;
        if on {
            self.refresh_guides();
        } else {
            self.clear_guides();
        }
    }

    /// Move the hover marker. Presentation only.
    pub fn hover(&mut self, coord: Option<Coord>) {
        for cell in self.state.board.cells_mut() {
            cell.decorations_mut().hover = Some(cell.coord()) == coord && !cell.is_blocked();
        }
    }

    /// Post-move bookkeeping: crown, check for a wipeout, rotate, shrink
    /// (reverse only), recompute, and check for a stalemated side.
    fn advance(&mut self, candidate: MoveCandidate) -> MoveOutcome {
        let promoted = self.promote();
        let mut outcome = MoveOutcome {
            candidate,
            promoted,
            chain: None,
            shrunk: false,
            winner: None,
        };

        if let Some(winner) = self.wipeout_winner() {
            self.finish(winner);
            outcome.winner = Some(winner);
            return outcome;
        }

        if !outcome.promoted.is_empty() && self.state.lock.take().is_some() {
            debug!("promotion ends the chain");
        }
        if self.state.lock.is_none() {
            self.state.turn = self.state.turn.other();
        }
        if self.settings.variant == Variant::Reverse {
            outcome.shrunk = self.shrink_ring();
        }
        self.refresh_legal();

        if self.legal.is_empty() {
            let winner = self.state.turn.other();
            self.finish(winner);
            outcome.winner = Some(winner);
        }
        outcome.chain = self.state.lock;
        outcome
    }

    /// Crown every man standing on the far edge of the current playable
    /// area. Returns the crowned cells.
    fn promote(&mut self) -> Vec<Coord> {
        let board = &mut self.state.board;
        let offset = match self.settings.variant {
            Variant::Reverse => board.ring_offset(),
            _ => 0,
        };
        if offset * 2 >= board.width() || offset * 2 >= board.height() {
            return Vec::new();
        }
        let top = offset;
        let bottom = board.height() - 1 - offset;
        let mut promoted = Vec::new();
        for x in offset..board.width() - offset {
            for (y, player) in [(top, Player::Two), (bottom, Player::One)] {
                let coord = Coord::new(x, y);
                if let Some(cell) = board.get_mut(coord) {
                    if cell.owner() == Some(player) && !cell.is_king() {
                        cell.set_king(true);
                        promoted.push(coord);
                    }
                }
            }
        }
        if !promoted.is_empty() {
            debug!(?promoted, "pieces crowned");
        }
        promoted
    }

    /// The winner if either side has run out of pieces. Reverse play hands
    /// the win to the side that lost everything.
    fn wipeout_winner(&self) -> Option<Player> {
        let emptied = [Player::One, Player::Two]
            .into_iter()
            .find(|&p| self.state.counts.get(p) == 0)?;
        Some(match self.settings.variant {
            Variant::Reverse => emptied,
            Variant::Regular | Variant::ForcedCapture => emptied.other(),
        })
    }

    /// Retire the outer ring if none of its cells holds a piece and the
    /// board would stay at least `MIN_PLAYABLE_SIDE` wide.
    fn shrink_ring(&mut self) -> bool {
        let board = &mut self.state.board;
        let offset = board.ring_offset();
        let side = board.width().min(board.height());
        if side < 2 * (offset + 1) + MIN_PLAYABLE_SIDE {
            return false;
        }
        let ring = board.ring(offset);
        if ring.iter().any(|&c| board.occupant(c).is_piece()) {
            return false;
        }
        for coord in ring {
            if let Some(cell) = board.get_mut(coord) {
                cell.set_disabled(true);
            }
        }
        debug!(offset, "outer ring retired");
        true
    }

    fn finish(&mut self, winner: Player) {
        info!(winner = winner.name(), "game over");
        self.state.winner = Some(winner);
        self.state.lock = None;
        self.refresh_legal();
    }

    fn refresh_legal(&mut self) {
        self.legal = if self.is_terminal() {
            MoveSet::new()
        } else {
            rules::legal_moves(
                &self.state.board,
                self.state.turn,
                self.state.lock,
                self.settings.effective_force_capture(),
            )
        };
        self.refresh_guides();
    }

    /// Sync selection and move-guide decorations with the current state.
    fn refresh_guides(&mut self) {
        let active = self.state.active;
        let guides = self.settings.display_guide;
        let sources = self.legal.sources();
        let targets: Vec<Coord> = active
            .map(|a| self.legal.from_cell(a).map(|m| m.dst).collect())
            .unwrap_or_default();
        for cell in self.state.board.cells_mut() {
            let coord = cell.coord();
            let is_piece = cell.occupant().is_piece();
            let decor = cell.decorations_mut();
            decor.selected = active == Some(coord) && is_piece;
            decor.movable = guides && active.is_none() && sources.contains(&coord);
            decor.target = guides && targets.contains(&coord);
        }
    }

    fn notify(&mut self) {
        let mut observers = std::mem::take(&mut self.observers);
        for observer in observers.iter_mut() {
            observer.on_board_changed(self);
        }
        if let Some(winner) = self.state.winner {
            if !self.game_over_notified {
                self.game_over_notified = true;
                for observer in observers.iter_mut() {
                    observer.on_game_over(self, winner);
                }
            }
        }
        self.observers = observers;
    }
}

impl fmt::Debug for GameSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameSession")
            .field("settings", &self.settings)
            .field("state", &self.state)
            .field("legal", &self.legal.len())
            .field("history", &self.history.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::game::Occupant;

    fn c(x: usize, y: usize) -> Coord {
        Coord::new(x, y)
    }

    fn regular() -> Settings {
        Settings::default()
    }

    fn session_with(pieces: &[(Coord, Player, bool)], settings: Settings, turn: Player) -> GameSession {
        let mut board = Board::empty(8).unwrap();
        for &(coord, player, king) in pieces {
            assert!(board.place(coord, player, king), "cannot place at {coord}");
        }
        GameSession::from_board(board, settings, turn).unwrap()
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Changed(usize),
        Over(Player),
    }

    struct Recorder(Rc<RefCell<Vec<Event>>>);

    impl SessionObserver for Recorder {
        fn on_board_changed(&mut self, session: &GameSession) {
            self.0.borrow_mut().push(Event::Changed(session.history_depth()));
        }

        fn on_game_over(&mut self, _session: &GameSession, winner: Player) {
            self.0.borrow_mut().push(Event::Over(winner));
        }
    }

    fn record(session: &mut GameSession) -> Rc<RefCell<Vec<Event>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        session.add_observer(Box::new(Recorder(events.clone())));
        events
    }

    /// Every cached move lands on an open cell and captures an opponent.
    fn assert_legal_invariants(session: &GameSession) {
        let board = session.board();
        for m in session.legal_moves() {
            assert_eq!(m.player, session.turn());
            assert_eq!(board.get(m.src).unwrap().owner(), Some(session.turn()));
            let dst = board.get(m.dst).expect("destination on board");
            assert!(dst.is_open(), "{m} lands on a taken or retired cell");
            if let Some(captured) = m.captured {
                assert_eq!(board.get(captured).unwrap().owner(), Some(session.turn().other()));
            }
            if let Some(lock) = session.lock_piece() {
                assert_eq!(m.src, lock);
                assert!(m.is_capture());
            }
        }
        assert_eq!(session.piece_count(Player::One), board.count(Player::One));
        assert_eq!(session.piece_count(Player::Two), board.count(Player::Two));
    }

    #[test]
    fn test_initial_state() {
        let session = GameSession::new(regular()).unwrap();
        assert_eq!(session.turn(), Player::One);
        assert_eq!(session.phase(), Phase::InProgress(Player::One));
        assert!(!session.is_terminal());
        assert_eq!(session.legal_moves().len(), 7);
        assert_eq!(session.piece_count(Player::One), 12);
        assert_eq!(session.piece_count(Player::Two), 12);
        assert_eq!(session.score(), (12, 12));
        assert_eq!(session.history_depth(), 0);
        assert_eq!(session.empty_count(), 8);
    }

    #[test]
    fn test_construction_errors() {
        let bad = Settings::new(Variant::ForcedCapture, false);
        assert_eq!(GameSession::new(bad).err(), Some(ConstructionError::ContradictoryCapture));
        let bad = Settings {
            board_size: 7,
            ..Settings::default()
        };
        assert_eq!(GameSession::new(bad).err(), Some(ConstructionError::UnsupportedSize(7)));
        let board = Board::new(8, 6).unwrap();
        assert!(matches!(
            GameSession::from_board(board, regular(), Player::One),
            Err(ConstructionError::InvalidDimensions { width: 8, height: 6 })
        ));
    }

    #[test]
    fn test_single_step_rotates_turn() {
        let mut session = GameSession::new(regular()).unwrap();
        assert!(session.make_move(c(0, 2), c(1, 3)));
        assert_eq!(session.board().occupant(c(1, 3)), Occupant::PlayerOne);
        assert_eq!(session.board().occupant(c(0, 2)), Occupant::Empty);
        assert_eq!(session.turn(), Player::Two);
        assert_eq!(session.history_depth(), 1);
        assert_eq!(session.board().move_count(), 1);
        assert_legal_invariants(&session);
    }

    #[test]
    fn test_illegal_move_changes_nothing() {
        let mut session = GameSession::new(regular()).unwrap();
        let before = session.snapshot();
        assert_eq!(
            session.apply_move(c(0, 2), c(0, 3)),
            Err(MoveError::Illegal {
                src: c(0, 2),
                dst: c(0, 3)
            })
        );
        // Wrong side's piece.
        assert!(!session.make_move(c(1, 5), c(0, 4)));
        assert_eq!(session.snapshot(), before);
        assert_eq!(session.history_depth(), 0);
    }

    #[test]
    fn test_capture_decrements_and_rotates() {
        let mut board = Board::standard(8).unwrap();
        board.eliminate(c(1, 5));
        assert!(board.place(c(3, 3), Player::Two, false));
        let mut session = GameSession::from_board(board, regular(), Player::One).unwrap();
        assert_eq!(session.piece_count(Player::Two), 12);

        let outcome = session.apply_move(c(2, 2), c(4, 4)).unwrap();
        assert_eq!(outcome.candidate.captured, Some(c(3, 3)));
        assert_eq!(outcome.chain, None);
        assert_eq!(session.piece_count(Player::Two), 11);
        assert_eq!(session.board().occupant(c(3, 3)), Occupant::Empty);
        assert_eq!(session.turn(), Player::Two);
        assert_legal_invariants(&session);
    }

    #[test]
    fn test_multi_jump_holds_turn() {
        let mut board = Board::standard(8).unwrap();
        board.eliminate(c(1, 5));
        board.eliminate(c(6, 6));
        assert!(board.place(c(3, 3), Player::Two, false));
        assert!(board.place(c(7, 3), Player::Two, false));
        let mut session = GameSession::from_board(board, regular(), Player::One).unwrap();
        assert_eq!(session.piece_count(Player::Two), 12);
        let start = session.snapshot();

        let outcome = session.apply_move(c(2, 2), c(4, 4)).unwrap();
        assert_eq!(outcome.chain, Some(c(4, 4)));
        assert_eq!(session.piece_count(Player::Two), 11);
        assert_eq!(session.turn(), Player::One);
        assert_eq!(
            session.phase(),
            Phase::AwaitingContinuation {
                turn: Player::One,
                lock: c(4, 4)
            }
        );
        assert_eq!(session.legal_moves().len(), 1);
        assert!(session.legal_moves().iter().all(|m| m.src == c(4, 4) && m.is_capture()));
        assert_legal_invariants(&session);

        // Mid-chain, nothing else may move.
        assert!(!session.make_move(c(0, 2), c(1, 3)));

        let after_first = session.snapshot();
        let outcome = session.apply_move(c(4, 4), c(6, 6)).unwrap();
        assert_eq!(outcome.chain, None);
        assert_eq!(session.piece_count(Player::Two), 10);
        assert_eq!(session.turn(), Player::Two);
        assert_legal_invariants(&session);

        assert!(session.undo());
        assert_eq!(session.snapshot(), after_first);
        assert_eq!(session.lock_piece(), Some(c(4, 4)));
        assert!(session.undo());
        assert_eq!(session.snapshot(), start);
        assert!(!session.undo());
    }

    #[test]
    fn test_promotion_allows_backward_moves() {
        let mut session = session_with(
            &[(c(6, 6), Player::One, false), (c(1, 7), Player::Two, false)],
            regular(),
            Player::One,
        );
        let outcome = session.apply_move(c(6, 6), c(7, 7)).unwrap();
        assert_eq!(outcome.promoted, vec![c(7, 7)]);
        assert!(session.board().get(c(7, 7)).unwrap().is_king());
        assert_eq!(session.score(), (2, 1));

        assert!(session.make_move(c(1, 7), c(0, 6)));
        assert!(session.legal_moves().find(c(7, 7), c(6, 6)).is_some());
    }

    #[test]
    fn test_forced_capture_variant() {
        let pieces = [
            (c(2, 2), Player::One, false),
            (c(3, 3), Player::Two, false),
            (c(6, 2), Player::One, false),
        ];
        let relaxed = session_with(&pieces, regular(), Player::One);
        assert!(relaxed.legal_moves().iter().any(|m| !m.is_capture()));

        let forced = session_with(&pieces, Settings::new(Variant::ForcedCapture, true), Player::One);
        assert!(!forced.legal_moves().is_empty());
        assert!(forced.legal_moves().iter().all(MoveCandidate::is_capture));

        let flag_only = session_with(&pieces, Settings::new(Variant::Regular, true), Player::One);
        assert!(flag_only.legal_moves().iter().all(MoveCandidate::is_capture));
    }

    #[test]
    fn test_reverse_retires_empty_outer_ring() {
        let mut session = session_with(
            &[(c(2, 2), Player::One, false), (c(5, 5), Player::Two, false)],
            Settings::new(Variant::Reverse, false),
            Player::One,
        );
        let outcome = session.apply_move(c(2, 2), c(3, 3)).unwrap();
        assert!(outcome.shrunk);
        let ring = session.board().ring(0);
        assert!(ring.iter().all(|&r| session.board().get(r).unwrap().is_disabled()));
        assert_eq!(session.board().ring_offset(), 1);
        for m in session.legal_moves() {
            assert!(!ring.contains(&m.dst) && !ring.contains(&m.src));
        }
        assert_legal_invariants(&session);

        // Undo brings the ring back.
        assert!(session.undo());
        assert_eq!(session.board().ring_offset(), 0);
    }

    #[test]
    fn test_reverse_waits_for_occupied_ring() {
        let mut session = session_with(
            &[
                (c(2, 2), Player::One, false),
                (c(0, 6), Player::One, false),
                (c(5, 5), Player::Two, false),
            ],
            Settings::new(Variant::Reverse, false),
            Player::One,
        );
        let outcome = session.apply_move(c(2, 2), c(3, 3)).unwrap();
        assert!(!outcome.shrunk);
        assert_eq!(session.board().ring_offset(), 0);
    }

    #[test]
    fn test_reverse_stops_at_minimum_size() {
        let mut board = Board::empty(8).unwrap();
        for offset in 0..2 {
            for coord in board.ring(offset) {
                board.get_mut(coord).unwrap().set_disabled(true);
            }
        }
        board.place(c(3, 3), Player::One, false);
        board.place(c(4, 4), Player::Two, false);
        let mut session =
            GameSession::from_board(board, Settings::new(Variant::Reverse, false), Player::One).unwrap();
        assert_eq!(session.board().ring_offset(), 2);
        assert!(!session.shrink_ring());
        assert_eq!(session.board().ring_offset(), 2);
    }

    #[test]
    fn test_reverse_shrinks_second_ring() {
        let mut board = Board::empty(8).unwrap();
        for coord in board.ring(0) {
            board.get_mut(coord).unwrap().set_disabled(true);
        }
        board.place(c(3, 3), Player::One, false);
        board.place(c(4, 4), Player::Two, false);
        let mut session =
            GameSession::from_board(board, Settings::new(Variant::Reverse, false), Player::One).unwrap();
        assert!(session.shrink_ring());
        assert_eq!(session.board().ring_offset(), 2);
    }

    #[test]
    fn test_reverse_kings_on_shrunk_edge() {
        let mut board = Board::empty(8).unwrap();
        for coord in board.ring(0) {
            board.get_mut(coord).unwrap().set_disabled(true);
        }
        board.place(c(3, 5), Player::One, false);
        board.place(c(3, 3), Player::Two, false);
        let mut session =
            GameSession::from_board(board, Settings::new(Variant::Reverse, false), Player::One).unwrap();
        let outcome = session.apply_move(c(3, 5), c(4, 6)).unwrap();
        assert_eq!(outcome.promoted, vec![c(4, 6)]);
        assert!(session.board().get(c(4, 6)).unwrap().is_king());
    }

    #[test]
    fn test_crowning_on_shrunk_edge_ends_chain() {
        let mut session = session_with(
            &[
                (c(4, 2), Player::One, false),
                (c(4, 4), Player::One, false),
                (c(2, 2), Player::One, false),
                (c(4, 6), Player::One, false),
                (c(5, 5), Player::Two, false),
            ],
            Settings::new(Variant::Reverse, false),
            Player::One,
        );
        let outcome = session.apply_move(c(4, 2), c(5, 3)).unwrap();
        assert!(outcome.shrunk);
        assert!(outcome.promoted.is_empty());
        assert_eq!(session.board().ring_offset(), 1);
        assert!(!session.board().get(c(4, 6)).unwrap().is_king());

        // (4, 6) now sits on the inner edge and is crowned by Two's jump,
        // which ends Two's chain even though (3, 3) -> (1, 1) is open.
        let outcome = session.apply_move(c(5, 5), c(3, 3)).unwrap();
        assert!(rules::can_continue_jump(session.board(), c(3, 3), Player::Two));
        assert_eq!(outcome.promoted, vec![c(4, 6)]);
        assert_eq!(outcome.chain, None);
        assert_eq!(outcome.winner, None);
        assert!(session.board().get(c(4, 6)).unwrap().is_king());
        assert_eq!(session.turn(), Player::One);
        assert_eq!(session.lock_piece(), None);
        assert_eq!(session.phase(), Phase::InProgress(Player::One));
        assert!(session.legal_moves().iter().all(|m| m.player == Player::One));
        assert_legal_invariants(&session);
    }

    #[test]
    fn test_blocked_side_loses() {
        let mut session = session_with(
            &[
                (c(1, 5), Player::One, false),
                (c(2, 4), Player::One, false),
                (c(6, 0), Player::One, false),
                (c(0, 6), Player::Two, false),
            ],
            regular(),
            Player::One,
        );
        let events = record(&mut session);
        let outcome = session.apply_move(c(6, 0), c(5, 1)).unwrap();
        assert_eq!(outcome.winner, Some(Player::One));
        assert!(session.is_terminal());
        assert_eq!(session.winner(), Some(Player::One));
        assert_eq!(session.phase(), Phase::Terminal(Player::One));
        assert_eq!(session.piece_count(Player::Two), 1);
        assert!(session.legal_moves().is_empty());
        assert_eq!(*events.borrow(), vec![Event::Changed(1), Event::Over(Player::One)]);
    }

    #[test]
    fn test_wipeout_regular_and_reverse() {
        let pieces = [(c(2, 2), Player::One, false), (c(3, 3), Player::Two, false)];

        let mut session = session_with(&pieces, regular(), Player::One);
        assert!(session.make_move(c(2, 2), c(4, 4)));
        assert_eq!(session.winner(), Some(Player::One));

        let mut session = session_with(&pieces, Settings::new(Variant::Reverse, false), Player::One);
        assert!(session.make_move(c(2, 2), c(4, 4)));
        assert_eq!(session.winner(), Some(Player::Two));
    }

    #[test]
    fn test_terminal_rejects_moves() {
        let mut session = session_with(
            &[(c(2, 2), Player::One, false), (c(3, 3), Player::Two, false)],
            regular(),
            Player::One,
        );
        let events = record(&mut session);
        assert!(session.make_move(c(2, 2), c(4, 4)));
        let before = session.snapshot();
        assert_eq!(session.apply_move(c(4, 4), c(5, 5)), Err(MoveError::GameOver));
        assert_eq!(session.select_or_move(c(4, 4)), SelectOutcome::Rejected(MoveError::GameOver));
        assert_eq!(session.snapshot(), before);
        assert_eq!(session.history_depth(), 1);

        // Undo is still allowed, and the game-over callback never repeats.
        assert!(session.undo());
        assert!(!session.is_terminal());
        assert!(session.make_move(c(2, 2), c(4, 4)));
        assert_eq!(
            *events.borrow(),
            vec![
                Event::Changed(1),
                Event::Over(Player::One),
                Event::Changed(0),
                Event::Changed(1),
            ]
        );
    }

    #[test]
    fn test_construction_detects_finished_positions() {
        let session = session_with(
            &[
                (c(0, 6), Player::Two, false),
                (c(1, 5), Player::One, false),
                (c(2, 4), Player::One, false),
            ],
            regular(),
            Player::Two,
        );
        assert_eq!(session.winner(), Some(Player::One));
        let session = session_with(&[(c(2, 2), Player::One, false)], regular(), Player::One);
        assert_eq!(session.winner(), Some(Player::One));
    }

    #[test]
    fn test_select_or_move() {
        let mut session = GameSession::new(regular()).unwrap();
        assert_eq!(session.select_or_move(c(1, 3)), SelectOutcome::Unchanged);
        assert_eq!(session.select_or_move(c(1, 5)), SelectOutcome::Unchanged);
        assert_eq!(session.select_or_move(c(2, 2)), SelectOutcome::Selected(c(2, 2)));
        assert_eq!(session.active(), Some(c(2, 2)));
        assert!(session.board().get(c(2, 2)).unwrap().decorations().selected);
        assert_eq!(session.select_or_move(c(2, 2)), SelectOutcome::Unchanged);
        assert_eq!(session.active(), Some(c(2, 2)));

        let rejected = session.select_or_move(c(2, 4));
        assert!(matches!(rejected, SelectOutcome::Rejected(MoveError::Illegal { .. })));
        assert_eq!(session.active(), None);
        assert_eq!(session.history_depth(), 0);

        session.select_or_move(c(2, 2));
        let moved = session.select_or_move(c(3, 3));
        assert!(matches!(moved, SelectOutcome::Moved(_)));
        assert_eq!(session.active(), None);
        assert_eq!(session.turn(), Player::Two);
    }

    #[test]
    fn test_chain_keeps_piece_active() {
        let mut session = session_with(
            &[
                (c(2, 2), Player::One, false),
                (c(3, 3), Player::Two, false),
                (c(5, 5), Player::Two, false),
            ],
            regular(),
            Player::One,
        );
        session.select_or_move(c(2, 2));
        let SelectOutcome::Moved(outcome) = session.select_or_move(c(4, 4)) else {
            panic!("expected a move");
        };
        assert_eq!(outcome.chain, Some(c(4, 4)));
        assert_eq!(session.active(), Some(c(4, 4)));
        assert!(matches!(session.select_or_move(c(6, 6)), SelectOutcome::Moved(_)));
        assert_eq!(session.winner(), Some(Player::One));
    }

    #[test]
    fn test_move_guides() {
        let settings = Settings {
            display_guide: true,
            ..Settings::default()
        };
        let mut session = GameSession::new(settings).unwrap();
        let movable: Vec<Coord> = session
            .board()
            .cells()
            .filter(|cell| cell.decorations().movable)
            .map(Cell::coord)
            .collect();
        assert_eq!(movable, vec![c(0, 2), c(2, 2), c(4, 2), c(6, 2)]);

        session.select_or_move(c(2, 2));
        let targets: Vec<Coord> = session
            .board()
            .cells()
            .filter(|cell| cell.decorations().target)
            .map(Cell::coord)
            .collect();
        assert_eq!(targets, vec![c(1, 3), c(3, 3)]);
        assert!(session.board().cells().all(|cell| !cell.decorations().movable));

        session.clear_guides();
        assert!(session.board().cells().all(|cell| !cell.decorations().target));
    }

    #[test]
    fn test_toggle_guides() {
        let mut session = GameSession::new(regular()).unwrap();
        let movable = |session: &GameSession| {
            session.board().cells().filter(|cell| cell.decorations().movable).count()
        };
        assert_eq!(movable(&session), 0);

        session.set_display_guide(true);
        assert!(session.settings().display_guide);
        assert_eq!(movable(&session), 4);

        session.set_display_guide(false);
        assert_eq!(movable(&session), 0);
        assert!(session.make_move(c(0, 2), c(1, 3)));
        assert_eq!(movable(&session), 0);
    }

    #[test]
    fn test_undo_drops_stale_decorations() {
        let mut session = GameSession::new(regular()).unwrap();
        session.hover(Some(c(2, 2)));
        assert!(session.make_move(c(0, 2), c(1, 3)));
        session.hover(Some(c(1, 5)));
        assert!(session.undo());
        assert!(session.board().cells().all(|cell| !cell.decorations().hover));
    }

    #[test]
    fn test_guides_off_by_default() {
        let session = GameSession::new(regular()).unwrap();
        assert!(session.board().cells().all(|cell| !cell.decorations().movable));
    }

    #[test]
    fn test_observers_fire_in_order() {
        let mut session = GameSession::new(regular()).unwrap();
        let first = record(&mut session);
        let second = record(&mut session);
        assert!(session.make_move(c(0, 2), c(1, 3)));
        assert!(!session.make_move(c(0, 2), c(1, 3)));
        assert!(session.undo());
        assert!(!session.undo());
        let expected = vec![Event::Changed(1), Event::Changed(0)];
        assert_eq!(*first.borrow(), expected);
        assert_eq!(*second.borrow(), expected);
    }

    #[test]
    fn test_copy_is_independent() {
        let mut session = GameSession::new(regular()).unwrap();
        assert!(session.make_move(c(0, 2), c(1, 3)));
        let mut copy = session.copy();
        assert_eq!(copy.history_depth(), 0);
        assert_eq!(copy.snapshot(), session.snapshot());
        assert!(copy.make_move(c(1, 5), c(0, 4)));
        assert_eq!(session.turn(), Player::Two);
        assert_eq!(session.board().occupant(c(0, 4)), Occupant::Empty);
    }

    #[test]
    fn test_history_is_isolated_from_live_state() {
        let mut session = GameSession::new(regular()).unwrap();
        let before = session.snapshot();
        assert!(session.make_move(c(0, 2), c(1, 3)));
        assert!(session.make_move(c(1, 5), c(0, 4)));
        assert!(session.undo());
        assert!(session.undo());
        assert_eq!(session.snapshot(), before);
    }

    #[test]
    fn test_reset() {
        let mut session = GameSession::new(regular()).unwrap();
        let events = record(&mut session);
        assert!(session.make_move(c(0, 2), c(1, 3)));
        session.reset();
        assert_eq!(session.history_depth(), 0);
        assert_eq!(session.turn(), Player::One);
        assert_eq!(session.legal_moves().len(), 7);
        assert_eq!(events.borrow().len(), 2);
    }

    #[test]
    fn test_legal_moves_idempotent() {
        let session = GameSession::new(regular()).unwrap();
        let first = session.legal_moves().clone();
        let second = session.legal_moves().clone();
        assert_eq!(first, second);
        let recomputed = rules::legal_moves(session.board(), session.turn(), None, false);
        assert_eq!(first, recomputed);
    }

    /// Play the first legal move until the game ends, checking invariants
    /// and undo round trips along the way.
    fn play_out(settings: Settings) -> GameSession {
        let mut session = GameSession::new(settings).unwrap();
        let mut counts = (12, 12);
        for _ in 0..300 {
            if session.is_terminal() {
                break;
            }
            assert_legal_invariants(&session);
            let m = *session.legal_moves().iter().next().expect("non-terminal session has moves");
            let before = session.snapshot();
            let legal_before = session.legal_moves().clone();

            assert!(session.make_move(m.src, m.dst));
            assert!(session.undo());
            assert_eq!(session.snapshot(), before);
            assert_eq!(*session.legal_moves(), legal_before);

            assert!(session.make_move(m.src, m.dst));
            let now = (session.piece_count(Player::One), session.piece_count(Player::Two));
            assert!(now.0 <= counts.0 && now.1 <= counts.1);
            counts = now;
            for cell in session.board().cells().filter(|cell| cell.is_disabled()) {
                assert!(cell.occupant().is_vacant());
            }
        }
        session
    }

    #[test]
    fn test_play_out_regular() {
        let session = play_out(regular());
        assert!(session.history_depth() > 0);
    }

    #[test]
    fn test_play_out_forced_capture() {
        play_out(Settings::new(Variant::ForcedCapture, true));
    }

    #[test]
    fn test_play_out_reverse() {
        play_out(Settings::new(Variant::Reverse, false));
    }
}
