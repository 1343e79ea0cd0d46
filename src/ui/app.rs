use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{backend::Backend, Terminal};

use crate::error::MoveError;
use crate::game::{Coord, GameSession, SelectOutcome, SessionObserver};

/// Shared status line, written by the session observer and by key handling.
type StatusLine = Rc<RefCell<Option<String>>>;

/// Reports the result on the status line whenever the session reaches a
/// finished position, including one replayed after an undo.
struct StatusObserver {
    status: StatusLine,
}

impl SessionObserver for StatusObserver {
    fn on_board_changed(&mut self, session: &GameSession) {
        if let Some(winner) = session.winner() {
            let (one, two) = session.score();
            *self.status.borrow_mut() = Some(format!(
                "{} wins! ({one} - {two})  Press 'r' to restart.",
                winner.name()
            ));
        }
    }
}

pub struct App {
    session: GameSession,
    cursor: Coord,
    should_quit: bool,
    message: StatusLine,
}

impl App {
    pub fn new(mut session: GameSession) -> Self {
        let message: StatusLine = Rc::new(RefCell::new(None));
        session.add_observer(Box::new(StatusObserver {
            status: message.clone(),
        }));
        let cursor = Coord::new(0, 2.min(session.board().height() - 1));
        session.hover(Some(cursor));
        App {
            session,
            cursor,
            should_quit: false,
            message,
        }
    }

    /// Main application loop
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            self.handle_events()?;
        }
        Ok(())
    }

    /// Handle keyboard events
    fn handle_events(&mut self) -> io::Result<()> {
        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key);
                }
            }
        }
        Ok(())
    }

    /// Handle key press
    fn handle_key(&mut self, key: KeyEvent) {
        let width = self.session.board().width();
        let height = self.session.board().height();

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Left => self.cursor.x = self.cursor.x.saturating_sub(1),
            KeyCode::Right => self.cursor.x = (self.cursor.x + 1).min(width - 1),
            KeyCode::Up => self.cursor.y = self.cursor.y.saturating_sub(1),
            KeyCode::Down => self.cursor.y = (self.cursor.y + 1).min(height - 1),
            KeyCode::Enter | KeyCode::Char(' ') => self.click(),
            KeyCode::Char('u') => {
                let text = if self.session.undo() {
                    "Move undone."
                } else {
                    "Nothing to undo."
                };
                self.set_message(text);
            }
            KeyCode::Char('g') => {
                let on = !self.session.settings().display_guide;
                self.session.set_display_guide(on);
                self.set_message(if on { "Move guides shown." } else { "Move guides hidden." });
            }
            KeyCode::Char('r') => {
                self.session.reset();
                self.set_message("New game started!");
            }
            _ => {}
        }
        self.session.hover(Some(self.cursor));
    }

    /// Select or move at the cursor
    fn click(&mut self) {
        match self.session.select_or_move(self.cursor) {
            SelectOutcome::Selected(_) | SelectOutcome::Unchanged => {
                self.message.borrow_mut().take();
            }
            SelectOutcome::Moved(outcome) => {
                if outcome.winner.is_some() {
                    // The observer has already written the result.
                    return;
                }
                if let Some(lock) = outcome.chain {
                    self.set_message(&format!("Keep jumping from {lock}!"));
                } else if !outcome.promoted.is_empty() {
                    self.set_message("Crowned!");
                } else if outcome.shrunk {
                    self.set_message("The board shrinks.");
                } else {
                    self.message.borrow_mut().take();
                }
            }
            SelectOutcome::Rejected(MoveError::GameOver) => {
                self.set_message("Game over! Press 'r' to restart.");
            }
            SelectOutcome::Rejected(MoveError::Illegal { .. }) => {
                self.set_message("Illegal move!");
            }
        }
    }

    fn set_message(&self, text: &str) {
        *self.message.borrow_mut() = Some(text.to_string());
    }

    /// Render the UI
    fn render(&self, frame: &mut ratatui::Frame) {
        super::game_view::render(
            frame,
            &self.session,
            self.cursor,
            &self.message.borrow(),
        );
    }
}
