//! Terminal UI: a cursor-driven checkers board on top of a [`GameSession`].
//!
//! [`GameSession`]: crate::game::GameSession

mod app;
mod game_view;

pub use app::App;
