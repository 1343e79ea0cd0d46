//! # Checkers Engine
//!
//! A checkers rules engine with regular, reverse (shrinking board) and
//! forced-capture variants, plus a terminal front end built with Ratatui.
//!
//! ## Modules
//!
//! - [`game`] — Core game logic: board, cells, move generation, session state machine
//! - [`ui`] — Terminal UI: cursor-driven game view
//! - [`config`] — TOML configuration loading and validation
//! - [`error`] — Structured error types

pub mod config;
pub mod error;
pub mod game;
pub mod ui;
