//! duel-turns - turn scheduling for a two-player card game
//!
//! Each seat at the playing field is driven by an [`game::Agent`]: either a
//! human whose turn ends when the end-turn button is pressed, or an
//! automated agent that keeps acting until its decision policy runs dry.
//! The [`game::TurnScheduler`] hands control from one agent to the next and
//! owns the turn numbering and the session-wide [`game::EventLog`].

pub mod core;
pub mod error;
pub mod game;

pub use error::{DuelError, Result};
