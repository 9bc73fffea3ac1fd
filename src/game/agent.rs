//! Player agent trait
//!
//! This module defines the interface between the turn scheduler and the
//! things that control a seat (a human at the keyboard or an automated
//! player). The scheduler attaches each agent once, then calls
//! `run_one_turn` whenever that agent's seat is active and waits for it to
//! return before moving on.

use crate::core::PlayerId;
use crate::game::TurnContext;
use crate::{DuelError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};

/// Controller for one seat at the playing field
///
/// Methods take `&self` so that `on_end_turn_button_pressed` can be
/// delivered from the input layer while `run_one_turn` is suspended.
#[async_trait]
pub trait Agent: Send + Sync {
    /// The seat this agent controls
    fn controlled_player(&self) -> PlayerId;

    /// Short name for logs
    fn name(&self) -> &str;

    /// Called once when the agent joins a session, before any turn
    fn on_added_to_playing_field(&self, _ctx: &TurnContext) {}

    /// Called once when the agent leaves a session; must be safe even if
    /// no turn ever ran
    fn on_removed_from_playing_field(&self, _ctx: &TurnContext) {}

    /// Play one full turn, returning when the turn is over
    ///
    /// May suspend for as long as it likes. Calling this again before a
    /// previous call has completed fails with [`DuelError::InvalidState`].
    async fn run_one_turn(&self, ctx: &TurnContext) -> Result<()>;

    /// The user pressed the end-turn button. No-op for agents that do not
    /// wait on it.
    fn on_end_turn_button_pressed(&self, _ctx: &TurnContext) {}

    /// Whether the input layer should drop raw user input during this
    /// agent's turn
    fn suppresses_user_input(&self) -> bool;
}

/// Marks an agent as mid-turn for as long as it is alive
///
/// Entering fails if the agent is already mid-turn. Dropping the guard,
/// including when the turn future itself is dropped, clears the flag.
pub(crate) struct TurnInFlight<'a> {
    flag: &'a AtomicBool,
}

impl<'a> TurnInFlight<'a> {
    pub(crate) fn enter(flag: &'a AtomicBool, player: PlayerId) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| {
                DuelError::InvalidState(format!(
                    "agent for {player} is already running a turn"
                ))
            })?;
        Ok(TurnInFlight { flag })
    }
}

impl Drop for TurnInFlight<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
