//! Agent driven by a human at the controls
//!
//! A human turn lasts until the end-turn button is pressed. The agent is a
//! two-state machine: `Idle` between turns, `AwaitingEndTurn` while a turn
//! is in progress. Each turn owns a single oneshot channel; pressing the
//! button takes the sender out and fires it, so later presses in the same
//! turn find nothing to fire.

use crate::core::PlayerId;
use crate::game::{Agent, TurnContext};
use crate::{DuelError, Result};
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;

/// Observable state of a [`HumanAgent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HumanAgentState {
    Idle,
    AwaitingEndTurn,
}

enum TurnState {
    Idle,
    AwaitingEndTurn {
        /// Taken (set to None) by the first press
        end_of_turn: Option<oneshot::Sender<()>>,
    },
}

pub struct HumanAgent {
    player: PlayerId,
    state: Mutex<TurnState>,
}

impl HumanAgent {
    pub fn new(player: PlayerId) -> Self {
        HumanAgent {
            player,
            state: Mutex::new(TurnState::Idle),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, TurnState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> HumanAgentState {
        match *self.lock_state() {
            TurnState::Idle => HumanAgentState::Idle,
            TurnState::AwaitingEndTurn { .. } => HumanAgentState::AwaitingEndTurn,
        }
    }

    /// Fire and drop the pending end-of-turn sender, if any
    fn take_end_of_turn(&self) -> Option<oneshot::Sender<()>> {
        match &mut *self.lock_state() {
            TurnState::AwaitingEndTurn { end_of_turn } => end_of_turn.take(),
            TurnState::Idle => None,
        }
    }
}

/// Puts the agent back to Idle when the turn future finishes or is dropped
struct ReturnToIdle<'a> {
    state: &'a Mutex<TurnState>,
}

impl Drop for ReturnToIdle<'_> {
    fn drop(&mut self) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = TurnState::Idle;
    }
}

#[async_trait]
impl Agent for HumanAgent {
    fn controlled_player(&self) -> PlayerId {
        self.player
    }

    fn name(&self) -> &str {
        "human"
    }

    fn on_removed_from_playing_field(&self, _ctx: &TurnContext) {
        // Dropping the sender wakes a suspended turn with TurnAbandoned.
        drop(self.take_end_of_turn());
    }

    async fn run_one_turn(&self, _ctx: &TurnContext) -> Result<()> {
        let end_of_turn = {
            let mut state = self.lock_state();
            if let TurnState::AwaitingEndTurn { .. } = *state {
                return Err(DuelError::InvalidState(format!(
                    "human agent for {} is already awaiting end of turn",
                    self.player
                )));
            }
            let (sender, receiver) = oneshot::channel();
            *state = TurnState::AwaitingEndTurn {
                end_of_turn: Some(sender),
            };
            receiver
        };
        let _idle = ReturnToIdle { state: &self.state };

        end_of_turn
            .await
            .map_err(|_| DuelError::TurnAbandoned(self.player))
    }

    fn on_end_turn_button_pressed(&self, _ctx: &TurnContext) {
        if let Some(sender) = self.take_end_of_turn() {
            // The receiver only goes away with a dropped turn; nothing to wake then.
            let _ = sender.send(());
        }
    }

    fn suppresses_user_input(&self) -> bool {
        false
    }
}
