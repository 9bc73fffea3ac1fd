//! Collaborators the turn machinery calls out to
//!
//! The card rules themselves live outside this crate. Agents and the
//! scheduler only see them through these traits: a decision policy that
//! proposes the next action, a rules engine that carries actions out, and
//! hooks that run around every turn.

use crate::core::{Action, PlayerId};
use crate::game::TurnContext;
use crate::Result;
use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};

/// Event the recording rules engine logs for every card played
pub const PLAYED_CARD_EVENT: &str = "played-card";

/// Chooses what an automated agent does next
///
/// Returning `Ok(None)` ends the agent's turn.
pub trait DecisionPolicy: Send {
    fn next_action(&mut self, ctx: &TurnContext, player: PlayerId) -> Result<Option<Action>>;
}

/// Carries out actions against the game
#[async_trait]
pub trait RulesEngine: Send + Sync {
    async fn perform(&self, ctx: &TurnContext, player: PlayerId, action: &Action) -> Result<()>;
}

/// Hooks the scheduler runs around every agent turn
#[async_trait]
pub trait TurnHooks: Send + Sync {
    /// Runs before the active agent gets control
    async fn before_turn(&self, _ctx: &TurnContext) -> Result<()> {
        Ok(())
    }

    /// Runs after the active agent has finished its turn
    async fn after_turn(&self, _ctx: &TurnContext) -> Result<()> {
        Ok(())
    }

    /// Checked before each turn; `true` ends the session
    fn is_game_over(&self, _ctx: &TurnContext) -> bool {
        false
    }
}

/// Hooks that do nothing and never end the game
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl TurnHooks for NoHooks {}

/// One action performed through [`RecordingRules`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerformedAction {
    pub turn_number: u32,
    pub player: PlayerId,
    pub action: Action,
}

/// Rules engine that accepts every action and remembers it
///
/// Each performed action is also logged as [`PLAYED_CARD_EVENT`] in the
/// session's event log.
#[derive(Debug, Default)]
pub struct RecordingRules {
    performed: Mutex<Vec<PerformedAction>>,
}

impl RecordingRules {
    pub fn new() -> Self {
        RecordingRules::default()
    }

    /// Every action performed so far, in order
    pub fn performed(&self) -> Vec<PerformedAction> {
        self.performed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn performed_by(&self, player: PlayerId) -> Vec<Action> {
        self.performed()
            .into_iter()
            .filter(|p| p.player == player)
            .map(|p| p.action)
            .collect()
    }
}

#[async_trait]
impl RulesEngine for RecordingRules {
    async fn perform(&self, ctx: &TurnContext, player: PlayerId, action: &Action) -> Result<()> {
        self.performed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(PerformedAction {
                turn_number: ctx.turn_number(),
                player,
                action: action.clone(),
            });
        ctx.events()
            .log_event(ctx.turn_number(), player, PLAYED_CARD_EVENT);
        Ok(())
    }
}
