//! Error types for duel-turns

use crate::core::PlayerId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DuelError {
    /// An operation was attempted in a state that does not allow it,
    /// e.g. `run_one_turn` on an agent that is already mid-turn.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The session is wired up incorrectly (missing agent, wrong seat, ...).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The rules, decision, or animation layer failed during a turn.
    #[error("Collaborator failure: {0}")]
    Collaborator(String),

    /// A human turn was still waiting for end-of-turn when its agent was detached.
    #[error("Turn for {0} was abandoned before it ended")]
    TurnAbandoned(PlayerId),

    #[error("Turn limit of {limit} exceeded")]
    TurnLimitExceeded { limit: u32 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigError(#[from] serde_json::Error),
}

impl DuelError {
    /// Wrap any displayable collaborator error
    pub fn collaborator(err: impl std::fmt::Display) -> Self {
        DuelError::Collaborator(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DuelError>;
