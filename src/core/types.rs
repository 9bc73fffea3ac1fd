//! Strongly-typed wrappers for game concepts
//!
//! Newtypes keep card ids, event names and actions from being mixed up
//! with bare integers and strings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a card type that can be played from hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(u32);

impl CardId {
    pub fn new(id: u32) -> Self {
        CardId(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Name of a game-wide event recorded in the [`crate::game::EventLog`]
///
/// Examples: "turn-start", "played-card", "destroyed-minion"
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventName(String);

impl EventName {
    pub fn new(s: impl Into<String>) -> Self {
        EventName(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for EventName {
    fn from(s: String) -> Self {
        EventName(s)
    }
}

impl From<&str> for EventName {
    fn from(s: &str) -> Self {
        EventName(s.to_string())
    }
}

/// An action an agent asks the rules layer to carry out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Play a card of the given type from the acting player's hand
    PlayCardFromHand(CardId),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::PlayCardFromHand(card) => write!(f, "play card {card}"),
        }
    }
}
