//! Core identifiers and value types

pub mod player;
pub mod types;

pub use player::PlayerId;
pub use types::{Action, CardId, EventName};
