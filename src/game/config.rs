//! Session configuration
//!
//! Every field has a default, so a config file only needs the keys it
//! wants to change:
//!
//! ```json
//! { "first_player": "top", "animations": false, "max_turns": 40 }
//! ```

use crate::core::PlayerId;
use crate::game::{OutputFormat, VerbosityLevel};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default pause the automated agent takes before each action
pub const DEFAULT_THINK_DELAY_MS: u64 = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Number of the first turn played
    pub initial_turn: u32,
    /// Seat that takes the first turn
    pub first_player: PlayerId,
    /// Whether animated pauses are played at all
    pub animations: bool,
    /// Length of the automated agent's "thinking" pause
    pub think_delay_ms: u64,
    /// Stop after this many turns (None = run until the game ends or shutdown)
    pub max_turns: Option<u32>,
    /// Treat reaching `max_turns` as an error instead of a normal end
    pub strict_turn_limit: bool,
    /// Record "turn-start" / "turn-end" in the event log
    pub log_turn_events: bool,
    pub verbosity: VerbosityLevel,
    /// `text` or `json` (one object per line)
    pub log_format: OutputFormat,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            initial_turn: 0,
            first_player: PlayerId::Bottom,
            animations: true,
            think_delay_ms: DEFAULT_THINK_DELAY_MS,
            max_turns: None,
            strict_turn_limit: false,
            log_turn_events: false,
            verbosity: VerbosityLevel::Normal,
            log_format: OutputFormat::Text,
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        SessionConfig::default()
    }

    /// Load a config from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn with_initial_turn(mut self, turn: u32) -> Self {
        self.initial_turn = turn;
        self
    }

    pub fn with_first_player(mut self, player: PlayerId) -> Self {
        self.first_player = player;
        self
    }

    pub fn with_animations(mut self, enabled: bool) -> Self {
        self.animations = enabled;
        self
    }

    pub fn with_think_delay_ms(mut self, millis: u64) -> Self {
        self.think_delay_ms = millis;
        self
    }

    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = Some(max_turns);
        self
    }

    pub fn with_strict_turn_limit(mut self, strict: bool) -> Self {
        self.strict_turn_limit = strict;
        self
    }

    pub fn with_turn_events(mut self, enabled: bool) -> Self {
        self.log_turn_events = enabled;
        self
    }

    pub fn with_verbosity(mut self, verbosity: VerbosityLevel) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn with_log_format(mut self, format: OutputFormat) -> Self {
        self.log_format = format;
        self
    }

    pub fn think_delay(&self) -> Duration {
        Duration::from_millis(self.think_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.initial_turn, 0);
        assert_eq!(config.first_player, PlayerId::Bottom);
        assert!(config.animations);
        assert_eq!(config.think_delay(), Duration::from_millis(500));
        assert_eq!(config.max_turns, None);
        assert!(!config.log_turn_events);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SessionConfig::from_json_str(
            r#"{ "first_player": "top", "animations": false, "max_turns": 40 }"#,
        )
        .unwrap();
        assert_eq!(config.first_player, PlayerId::Top);
        assert!(!config.animations);
        assert_eq!(config.max_turns, Some(40));
        assert_eq!(config.think_delay_ms, DEFAULT_THINK_DELAY_MS);
        assert_eq!(config.verbosity, VerbosityLevel::Normal);
        assert_eq!(config.log_format, OutputFormat::Text);
    }

    #[test]
    fn test_log_format_from_json() {
        let config =
            SessionConfig::from_json_str(r#"{ "verbosity": "verbose", "log_format": "json" }"#)
                .unwrap();
        assert_eq!(config.verbosity, VerbosityLevel::Verbose);
        assert_eq!(config.log_format, OutputFormat::Json);
    }

    #[test]
    fn test_bad_json_is_config_error() {
        let err = SessionConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, crate::DuelError::ConfigError(_)));
    }

    #[test]
    fn test_builder() {
        let config = SessionConfig::new()
            .with_initial_turn(4)
            .with_first_player(PlayerId::Top)
            .with_animations(false)
            .with_think_delay_ms(10)
            .with_max_turns(8)
            .with_strict_turn_limit(true)
            .with_turn_events(true)
            .with_verbosity(VerbosityLevel::Silent);
        assert_eq!(config.initial_turn, 4);
        assert_eq!(config.max_turns, Some(8));
        assert!(config.strict_turn_limit);
        assert!(config.log_turn_events);
        assert_eq!(config.verbosity, VerbosityLevel::Silent);
    }
}
