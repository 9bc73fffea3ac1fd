//! Player seats

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two seats at the playing field
///
/// The bottom seat is the one nearest the local user; the top seat is the
/// opponent. Code that walks the seats should go through [`PlayerId::ALL`]
/// or [`PlayerId::turn_order`] instead of assuming exactly two members.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PlayerId {
    #[default]
    Bottom,
    Top,
}

impl PlayerId {
    /// All seats in their canonical order
    pub const ALL: [PlayerId; 2] = [PlayerId::Bottom, PlayerId::Top];

    /// The other seat
    pub fn opponent(self) -> PlayerId {
        match self {
            PlayerId::Bottom => PlayerId::Top,
            PlayerId::Top => PlayerId::Bottom,
        }
    }

    /// All seats, rotated so that `first` comes first
    pub fn turn_order(first: PlayerId) -> impl Iterator<Item = PlayerId> {
        let start = PlayerId::ALL
            .iter()
            .position(|&p| p == first)
            .unwrap_or(0);
        PlayerId::ALL
            .into_iter()
            .cycle()
            .skip(start)
            .take(PlayerId::ALL.len())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlayerId::Bottom => "bottom",
            PlayerId::Top => "top",
        }
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for PlayerId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bottom" | "p1" | "1" => Ok(PlayerId::Bottom),
            "top" | "p2" | "2" => Ok(PlayerId::Top),
            _ => Err(format!("invalid player '{s}' (expected: bottom/p1, top/p2)")),
        }
    }
}
