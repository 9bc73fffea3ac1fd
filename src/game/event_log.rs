//! Game-wide event log
//!
//! The event log does NOT record everything that happens in a game; by
//! default it records nothing at all. Cards and rules send events here when
//! they need to answer questions at a global level later on, such as "did
//! the top player destroy a minion during turn 4". State that is local to
//! a single card belongs on that card instead.

use crate::core::{EventName, PlayerId};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Point in the game an event is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventKey {
    pub turn_number: u32,
    pub player: PlayerId,
}

impl EventKey {
    pub fn new(turn_number: u32, player: PlayerId) -> Self {
        EventKey {
            turn_number,
            player,
        }
    }
}

/// Append-only record of named events keyed by (turn number, player)
///
/// Events under the same key keep their insertion order, duplicates
/// included. `Clone` produces a fully independent copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    events: FxHashMap<EventKey, SmallVec<[EventName; 2]>>,
}

impl EventLog {
    pub fn new() -> Self {
        EventLog::default()
    }

    /// Record `event` for the given turn and player
    pub fn log_event(&mut self, turn_number: u32, player: PlayerId, event: impl Into<EventName>) {
        self.events
            .entry(EventKey::new(turn_number, player))
            .or_default()
            .push(event.into());
    }

    /// Whether `event` was recorded for the given turn and player
    pub fn has_event(&self, turn_number: u32, player: PlayerId, event: &str) -> bool {
        self.events(turn_number, player)
            .iter()
            .any(|e| e.as_str() == event)
    }

    /// Events recorded for the given turn and player, in insertion order
    pub fn events(&self, turn_number: u32, player: PlayerId) -> &[EventName] {
        self.events
            .get(&EventKey::new(turn_number, player))
            .map(|list| list.as_slice())
            .unwrap_or(&[])
    }

    /// Total number of recorded events
    pub fn len(&self) -> usize {
        self.events.values().map(|list| list.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Iterate over every recorded event
    ///
    /// Keys come out in no particular order; events under one key keep
    /// their insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (EventKey, &EventName)> {
        self.events
            .iter()
            .flat_map(|(key, list)| list.iter().map(move |event| (*key, event)))
    }

    /// Every recorded event sorted by turn, then player
    pub fn sorted_entries(&self) -> Vec<(EventKey, EventName)> {
        let mut keys: Vec<_> = self.events.keys().copied().collect();
        keys.sort();
        keys.into_iter()
            .flat_map(|key| {
                self.events(key.turn_number, key.player)
                    .iter()
                    .cloned()
                    .map(move |event| (key, event))
            })
            .collect()
    }
}

/// Cloneable handle to the session's event log
///
/// The scheduler owns the session; agents and rules reach the log through
/// this handle on their [`crate::game::TurnContext`]. The lock is never held
/// across an await point.
#[derive(Debug, Clone, Default)]
pub struct SharedEventLog {
    inner: Arc<Mutex<EventLog>>,
}

impl SharedEventLog {
    pub fn new() -> Self {
        SharedEventLog::default()
    }

    fn lock(&self) -> MutexGuard<'_, EventLog> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn log_event(&self, turn_number: u32, player: PlayerId, event: impl Into<EventName>) {
        self.lock().log_event(turn_number, player, event);
    }

    pub fn has_event(&self, turn_number: u32, player: PlayerId, event: &str) -> bool {
        self.lock().has_event(turn_number, player, event)
    }

    pub fn events(&self, turn_number: u32, player: PlayerId) -> Vec<EventName> {
        self.lock().events(turn_number, player).to_vec()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Independent copy of the log as it is right now
    pub fn snapshot(&self) -> EventLog {
        self.lock().clone()
    }
}
