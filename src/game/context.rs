//! Per-turn context handed to agents
//!
//! The context is the agent's only window onto the session: which turn it
//! is, whose turn it is, the shared event log, the session logger and the
//! animation surface.
//! The surface itself belongs to the rendering layer; the core only asks it
//! whether animations are playing and hands it to animated actions.

use crate::core::PlayerId;
use crate::game::{GameLogger, SharedEventLog, VerbosityLevel};
use crate::Result;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Handle to the rendering layer's animation surface
pub trait AnimationSurface: Send + Sync {
    /// Whether animated actions should run at all
    fn plays_animation(&self) -> bool;
}

/// Surface for headless sessions: never animates
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAnimation;

impl AnimationSurface for NoAnimation {
    fn plays_animation(&self) -> bool {
        false
    }
}

/// Surface whose animation switch can be flipped while the session runs
#[derive(Debug, Default)]
pub struct AnimationToggle {
    enabled: AtomicBool,
}

impl AnimationToggle {
    pub fn new(enabled: bool) -> Self {
        AnimationToggle {
            enabled: AtomicBool::new(enabled),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }
}

impl AnimationSurface for AnimationToggle {
    fn plays_animation(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }
}

/// Shared state for one turn
///
/// Cheap to clone; a fresh context is built by the scheduler for every turn.
#[derive(Clone)]
pub struct TurnContext {
    turn_number: u32,
    active_player: PlayerId,
    surface: Arc<dyn AnimationSurface>,
    events: SharedEventLog,
    logger: Arc<GameLogger>,
}

impl TurnContext {
    pub fn new(
        turn_number: u32,
        active_player: PlayerId,
        surface: Arc<dyn AnimationSurface>,
        events: SharedEventLog,
    ) -> Self {
        TurnContext {
            turn_number,
            active_player,
            surface,
            events,
            logger: Arc::new(GameLogger::with_verbosity(VerbosityLevel::Silent)),
        }
    }

    /// Log through `logger` instead of the default silent one
    pub fn with_logger(mut self, logger: Arc<GameLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Context with no animation surface and a fresh event log
    pub fn headless(turn_number: u32, active_player: PlayerId) -> Self {
        TurnContext::new(
            turn_number,
            active_player,
            Arc::new(NoAnimation),
            SharedEventLog::new(),
        )
    }

    pub fn turn_number(&self) -> u32 {
        self.turn_number
    }

    pub fn active_player(&self) -> PlayerId {
        self.active_player
    }

    pub fn events(&self) -> &SharedEventLog {
        &self.events
    }

    pub fn logger(&self) -> &GameLogger {
        &self.logger
    }

    pub fn plays_animation(&self) -> bool {
        self.surface.plays_animation()
    }

    /// Run an animated action and wait for it, if animations are playing
    ///
    /// With animations off this returns immediately without calling
    /// `action`, so nothing that affects game state may live inside it.
    /// Errors from the action propagate unchanged.
    pub async fn with_animation<F, Fut>(&self, action: F) -> Result<()>
    where
        F: FnOnce(Arc<dyn AnimationSurface>) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        if !self.surface.plays_animation() {
            return Ok(());
        }
        action(Arc::clone(&self.surface)).await
    }
}

impl std::fmt::Debug for TurnContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnContext")
            .field("turn_number", &self.turn_number)
            .field("active_player", &self.active_player)
            .field("plays_animation", &self.plays_animation())
            .finish()
    }
}
