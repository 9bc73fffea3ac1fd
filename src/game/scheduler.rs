//! Turn scheduler
//!
//! Owns the session: which agent sits at which seat, the turn counter, the
//! seat whose turn it is, and the session's event log. Each turn it builds
//! a fresh [`TurnContext`], hands it to the active agent and waits for
//! `run_one_turn` to finish before moving on to the next seat.

/// Macro for conditional logging that avoids allocation when feature is disabled
///
/// When verbose-logging feature is disabled, this becomes a no-op at compile time,
/// eliminating the format! allocations for per-turn banners.
macro_rules! log_if_verbose {
    ($self:expr, $($arg:tt)*) => {
        #[cfg(feature = "verbose-logging")]
        {
            $self.logger.normal(&format!($($arg)*));
        }
        #[cfg(not(feature = "verbose-logging"))]
        {
            let _ = &$self; // Suppress unused variable warning
        }
    };
}

use crate::core::PlayerId;
use crate::game::{
    Agent, AnimationSurface, AnimationToggle, EventLog, GameLogger, NoHooks, SessionConfig,
    SharedEventLog, TurnContext, TurnHooks, VerbosityLevel,
};
use crate::{DuelError, Result};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Event recorded when `log_turn_events` is on and a turn begins
pub const TURN_START_EVENT: &str = "turn-start";
/// Event recorded when `log_turn_events` is on and a turn ends
pub const TURN_END_EVENT: &str = "turn-end";

/// Why a session stopped running turns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The turn hooks reported the game over
    GameOver,
    /// The shutdown future passed to `run_until` completed
    Shutdown,
    /// `max_turns` turns were played
    TurnLimit,
}

/// Outcome of [`TurnScheduler::run_until`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResult {
    /// Turns completed by this scheduler
    pub turns_played: u32,
    /// Number the next turn would have had
    pub next_turn: u32,
    pub end_reason: EndReason,
}

/// One completed turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnRecord {
    pub turn_number: u32,
    pub player: PlayerId,
}

struct ActiveTurn {
    agent: Arc<dyn Agent>,
    context: TurnContext,
}

type ActiveSlot = Arc<Mutex<Option<ActiveTurn>>>;

fn lock_slot(slot: &ActiveSlot) -> MutexGuard<'_, Option<ActiveTurn>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clears the active-turn slot when a turn finishes, fails, or is dropped
struct ActiveTurnGuard<'a> {
    slot: &'a ActiveSlot,
}

impl Drop for ActiveTurnGuard<'_> {
    fn drop(&mut self) {
        lock_slot(self.slot).take();
    }
}

/// Entry point for the input layer
///
/// Cloneable and usable from any task while a turn is suspended. Input is
/// only ever forwarded to the agent whose turn is in progress.
#[derive(Clone)]
pub struct InputRouter {
    active: ActiveSlot,
}

impl InputRouter {
    /// Forward an end-turn press to the active agent
    ///
    /// Returns false when no turn is in progress.
    pub fn end_turn_pressed(&self) -> bool {
        let target = lock_slot(&self.active)
            .as_ref()
            .map(|turn| (Arc::clone(&turn.agent), turn.context.clone()));
        match target {
            Some((agent, context)) => {
                agent.on_end_turn_button_pressed(&context);
                true
            }
            None => false,
        }
    }

    /// Whether raw user input should be dropped right now
    pub fn suppresses_user_input(&self) -> bool {
        lock_slot(&self.active)
            .as_ref()
            .map(|turn| turn.agent.suppresses_user_input())
            .unwrap_or(false)
    }

    /// Seat whose turn is in progress, if any
    pub fn active_player(&self) -> Option<PlayerId> {
        lock_slot(&self.active)
            .as_ref()
            .map(|turn| turn.context.active_player())
    }
}

pub struct TurnScheduler {
    config: SessionConfig,
    turn_number: u32,
    active_player: PlayerId,
    turn_order: SmallVec<[PlayerId; 2]>,
    agents: FxHashMap<PlayerId, Arc<dyn Agent>>,
    surface: Arc<dyn AnimationSurface>,
    hooks: Arc<dyn TurnHooks>,
    events: SharedEventLog,
    logger: Arc<GameLogger>,
    started: bool,
    turns_played: u32,
    active: ActiveSlot,
}

impl TurnScheduler {
    pub fn new(config: SessionConfig) -> Self {
        let mut logger = GameLogger::with_verbosity(config.verbosity);
        logger.set_output_format(config.log_format);
        TurnScheduler {
            turn_number: config.initial_turn,
            active_player: config.first_player,
            turn_order: PlayerId::turn_order(config.first_player).collect(),
            agents: FxHashMap::default(),
            surface: Arc::new(AnimationToggle::new(config.animations)),
            hooks: Arc::new(NoHooks),
            events: SharedEventLog::new(),
            logger: Arc::new(logger),
            started: false,
            turns_played: 0,
            active: Arc::new(Mutex::new(None)),
            config,
        }
    }

    /// Use the rendering layer's animation surface
    ///
    /// With `animations` off in the config the surface is ignored and every
    /// animated action is skipped.
    pub fn with_surface(mut self, surface: Arc<dyn AnimationSurface>) -> Self {
        if self.config.animations {
            self.surface = surface;
        }
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn TurnHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_logger(mut self, logger: GameLogger) -> Self {
        self.logger = Arc::new(logger);
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn turn_number(&self) -> u32 {
        self.turn_number
    }

    pub fn active_player(&self) -> PlayerId {
        self.active_player
    }

    pub fn turns_played(&self) -> u32 {
        self.turns_played
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn event_log(&self) -> &SharedEventLog {
        &self.events
    }

    pub fn logger(&self) -> &GameLogger {
        &self.logger
    }

    pub fn input_handle(&self) -> InputRouter {
        InputRouter {
            active: Arc::clone(&self.active),
        }
    }

    pub fn agent(&self, player: PlayerId) -> Option<&Arc<dyn Agent>> {
        self.agents.get(&player)
    }

    fn context_for(&self, player: PlayerId) -> TurnContext {
        TurnContext::new(
            self.turn_number,
            player,
            Arc::clone(&self.surface),
            self.events.clone(),
        )
        .with_logger(Arc::clone(&self.logger))
    }

    fn next_player(&self) -> PlayerId {
        let index = self
            .turn_order
            .iter()
            .position(|&p| p == self.active_player)
            .unwrap_or(0);
        self.turn_order[(index + 1) % self.turn_order.len()]
    }

    /// Seat `agent` at the player it controls
    ///
    /// On a started session this swaps agents: the previous one (if any) is
    /// detached and the new one attached immediately. Otherwise attachment
    /// happens in [`TurnScheduler::start`].
    pub fn bind_agent(&mut self, agent: Arc<dyn Agent>) -> Result<()> {
        let player = agent.controlled_player();
        if !self.turn_order.contains(&player) {
            return Err(DuelError::Configuration(format!(
                "{player} does not have a seat in this session"
            )));
        }

        let ctx = self.context_for(self.active_player);
        if self.started {
            if let Some(previous) = self.agents.get(&player) {
                previous.on_removed_from_playing_field(&ctx);
                self.logger.categorized(
                    VerbosityLevel::Verbose,
                    "agent",
                    &format!("Detached {} agent from {player}", previous.name()),
                );
            }
            agent.on_added_to_playing_field(&ctx);
            self.logger.categorized(
                VerbosityLevel::Verbose,
                "agent",
                &format!("Attached {} agent to {player}", agent.name()),
            );
        }
        self.agents.insert(player, agent);
        Ok(())
    }

    fn resolve_agent(&self, player: PlayerId) -> Result<Arc<dyn Agent>> {
        self.agents
            .get(&player)
            .cloned()
            .ok_or_else(|| DuelError::Configuration(format!("no agent bound for {player}")))
    }

    /// Attach every agent and open the session
    ///
    /// Fails with a configuration error if any seat has no agent.
    pub fn start(&mut self) -> Result<()> {
        if self.started {
            return Err(DuelError::InvalidState("session already started".to_string()));
        }
        for &player in &self.turn_order {
            self.resolve_agent(player)?;
        }

        let ctx = self.context_for(self.active_player);
        for player in &self.turn_order {
            let agent = &self.agents[player];
            agent.on_added_to_playing_field(&ctx);
            self.logger.categorized(
                VerbosityLevel::Verbose,
                "agent",
                &format!("Attached {} agent to {player}", agent.name()),
            );
        }
        self.started = true;
        self.logger.minimal(&format!(
            "Session started at turn {} with {} to play",
            self.turn_number, self.active_player
        ));
        Ok(())
    }

    /// Run exactly one turn for the active seat and advance
    ///
    /// A turn that fails (or is dropped) is not counted and is attempted
    /// again by the next call. `"turn-start"` is recorded once per turn even
    /// when it takes several attempts.
    pub async fn run_turn(&mut self) -> Result<TurnRecord> {
        if !self.started {
            return Err(DuelError::Configuration(
                "session not started; agents have not been attached".to_string(),
            ));
        }
        let player = self.active_player;
        let turn_number = self.turn_number;
        let (Some(next_turn), Some(turns_played)) = (
            turn_number.checked_add(1),
            self.turns_played.checked_add(1),
        ) else {
            return Err(DuelError::InvalidState(format!(
                "turn counter exhausted at turn {turn_number}"
            )));
        };
        let agent = self.resolve_agent(player)?;
        let ctx = self.context_for(player);

        log_if_verbose!(self, "Turn {} - {} ({})", turn_number, player, agent.name());
        self.hooks.before_turn(&ctx).await?;
        if self.config.log_turn_events
            && !self.events.has_event(turn_number, player, TURN_START_EVENT)
        {
            self.events.log_event(turn_number, player, TURN_START_EVENT);
        }
        {
            *lock_slot(&self.active) = Some(ActiveTurn {
                agent: Arc::clone(&agent),
                context: ctx.clone(),
            });
            let _active = ActiveTurnGuard { slot: &self.active };
            agent.run_one_turn(&ctx).await?;
        }
        self.hooks.after_turn(&ctx).await?;

        if self.config.log_turn_events {
            self.events.log_event(turn_number, player, TURN_END_EVENT);
        }
        self.logger.categorized(
            VerbosityLevel::Verbose,
            "turn",
            &format!("Turn {turn_number} ended for {player}"),
        );

        self.active_player = self.next_player();
        self.turn_number = next_turn;
        self.turns_played = turns_played;
        Ok(TurnRecord {
            turn_number,
            player,
        })
    }

    /// Run up to `count` turns, stopping early if the game ends
    pub async fn run_turns(&mut self, count: u32) -> Result<Vec<TurnRecord>> {
        let mut records = Vec::new();
        for _ in 0..count {
            if self.game_over() {
                break;
            }
            records.push(self.run_turn().await?);
        }
        Ok(records)
    }

    fn game_over(&self) -> bool {
        self.hooks
            .is_game_over(&self.context_for(self.active_player))
    }

    fn result(&self, end_reason: EndReason) -> SessionResult {
        SessionResult {
            turns_played: self.turns_played,
            next_turn: self.turn_number,
            end_reason,
        }
    }

    /// Run turns until the game ends, the turn limit is hit, or `shutdown`
    /// completes
    ///
    /// A turn in progress when `shutdown` fires is dropped, not finished;
    /// the turn counter stays on that turn.
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<SessionResult>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        loop {
            if self.game_over() {
                self.logger.minimal(&format!(
                    "Game over after {} turns",
                    self.turns_played
                ));
                return Ok(self.result(EndReason::GameOver));
            }
            if let Some(limit) = self.config.max_turns {
                if self.turns_played >= limit {
                    if self.config.strict_turn_limit {
                        return Err(DuelError::TurnLimitExceeded { limit });
                    }
                    self.logger
                        .minimal(&format!("Turn limit of {limit} reached"));
                    return Ok(self.result(EndReason::TurnLimit));
                }
            }

            let step = tokio::select! {
                biased;
                _ = &mut shutdown => None,
                record = self.run_turn() => Some(record),
            };
            match step {
                Some(record) => {
                    record?;
                }
                None => {
                    self.logger.minimal(&format!(
                        "Session shut down during turn {}",
                        self.turn_number
                    ));
                    return Ok(self.result(EndReason::Shutdown));
                }
            }
        }
    }

    /// Run until the game ends or the turn limit is hit
    pub async fn run(&mut self) -> Result<SessionResult> {
        self.run_until(std::future::pending()).await
    }

    /// Detach every agent and hand back the final event log
    pub fn finish(self) -> EventLog {
        if self.started {
            let ctx = self.context_for(self.active_player);
            for player in &self.turn_order {
                if let Some(agent) = self.agents.get(player) {
                    agent.on_removed_from_playing_field(&ctx);
                    self.logger.categorized(
                        VerbosityLevel::Verbose,
                        "agent",
                        &format!("Detached {} agent from {player}", agent.name()),
                    );
                }
            }
            self.logger.minimal(&format!(
                "Session finished after {} turns",
                self.turns_played
            ));
        }
        self.events.snapshot()
    }
}
