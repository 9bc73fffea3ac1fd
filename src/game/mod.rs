//! Turn-taking machinery: agents, turn context, event log, scheduler

pub mod agent;
pub mod automated_agent;
pub mod config;
pub mod context;
pub mod event_log;
pub mod human_agent;
pub mod logger;
pub mod random_policy;
pub mod rules;
pub mod scheduler;
pub mod scripted_policy;

pub use agent::Agent;
pub use automated_agent::AutomatedAgent;
pub use config::SessionConfig;
pub use context::{AnimationSurface, AnimationToggle, NoAnimation, TurnContext};
pub use event_log::{EventKey, EventLog, SharedEventLog};
pub use human_agent::{HumanAgent, HumanAgentState};
pub use logger::{GameLogger, LogEntry, OutputFormat, OutputMode, VerbosityLevel};
pub use random_policy::RandomHandPolicy;
pub use rules::{
    DecisionPolicy, NoHooks, PerformedAction, RecordingRules, RulesEngine, TurnHooks,
    PLAYED_CARD_EVENT,
};
pub use scheduler::{
    EndReason, InputRouter, SessionResult, TurnRecord, TurnScheduler, TURN_END_EVENT,
    TURN_START_EVENT,
};
pub use scripted_policy::ScriptedPolicy;
