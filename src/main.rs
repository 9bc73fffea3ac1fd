//! duel - terminal front end for the turn scheduler
//!
//! Seats a human or an automated agent at each side of the playing field
//! and runs turns until the turn limit, `q` on stdin, or Ctrl-C.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use duel_turns::{
    core::{CardId, PlayerId},
    game::{
        Agent, AutomatedAgent, HumanAgent, InputRouter, OutputFormat, RandomHandPolicy,
        RecordingRules, SessionConfig, TurnContext, TurnHooks, TurnScheduler, VerbosityLevel,
    },
};
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Notify;

/// Largest hand an automated seat can hold; keeps the two seats' card ids apart
const MAX_HAND_SIZE: i64 = 99;

/// Agent type for a seat
#[derive(Debug, Clone, Copy, ValueEnum)]
enum AgentType {
    /// Turn ends when Enter is pressed
    Human,
    /// Plays random cards from its hand after a short pause
    Automated,
}

#[derive(Parser)]
#[command(name = "duel")]
#[command(about = "Turn scheduler for a two-player card game", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a session in the terminal
    Play {
        /// JSON session config; flags below override it
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Agent for the bottom seat
        #[arg(long, value_enum, default_value = "automated")]
        p1: AgentType,

        /// Agent for the top seat
        #[arg(long, value_enum, default_value = "human")]
        p2: AgentType,

        /// Seat that plays first (bottom/p1 or top/p2)
        #[arg(long)]
        first: Option<PlayerId>,

        /// Random seed for deterministic automated play
        #[arg(long)]
        seed: Option<u64>,

        /// Cards in each automated agent's starting hand (at most 99)
        #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(0..=MAX_HAND_SIZE))]
        hand_size: u32,

        /// Cards an automated agent plays per turn
        #[arg(long, default_value_t = 1)]
        cards_per_turn: usize,

        /// Stop after this many turns
        #[arg(long)]
        max_turns: Option<u32>,

        /// Skip animated pauses entirely
        #[arg(long)]
        no_animations: bool,

        /// Automated agent "thinking" pause in milliseconds
        #[arg(long)]
        think_ms: Option<u64>,

        /// Verbosity level for session output (0=silent, 1=minimal, 2=normal, 3=verbose)
        #[arg(long, short = 'v')]
        verbosity: Option<VerbosityLevel>,

        /// Record turn-start / turn-end in the event log
        #[arg(long)]
        log_turn_events: bool,

        /// Session log output (text or json, one object per line)
        #[arg(long)]
        log_format: Option<OutputFormat>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Play {
            config,
            p1,
            p2,
            first,
            seed,
            hand_size,
            cards_per_turn,
            max_turns,
            no_animations,
            think_ms,
            verbosity,
            log_turn_events,
            log_format,
        } => {
            let mut session = match config {
                Some(path) => SessionConfig::from_json_file(&path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => SessionConfig::default(),
            };
            if let Some(first) = first {
                session.first_player = first;
            }
            if let Some(max_turns) = max_turns {
                session.max_turns = Some(max_turns);
            }
            if no_animations {
                session.animations = false;
            }
            if let Some(think_ms) = think_ms {
                session.think_delay_ms = think_ms;
            }
            if let Some(verbosity) = verbosity {
                session.verbosity = verbosity;
            }
            session.log_turn_events |= log_turn_events;
            if let Some(log_format) = log_format {
                session.log_format = log_format;
            }

            let seats = SeatPlan {
                bottom: p1,
                top: p2,
                seed,
                hand_size,
                cards_per_turn,
            };
            run_play(session, seats).await?
        }
    }

    Ok(())
}

struct SeatPlan {
    bottom: AgentType,
    top: AgentType,
    seed: Option<u64>,
    hand_size: u32,
    cards_per_turn: usize,
}

impl SeatPlan {
    fn agent_type(&self, player: PlayerId) -> AgentType {
        match player {
            PlayerId::Bottom => self.bottom,
            PlayerId::Top => self.top,
        }
    }

    fn build_agent(
        &self,
        player: PlayerId,
        config: &SessionConfig,
        rules: &Arc<RecordingRules>,
    ) -> Arc<dyn Agent> {
        match self.agent_type(player) {
            AgentType::Human => Arc::new(HumanAgent::new(player)),
            AgentType::Automated => {
                // Card ids 1..=99 for the bottom seat, 101..=199 for the top seat.
                let offset: u32 = match player {
                    PlayerId::Bottom => 0,
                    PlayerId::Top => 100,
                };
                let hand: Vec<CardId> = (1..=self.hand_size)
                    .map(|n| CardId::new(offset + n))
                    .collect();
                let policy = match self.seed {
                    Some(seed) => RandomHandPolicy::with_seed(
                        hand,
                        self.cards_per_turn,
                        seed.wrapping_add(u64::from(offset)),
                    ),
                    None => RandomHandPolicy::new(hand, self.cards_per_turn),
                };
                Arc::new(
                    AutomatedAgent::new(player, Box::new(policy), rules.clone())
                        .with_think_delay(config.think_delay()),
                )
            }
        }
    }

    fn has_human(&self) -> bool {
        matches!(self.bottom, AgentType::Human) || matches!(self.top, AgentType::Human)
    }

    /// Cards held by automated agents at the start of the session
    fn automated_cards(&self) -> usize {
        PlayerId::ALL
            .into_iter()
            .filter(|&p| matches!(self.agent_type(p), AgentType::Automated))
            .count()
            * self.hand_size as usize
    }
}

/// Ends an all-automated session once every hand has been played out
struct HandsPlayedOut {
    rules: Arc<RecordingRules>,
    total_cards: usize,
}

impl TurnHooks for HandsPlayedOut {
    fn is_game_over(&self, _ctx: &TurnContext) -> bool {
        self.rules.performed().len() >= self.total_cards
    }
}

/// Read stdin on a plain thread: Enter ends the human turn, `q` quits
///
/// A detached thread rather than a runtime task, so a pending read never
/// holds up process exit.
fn spawn_stdin_reader(input: InputRouter, quit: Arc<Notify>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().eq_ignore_ascii_case("q") {
                break;
            }
            if input.suppresses_user_input() {
                continue;
            }
            input.end_turn_pressed();
        }
        quit.notify_one();
    });
}

async fn run_play(config: SessionConfig, seats: SeatPlan) -> anyhow::Result<()> {
    let rules = Arc::new(RecordingRules::new());
    let mut scheduler = TurnScheduler::new(config.clone());
    if !seats.has_human() {
        scheduler = scheduler.with_hooks(Arc::new(HandsPlayedOut {
            rules: Arc::clone(&rules),
            total_cards: seats.automated_cards(),
        }));
    }
    for player in PlayerId::ALL {
        scheduler.bind_agent(seats.build_agent(player, &config, &rules))?;
    }
    scheduler.start().context("starting session")?;

    let quit = Arc::new(Notify::new());
    if seats.has_human() {
        if config.verbosity >= VerbosityLevel::Minimal {
            println!("Press Enter to end your turn, q then Enter to quit.");
        }
        spawn_stdin_reader(scheduler.input_handle(), Arc::clone(&quit));
    }

    let shutdown = async {
        tokio::select! {
            _ = quit.notified() => {}
            _ = tokio::signal::ctrl_c() => {}
        }
    };
    let result = scheduler.run_until(shutdown).await?;

    let log = scheduler.finish();
    if config.verbosity >= VerbosityLevel::Normal {
        println!(
            "\n{} turns played, ended by {:?}",
            result.turns_played, result.end_reason
        );
        for performed in rules.performed() {
            println!(
                "  turn {:>3} {:>6}: {}",
                performed.turn_number, performed.player, performed.action
            );
        }
        if !log.is_empty() {
            println!("Event log:");
            for (key, event) in log.sorted_entries() {
                println!("  turn {:>3} {:>6}: {}", key.turn_number, key.player, event);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(hand_size: u32, seed: Option<u64>) -> SeatPlan {
        SeatPlan {
            bottom: AgentType::Automated,
            top: AgentType::Automated,
            seed,
            hand_size,
            cards_per_turn: 1,
        }
    }

    #[test]
    fn test_hand_size_is_bounded() {
        assert!(Cli::try_parse_from(["duel", "play", "--hand-size", "99"]).is_ok());
        assert!(Cli::try_parse_from(["duel", "play", "--hand-size", "100"]).is_err());
        assert!(Cli::try_parse_from(["duel", "play", "--hand-size", "4294967295"]).is_err());
    }

    #[test]
    fn test_log_format_flag() {
        let cli = Cli::try_parse_from(["duel", "play", "--log-format", "json"]).unwrap();
        let Commands::Play { log_format, .. } = cli.command;
        assert_eq!(log_format, Some(OutputFormat::Json));
        assert!(Cli::try_parse_from(["duel", "play", "--log-format", "xml"]).is_err());
    }

    #[test]
    fn test_max_seed_builds_both_seats() {
        let seats = plan(99, Some(u64::MAX));
        let config = SessionConfig::default();
        let rules = Arc::new(RecordingRules::new());
        for player in PlayerId::ALL {
            let agent = seats.build_agent(player, &config, &rules);
            assert_eq!(agent.controlled_player(), player);
        }
        assert_eq!(seats.automated_cards(), 198);
    }
}
