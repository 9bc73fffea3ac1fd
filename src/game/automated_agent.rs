//! Automated agent
//!
//! Each turn is a loop: pause to "think" (an animated delay that is skipped
//! when animations are off), ask the decision policy for the next action,
//! and hand that action to the rules engine. The turn ends as soon as the
//! policy has nothing left to do.

use crate::core::PlayerId;
use crate::game::agent::TurnInFlight;
use crate::game::config::DEFAULT_THINK_DELAY_MS;
use crate::game::{Agent, DecisionPolicy, RulesEngine, TurnContext, VerbosityLevel};
use crate::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

pub struct AutomatedAgent {
    player: PlayerId,
    policy: Mutex<Box<dyn DecisionPolicy>>,
    rules: Arc<dyn RulesEngine>,
    think_delay: Duration,
    in_turn: AtomicBool,
}

impl AutomatedAgent {
    pub fn new(
        player: PlayerId,
        policy: Box<dyn DecisionPolicy>,
        rules: Arc<dyn RulesEngine>,
    ) -> Self {
        AutomatedAgent {
            player,
            policy: Mutex::new(policy),
            rules,
            think_delay: Duration::from_millis(DEFAULT_THINK_DELAY_MS),
            in_turn: AtomicBool::new(false),
        }
    }

    /// Set the pause taken before each decision
    pub fn with_think_delay(mut self, delay: Duration) -> Self {
        self.think_delay = delay;
        self
    }

    pub fn think_delay(&self) -> Duration {
        self.think_delay
    }

    pub fn is_mid_turn(&self) -> bool {
        self.in_turn.load(Ordering::Acquire)
    }
}

#[async_trait]
impl Agent for AutomatedAgent {
    fn controlled_player(&self) -> PlayerId {
        self.player
    }

    fn name(&self) -> &str {
        "automated"
    }

    async fn run_one_turn(&self, ctx: &TurnContext) -> Result<()> {
        let _in_turn = TurnInFlight::enter(&self.in_turn, self.player)?;
        let delay = self.think_delay;

        loop {
            ctx.with_animation(|_surface| async move {
                tokio::time::sleep(delay).await;
                Ok(())
            })
            .await?;

            let next = self
                .policy
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .next_action(ctx, self.player)?;
            let Some(action) = next else {
                break;
            };
            self.rules.perform(ctx, self.player, &action).await?;
            ctx.logger().categorized(
                VerbosityLevel::Verbose,
                "agent_action",
                &format!("{}: {}", self.player, action),
            );
        }
        Ok(())
    }

    fn suppresses_user_input(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Action, CardId};
    use crate::game::{AnimationToggle, GameLogger, RecordingRules, ScriptedPolicy, SharedEventLog};
    use crate::DuelError;
    use std::sync::atomic::AtomicUsize;

    /// Policy that never acts, counting how often it was asked
    struct IdlePolicy {
        asked: Arc<AtomicUsize>,
    }

    impl DecisionPolicy for IdlePolicy {
        fn next_action(&mut self, _ctx: &TurnContext, _player: PlayerId) -> Result<Option<Action>> {
            self.asked.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }
    }

    struct FailingRules;

    /// Policy that fails on its first call and has nothing to do afterwards
    struct FailingPolicy {
        failed: bool,
    }

    impl DecisionPolicy for FailingPolicy {
        fn next_action(&mut self, _ctx: &TurnContext, _player: PlayerId) -> Result<Option<Action>> {
            if self.failed {
                return Ok(None);
            }
            self.failed = true;
            Err(DuelError::collaborator("decision layer unavailable"))
        }
    }

    #[async_trait]
    impl RulesEngine for FailingRules {
        async fn perform(&self, _ctx: &TurnContext, _p: PlayerId, _a: &Action) -> Result<()> {
            Err(DuelError::collaborator("card not in hand"))
        }
    }

    fn animated_context(enabled: bool) -> TurnContext {
        TurnContext::new(
            0,
            PlayerId::Top,
            Arc::new(AnimationToggle::new(enabled)),
            SharedEventLog::new(),
        )
    }

    fn play(card: u32) -> Action {
        Action::PlayCardFromHand(CardId::new(card))
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_action_ends_after_one_pause() {
        let asked = Arc::new(AtomicUsize::new(0));
        let rules = Arc::new(RecordingRules::new());
        let agent = AutomatedAgent::new(
            PlayerId::Top,
            Box::new(IdlePolicy {
                asked: asked.clone(),
            }),
            rules.clone(),
        )
        .with_think_delay(Duration::from_millis(100));
        let ctx = animated_context(true);

        let started = tokio::time::Instant::now();
        agent.run_one_turn(&ctx).await.unwrap();

        assert_eq!(asked.load(Ordering::SeqCst), 1);
        assert!(rules.performed().is_empty());
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(100) && elapsed < Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_plays_until_policy_is_empty() {
        let rules = Arc::new(RecordingRules::new());
        let agent = AutomatedAgent::new(
            PlayerId::Top,
            Box::new(ScriptedPolicy::new(vec![play(3), play(9)])),
            rules.clone(),
        )
        .with_think_delay(Duration::from_millis(100));
        let ctx = animated_context(true);

        let started = tokio::time::Instant::now();
        agent.run_one_turn(&ctx).await.unwrap();

        assert_eq!(rules.performed_by(PlayerId::Top), vec![play(3), play(9)]);
        // One pause before each of the two actions and one before giving up.
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(300) && elapsed < Duration::from_millis(400));
    }

    #[tokio::test(start_paused = true)]
    async fn test_animation_off_gives_same_actions() {
        let script = vec![play(1), play(2), play(3)];

        let animated_rules = Arc::new(RecordingRules::new());
        AutomatedAgent::new(
            PlayerId::Top,
            Box::new(ScriptedPolicy::new(script.clone())),
            animated_rules.clone(),
        )
        .run_one_turn(&animated_context(true))
        .await
        .unwrap();

        let instant_rules = Arc::new(RecordingRules::new());
        let started = tokio::time::Instant::now();
        AutomatedAgent::new(
            PlayerId::Top,
            Box::new(ScriptedPolicy::new(script)),
            instant_rules.clone(),
        )
        .run_one_turn(&animated_context(false))
        .await
        .unwrap();

        assert_eq!(started.elapsed(), Duration::ZERO);
        assert_eq!(animated_rules.performed(), instant_rules.performed());
    }

    #[tokio::test]
    async fn test_rules_failure_aborts_turn() {
        let agent = AutomatedAgent::new(
            PlayerId::Top,
            Box::new(ScriptedPolicy::new(vec![play(5)])),
            Arc::new(FailingRules),
        );
        let result = agent.run_one_turn(&animated_context(false)).await;
        assert!(matches!(result, Err(DuelError::Collaborator(_))));

        // The failed turn released the agent; the next turn can start.
        agent.run_one_turn(&animated_context(false)).await.unwrap();
    }

    #[tokio::test]
    async fn test_policy_failure_aborts_turn() {
        let rules = Arc::new(RecordingRules::new());
        let agent = AutomatedAgent::new(
            PlayerId::Bottom,
            Box::new(FailingPolicy { failed: false }),
            rules.clone(),
        );
        let result = agent.run_one_turn(&animated_context(false)).await;
        assert!(matches!(result, Err(DuelError::Collaborator(_))));
        assert!(!agent.is_mid_turn());

        agent.run_one_turn(&animated_context(false)).await.unwrap();
        assert!(rules.performed().is_empty());
    }

    #[tokio::test]
    async fn test_performed_actions_are_logged() {
        let mut logger = GameLogger::with_verbosity(VerbosityLevel::Verbose);
        logger.enable_capture();
        let logger = Arc::new(logger);
        let ctx = animated_context(false).with_logger(logger.clone());
        let agent = AutomatedAgent::new(
            PlayerId::Top,
            Box::new(ScriptedPolicy::new(vec![play(7), play(9)])),
            Arc::new(RecordingRules::new()),
        );

        agent.run_one_turn(&ctx).await.unwrap();

        let actions: Vec<String> = logger
            .logs()
            .iter()
            .filter(|e| e.category.as_deref() == Some("agent_action"))
            .map(|e| e.message.clone())
            .collect();
        assert_eq!(actions, vec!["top: play card 7", "top: play card 9"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reentrant_turn_is_invalid_state() {
        let agent = Arc::new(AutomatedAgent::new(
            PlayerId::Top,
            Box::new(ScriptedPolicy::new(vec![play(1)])),
            Arc::new(RecordingRules::new()),
        ));
        let ctx = animated_context(true);

        let first = {
            let agent = agent.clone();
            let ctx = ctx.clone();
            tokio::spawn(async move { agent.run_one_turn(&ctx).await })
        };
        while !agent.is_mid_turn() {
            tokio::task::yield_now().await;
        }

        let second = agent.run_one_turn(&ctx).await;
        assert!(matches!(second, Err(DuelError::InvalidState(_))));
        first.await.unwrap().unwrap();
    }

    #[test]
    fn test_suppresses_input_and_ignores_button() {
        let agent = AutomatedAgent::new(
            PlayerId::Bottom,
            Box::new(ScriptedPolicy::new(Vec::new())),
            Arc::new(RecordingRules::new()),
        );
        assert!(agent.suppresses_user_input());
        agent.on_end_turn_button_pressed(&TurnContext::headless(0, PlayerId::Bottom));
    }
}
