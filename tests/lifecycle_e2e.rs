//! Session lifecycle and error surfacing

use duel_turns::core::{Action, CardId, PlayerId};
use duel_turns::game::{
    Agent, AutomatedAgent, EndReason, HumanAgent, HumanAgentState, RecordingRules, ScriptedPolicy,
    SessionConfig, TurnContext, TurnScheduler, VerbosityLevel, TURN_END_EVENT, TURN_START_EVENT,
};
use duel_turns::DuelError;
use similar_asserts::assert_eq;
use std::sync::Arc;

fn quiet() -> SessionConfig {
    SessionConfig::new()
        .with_animations(false)
        .with_verbosity(VerbosityLevel::Silent)
}

fn bot(player: PlayerId, script: Vec<Action>, rules: &Arc<RecordingRules>) -> Arc<AutomatedAgent> {
    Arc::new(AutomatedAgent::new(
        player,
        Box::new(ScriptedPolicy::new(script)),
        rules.clone(),
    ))
}

#[tokio::test]
async fn missing_seat_is_reported_at_start() {
    let rules = Arc::new(RecordingRules::new());
    let mut scheduler = TurnScheduler::new(quiet());
    scheduler
        .bind_agent(bot(PlayerId::Top, Vec::new(), &rules))
        .unwrap();

    match scheduler.start() {
        Err(DuelError::Configuration(message)) => assert!(message.contains("bottom")),
        other => panic!("expected configuration error, got {other:?}"),
    }
}

#[tokio::test]
async fn reentrant_human_turn_fails_fast() {
    let human = Arc::new(HumanAgent::new(PlayerId::Bottom));
    let ctx = TurnContext::headless(0, PlayerId::Bottom);

    let pending = {
        let human = human.clone();
        let ctx = ctx.clone();
        tokio::spawn(async move { human.run_one_turn(&ctx).await })
    };
    while human.state() != HumanAgentState::AwaitingEndTurn {
        tokio::task::yield_now().await;
    }

    let err = human.run_one_turn(&ctx).await.unwrap_err();
    assert!(matches!(err, DuelError::InvalidState(_)));

    human.on_end_turn_button_pressed(&ctx);
    pending.await.unwrap().unwrap();
    assert_eq!(human.state(), HumanAgentState::Idle);
}

#[tokio::test]
async fn all_automated_session_with_turn_events() {
    let rules = Arc::new(RecordingRules::new());
    let config = quiet()
        .with_initial_turn(1)
        .with_max_turns(4)
        .with_turn_events(true);
    let mut scheduler = TurnScheduler::new(config);
    scheduler
        .bind_agent(bot(
            PlayerId::Bottom,
            vec![Action::PlayCardFromHand(CardId::new(2))],
            &rules,
        ))
        .unwrap();
    scheduler
        .bind_agent(bot(
            PlayerId::Top,
            vec![Action::PlayCardFromHand(CardId::new(3))],
            &rules,
        ))
        .unwrap();
    scheduler.start().unwrap();

    let result = scheduler.run().await.unwrap();
    assert_eq!(result.end_reason, EndReason::TurnLimit);
    assert_eq!(result.turns_played, 4);
    assert_eq!(result.next_turn, 5);

    let log = scheduler.finish();
    let names: Vec<&str> = log
        .events(1, PlayerId::Bottom)
        .iter()
        .map(|e| e.as_str())
        .collect();
    assert_eq!(names, vec![TURN_START_EVENT, "played-card", TURN_END_EVENT]);
    assert!(log.has_event(2, PlayerId::Top, "played-card"));
    assert!(!log.has_event(3, PlayerId::Bottom, "played-card"));
    assert!(log.has_event(4, PlayerId::Top, TURN_END_EVENT));
}

#[tokio::test]
async fn snapshot_taken_mid_session_is_isolated() {
    let rules = Arc::new(RecordingRules::new());
    let mut scheduler = TurnScheduler::new(quiet().with_turn_events(true));
    scheduler
        .bind_agent(bot(PlayerId::Bottom, Vec::new(), &rules))
        .unwrap();
    scheduler
        .bind_agent(bot(PlayerId::Top, Vec::new(), &rules))
        .unwrap();
    scheduler.start().unwrap();

    scheduler.run_turn().await.unwrap();
    let snapshot = scheduler.event_log().snapshot();
    scheduler.run_turn().await.unwrap();

    assert!(snapshot.has_event(0, PlayerId::Bottom, TURN_END_EVENT));
    assert!(!snapshot.has_event(1, PlayerId::Top, TURN_START_EVENT));
    assert!(scheduler.event_log().has_event(1, PlayerId::Top, TURN_START_EVENT));
}
