//! Scripted decision policy for testing and demos
//!
//! Follows a predetermined sequence of actions, then ends every turn
//! without acting.

use crate::core::{Action, PlayerId};
use crate::game::{DecisionPolicy, TurnContext};
use crate::Result;

/// A policy that plays back a fixed list of actions
pub struct ScriptedPolicy {
    actions: Vec<Action>,
    current_step: usize,
}

impl ScriptedPolicy {
    pub fn new(actions: Vec<Action>) -> Self {
        ScriptedPolicy {
            actions,
            current_step: 0,
        }
    }

    /// Actions not yet handed out
    pub fn remaining(&self) -> &[Action] {
        &self.actions[self.current_step..]
    }
}

impl DecisionPolicy for ScriptedPolicy {
    fn next_action(&mut self, _ctx: &TurnContext, _player: PlayerId) -> Result<Option<Action>> {
        let next = self.actions.get(self.current_step).cloned();
        if next.is_some() {
            self.current_step += 1;
        }
        Ok(next)
    }
}
