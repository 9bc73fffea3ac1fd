//! Random decision policy for demos and baseline play
//!
//! Plays random cards out of a fixed hand, a limited number per turn,
//! until the hand is empty.

use crate::core::{Action, CardId, PlayerId};
use crate::game::{DecisionPolicy, TurnContext};
use crate::Result;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub struct RandomHandPolicy {
    hand: Vec<CardId>,
    cards_per_turn: usize,
    /// (turn number, cards played in it)
    played_this_turn: Option<(u32, usize)>,
    rng: ChaCha8Rng,
}

impl RandomHandPolicy {
    /// Create a policy with an entropy-seeded RNG
    pub fn new(hand: Vec<CardId>, cards_per_turn: usize) -> Self {
        Self::with_rng(hand, cards_per_turn, ChaCha8Rng::from_entropy())
    }

    /// Create a policy with a seeded RNG (for deterministic testing)
    pub fn with_seed(hand: Vec<CardId>, cards_per_turn: usize, seed: u64) -> Self {
        Self::with_rng(hand, cards_per_turn, ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(hand: Vec<CardId>, cards_per_turn: usize, rng: ChaCha8Rng) -> Self {
        RandomHandPolicy {
            hand,
            cards_per_turn,
            played_this_turn: None,
            rng,
        }
    }

    pub fn hand(&self) -> &[CardId] {
        &self.hand
    }
}

impl DecisionPolicy for RandomHandPolicy {
    fn next_action(&mut self, ctx: &TurnContext, _player: PlayerId) -> Result<Option<Action>> {
        let turn = ctx.turn_number();
        let played = match self.played_this_turn {
            Some((t, n)) if t == turn => n,
            _ => 0,
        };
        if self.hand.is_empty() || played >= self.cards_per_turn {
            return Ok(None);
        }

        let index = self.rng.gen_range(0..self.hand.len());
        let card = self.hand.swap_remove(index);
        self.played_this_turn = Some((turn, played + 1));
        Ok(Some(Action::PlayCardFromHand(card)))
    }
}
