use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::game::Combatant;

/// Default chance that the opponent reaches for a ready ability.
pub const DEFAULT_SPECIAL_CHANCE: f64 = 0.6;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AiConfig {
    pub special_chance: f64,
}

impl AiConfig {
    /// Opponent that only ever attacks.
    pub fn brute() -> Self {
        Self {
            special_chance: 0.0,
        }
    }

    pub fn with_special_chance(mut self, chance: f64) -> Self {
        self.special_chance = chance.clamp(0.0, 1.0);
        self
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            special_chance: DEFAULT_SPECIAL_CHANCE,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum EnemyDecision {
    Stunned,
    Ability { index: usize },
    Attack,
}

#[derive(Debug, Clone, Default)]
pub struct AiAgent {
    config: AiConfig,
}

impl AiAgent {
    pub fn new(config: AiConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    /// Picks the opponent's action. The chance roll is only drawn when at
    /// least one ability is ready, so an empty kit consumes no randomness.
    pub fn decide(&self, actor: &Combatant, rng: &mut dyn RngCore) -> EnemyDecision {
        if actor.is_stunned() {
            return EnemyDecision::Stunned;
        }

        let ready = actor.abilities.ready_indices();
        if ready.is_empty() {
            return EnemyDecision::Attack;
        }

        if rng.gen::<f64>() < self.config.special_chance {
            let index = ready[rng.gen_range(0..ready.len())];
            debug!(actor = %actor.name, index, ready = ready.len(), "ai picks ability");
            EnemyDecision::Ability { index }
        } else {
            EnemyDecision::Attack
        }
    }
}
