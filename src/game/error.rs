use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejections reported back to the caller. None of them terminate the battle.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum BattleError {
    /// Does not consume the turn.
    #[error("ability index {index} is out of range (0..{count})")]
    InvalidIndex { index: usize, count: usize },

    /// Does not consume the turn.
    #[error("{ability} is on cooldown for {remaining} more turn(s)")]
    AbilityOnCooldown { ability: String, remaining: u32 },

    /// Consumes the turn even though no health is restored.
    #[error("{name} is already at full health")]
    AlreadyAtFullHealth { name: String },

    #[error("a special action needs an ability index")]
    MissingAbilityIndex,

    #[error("unknown action `{key}`")]
    UnknownAction { key: String },

    #[error("unknown archetype `{name}`")]
    UnknownArchetype { name: String },

    #[error("the battle is already over")]
    BattleOver,

    /// The controller was rejected this many times in a row.
    #[error("controller was rejected {rejections} times in a row")]
    ControllerStalled { rejections: u32 },
}

impl BattleError {
    /// Whether the rejected command still used up the actor's turn.
    pub fn consumes_turn(&self) -> bool {
        matches!(self, BattleError::AlreadyAtFullHealth { .. })
    }
}
