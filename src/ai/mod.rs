//! Opponent decision policy.

pub mod policy;

pub use policy::{AiAgent, AiConfig, EnemyDecision, DEFAULT_SPECIAL_CHANCE};
