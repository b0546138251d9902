//! Battle core: status effects, abilities, combatants and the round state machine.

pub mod abilities;
pub mod classes;
pub mod combat;
pub mod effects;
pub mod error;
pub mod rules;
pub mod state;

pub use abilities::{AbilityBehavior, AbilityDef, AbilityRegistry};
pub use classes::{AbilityInfo, Archetype, ArchetypeInfo, ArcaneSpell, ClassProfile, PassiveHook};
pub use combat::AttackOutcome;
pub use effects::{EffectDuration, SlotState, StatusEffectSet, StatusSlot};
pub use error::BattleError;
pub use rules::{
    available_actions, end_of_turn, menu_choice, outcome_phase, resolve_enemy_turn,
    resolve_player_action, ActionKey, ActionOption, ActionResult, Battle, BattleConfig,
    BattlePhase, BattleView, PlayerCommand, PlayerController, RoundReport,
};
pub use state::{
    AbilityView, BaseStats, BattleEvent, Combatant, CombatantSnapshot, StatusView, HEAL_AMOUNT,
};
