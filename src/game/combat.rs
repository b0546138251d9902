//! Shared combat resolution used by every archetype.

use rand::{Rng, RngCore};

use super::effects::{EffectDuration, StatusSlot};
use super::state::{BattleEvent, Combatant};

#[derive(Debug, Clone, PartialEq)]
pub struct AttackOutcome {
    pub hit: bool,
    pub damage: i32,
    pub target_defeated: bool,
    pub events: Vec<BattleEvent>,
}

/// Damage left after defense. Every landed hit deals at least 1.
pub fn damage_after_defense(attack: i32, defense: i32) -> i32 {
    (attack - defense).max(1)
}

/// The defender rolls: a sample below its effective evasion dodges.
pub fn roll_evasion(target: &Combatant, rng: &mut dyn RngCore) -> bool {
    rng.gen::<f64>() < target.effective_evasion()
}

pub fn evaded(attacker: &Combatant, target: &Combatant) -> BattleEvent {
    BattleEvent::Evaded {
        attacker: attacker.name.clone(),
        target: target.name.clone(),
    }
}

pub fn resolve_attack(
    attacker: &mut Combatant,
    target: &mut Combatant,
    rng: &mut dyn RngCore,
) -> AttackOutcome {
    if roll_evasion(target, rng) {
        attacker.clear_attack_roll();
        return AttackOutcome {
            hit: false,
            damage: 0,
            target_defeated: target.is_defeated(),
            events: vec![evaded(attacker, target)],
        };
    }

    let roll = attacker.attack_roll(rng);
    let damage = damage_after_defense(attacker.effective_attack(rng), target.effective_defense());
    target.take_damage(damage);
    attacker.clear_attack_roll();

    AttackOutcome {
        hit: true,
        damage,
        target_defeated: target.is_defeated(),
        events: vec![BattleEvent::Attacked {
            attacker: attacker.name.clone(),
            target: target.name.clone(),
            roll,
            damage,
        }],
    }
}

/// Flat ability damage that ignores defense.
pub fn strike(source: &Combatant, target: &mut Combatant, ability: &str, amount: i32) -> BattleEvent {
    target.take_damage(amount);
    BattleEvent::DamageDealt {
        source: source.name.clone(),
        target: target.name.clone(),
        ability: ability.to_string(),
        amount,
    }
}

pub fn mend(target: &mut Combatant, amount: i32) -> BattleEvent {
    let gained = target.restore(amount);
    BattleEvent::Healed {
        target: target.name.clone(),
        amount: gained,
        health: target.health,
    }
}

pub fn apply_status(
    target: &mut Combatant,
    slot: StatusSlot,
    magnitude: f64,
    duration: EffectDuration,
) -> BattleEvent {
    target.status.apply(slot, magnitude, duration);
    BattleEvent::StatusApplied {
        target: target.name.clone(),
        slot,
        magnitude: target.status.get(slot).magnitude,
        duration,
    }
}

pub fn clear_status(target: &mut Combatant, slot: StatusSlot) -> BattleEvent {
    target.status.clear(slot);
    BattleEvent::StatusCleared {
        target: target.name.clone(),
        slot,
    }
}
