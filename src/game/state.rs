use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use super::abilities::AbilityRegistry;
use super::classes::{Archetype, ArcaneSpell};
use super::combat::{self, AttackOutcome};
use super::effects::{EffectDuration, StatusEffectSet, StatusSlot};
use super::error::BattleError;

/// Health restored by the basic heal action.
pub const HEAL_AMOUNT: i32 = 10;
/// Spread of the per-attack roll above base attack.
pub const ATTACK_ROLL_SPREAD: i32 = 5;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BaseStats {
    pub health: i32,
    pub attack: i32,
    pub defense: i32,
    pub evasion: f64,
}

/// Structured battle report stream; rendering is left to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum BattleEvent {
    RoundStarted {
        round: u32,
    },
    Attacked {
        attacker: String,
        target: String,
        roll: i32,
        damage: i32,
    },
    Evaded {
        attacker: String,
        target: String,
    },
    AbilityUsed {
        actor: String,
        ability: String,
    },
    SpellCast {
        actor: String,
        spell: ArcaneSpell,
    },
    DamageDealt {
        source: String,
        target: String,
        ability: String,
        amount: i32,
    },
    MultiShot {
        actor: String,
        target: String,
        attempted: u32,
        landed: u32,
        total: i32,
    },
    StatusApplied {
        target: String,
        slot: StatusSlot,
        magnitude: f64,
        duration: EffectDuration,
    },
    StatusCleared {
        target: String,
        slot: StatusSlot,
    },
    Healed {
        target: String,
        amount: i32,
        health: i32,
    },
    HealWasted {
        target: String,
    },
    RageStarted {
        name: String,
    },
    RageEnded {
        name: String,
    },
    TurnSkipped {
        name: String,
    },
    Fled {
        name: String,
    },
    Defeated {
        name: String,
    },
}

/// One side of a duel. Built once per battle and mutated in place.
#[derive(Debug, Clone)]
pub struct Combatant {
    pub name: String,
    pub archetype: Archetype,
    pub health: i32,
    pub max_health: i32,
    pub base_attack: i32,
    pub base_defense: i32,
    pub base_evasion: f64,
    pub status: StatusEffectSet,
    pub abilities: AbilityRegistry,
    pub raging: bool,
    cached_roll: Option<i32>,
}

impl Combatant {
    pub fn new(name: impl Into<String>, archetype: Archetype) -> Self {
        Self::with_stats(name, archetype, archetype.profile().stats)
    }

    pub fn with_stats(name: impl Into<String>, archetype: Archetype, stats: BaseStats) -> Self {
        Self {
            name: name.into(),
            archetype,
            health: stats.health,
            max_health: stats.health,
            base_attack: stats.attack,
            base_defense: stats.defense,
            base_evasion: stats.evasion,
            status: StatusEffectSet::new(),
            abilities: AbilityRegistry::new(archetype.profile().kit),
            raging: false,
            cached_roll: None,
        }
    }

    pub fn is_defeated(&self) -> bool {
        self.health <= 0
    }

    pub fn is_stunned(&self) -> bool {
        self.status.is_active(StatusSlot::Stunned)
    }

    pub fn health_ratio(&self) -> f64 {
        if self.max_health <= 0 {
            return 0.0;
        }
        f64::from(self.health) / f64::from(self.max_health)
    }

    /// Raw attack for the current attempt, drawn once and reused until cleared.
    pub fn attack_roll(&mut self, rng: &mut dyn RngCore) -> i32 {
        let base = self.base_attack;
        *self
            .cached_roll
            .get_or_insert_with(|| rng.gen_range(base..=base + ATTACK_ROLL_SPREAD))
    }

    pub fn cached_attack_roll(&self) -> Option<i32> {
        self.cached_roll
    }

    pub fn clear_attack_roll(&mut self) {
        self.cached_roll = None;
    }

    pub fn effective_attack(&mut self, rng: &mut dyn RngCore) -> i32 {
        let roll = self.attack_roll(rng);
        self.status.effective_attack(roll)
    }

    /// Effective attack against the unrolled base, for previews.
    pub fn attack_preview(&self) -> i32 {
        self.status.effective_attack(self.base_attack)
    }

    pub fn effective_defense(&self) -> i32 {
        self.status.effective_defense(self.base_defense)
    }

    pub fn effective_evasion(&self) -> f64 {
        self.status.effective_evasion(self.base_evasion)
    }

    pub fn take_damage(&mut self, amount: i32) {
        self.health -= amount;
    }

    /// Restores up to `amount` health and returns what was actually gained.
    pub fn restore(&mut self, amount: i32) -> i32 {
        let before = self.health;
        self.health = (self.health + amount).min(self.max_health);
        self.health - before
    }

    pub fn settle_health(&mut self) {
        self.health = self.health.max(0);
    }

    pub fn attack(&mut self, target: &mut Combatant, rng: &mut dyn RngCore) -> AttackOutcome {
        combat::resolve_attack(self, target, rng)
    }

    pub fn heal(&mut self) -> Result<i32, BattleError> {
        if self.health >= self.max_health {
            return Err(BattleError::AlreadyAtFullHealth {
                name: self.name.clone(),
            });
        }
        Ok(self.restore(HEAL_AMOUNT))
    }

    /// Runs the ability at `index` against `target`. Rejections leave both
    /// combatants untouched.
    pub fn invoke_by_index(
        &mut self,
        index: usize,
        target: &mut Combatant,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<BattleEvent>, BattleError> {
        let def = self.abilities.activate_index(index)?;
        let mut events = vec![BattleEvent::AbilityUsed {
            actor: self.name.clone(),
            ability: def.name.to_string(),
        }];
        events.extend((def.behavior)(self, target, rng));
        Ok(events)
    }

    /// End-of-turn upkeep: status decay, cooldown decay, then the class passive.
    pub fn update(&mut self) -> Vec<BattleEvent> {
        self.status.tick();
        self.abilities.tick_cooldowns();
        let mut events = Vec::new();
        if let Some(passive) = self.archetype.profile().passive {
            events.extend(passive(self));
        }
        events
    }

    pub fn snapshot(&self) -> CombatantSnapshot {
        CombatantSnapshot {
            name: self.name.clone(),
            archetype: self.archetype,
            health: self.health.max(0),
            max_health: self.max_health,
            attack: self.attack_preview(),
            defense: self.effective_defense(),
            evasion: self.effective_evasion(),
            raging: self.raging,
            statuses: self
                .status
                .active()
                .map(|(slot, state)| StatusView {
                    slot,
                    magnitude: state.magnitude,
                    remaining: state.remaining,
                })
                .collect(),
            abilities: self
                .abilities
                .iter()
                .map(|(def, remaining)| AbilityView {
                    name: def.name.to_string(),
                    description: def.description.to_string(),
                    cooldown: def.cooldown,
                    remaining,
                    ready: remaining == 0,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusView {
    pub slot: StatusSlot,
    pub magnitude: f64,
    pub remaining: EffectDuration,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AbilityView {
    pub name: String,
    pub description: String,
    pub cooldown: u32,
    pub remaining: u32,
    pub ready: bool,
}

/// Read-only view handed to the display layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CombatantSnapshot {
    pub name: String,
    pub archetype: Archetype,
    pub health: i32,
    pub max_health: i32,
    pub attack: i32,
    pub defense: i32,
    pub evasion: f64,
    pub raging: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub statuses: Vec<StatusView>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub abilities: Vec<AbilityView>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn dummy() -> Combatant {
        Combatant::with_stats(
            "Dummy",
            Archetype::Plain,
            BaseStats {
                health: 100,
                attack: 20,
                defense: 5,
                evasion: 0.0,
            },
        )
    }

    #[test]
    fn cooldown_entries_start_at_zero() {
        let wizard = Combatant::new("Dark Wizard", Archetype::Wizard);
        assert_eq!(wizard.abilities.len(), 5);
        assert!(wizard.abilities.iter().all(|(_, remaining)| remaining == 0));
    }

    #[test]
    fn heal_caps_at_max_health() {
        let mut fighter = dummy();
        fighter.health = 95;
        assert_eq!(fighter.heal(), Ok(5));
        assert_eq!(fighter.health, 100);
    }

    #[test]
    fn heal_at_full_health_is_rejected() {
        let mut fighter = dummy();
        assert_eq!(
            fighter.heal(),
            Err(BattleError::AlreadyAtFullHealth {
                name: "Dummy".to_string()
            })
        );
        assert_eq!(fighter.health, 100);
    }

    #[test]
    fn attack_roll_is_cached_until_cleared() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut fighter = dummy();

        let first = fighter.attack_roll(&mut rng);
        assert!((20..=25).contains(&first));
        for _ in 0..10 {
            assert_eq!(fighter.attack_roll(&mut rng), first);
        }

        fighter.clear_attack_roll();
        assert_eq!(fighter.cached_attack_roll(), None);
    }

    #[test]
    fn attack_clears_cached_roll_on_hit_and_miss() {
        let mut rng = StepRng::new(0, 0);
        let mut attacker = dummy();
        let mut target = dummy();

        let outcome = attacker.attack(&mut target, &mut rng);
        assert!(outcome.hit);
        assert_eq!(attacker.cached_attack_roll(), None);

        target.base_evasion = 1.0;
        let outcome = attacker.attack(&mut target, &mut rng);
        assert!(!outcome.hit);
        assert_eq!(attacker.cached_attack_roll(), None);
    }

    #[test]
    fn update_ticks_statuses_and_cooldowns() {
        let mut wizard = Combatant::new("Dark Wizard", Archetype::Wizard);
        for (def, _) in wizard.abilities.clone().iter() {
            wizard.abilities.set_remaining(def.name, 1);
        }
        wizard
            .status
            .apply(StatusSlot::EvadeBoost, 0.5, EffectDuration::Turns(1));

        let events = wizard.update();

        assert!(events.is_empty());
        assert!(wizard.abilities.iter().all(|(_, remaining)| remaining == 0));
        assert!(!wizard.status.is_active(StatusSlot::EvadeBoost));
    }

    #[test]
    fn snapshot_hides_negative_health_and_lists_live_statuses() {
        let mut fighter = Combatant::new("Lina", Archetype::Archer);
        fighter.health = -4;
        fighter
            .status
            .apply(StatusSlot::Empowered, 35.0, EffectDuration::Turns(2));
        fighter.abilities.set_remaining("headshot", 3);

        let snapshot = fighter.snapshot();
        assert_eq!(snapshot.health, 0);
        assert_eq!(snapshot.attack, 70);
        assert_eq!(snapshot.statuses.len(), 1);
        assert_eq!(snapshot.statuses[0].slot, StatusSlot::Empowered);
        let headshot = snapshot
            .abilities
            .iter()
            .find(|ability| ability.name == "headshot")
            .expect("archer should know headshot");
        assert!(!headshot.ready);
        assert_eq!(headshot.remaining, 3);
    }
}
