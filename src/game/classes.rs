//! Archetype table: base stats, ability kits and passives, dispatched by tag.

use std::fmt;
use std::str::FromStr;

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::abilities::AbilityDef;
use super::combat::{apply_status, clear_status, evaded, mend, roll_evasion, strike};
use super::effects::{EffectDuration, StatusSlot};
use super::error::BattleError;
use super::state::{BaseStats, BattleEvent, Combatant};

/// Health ratio under which a warrior rages.
pub const RAGE_THRESHOLD: f64 = 0.30;
pub const RAGE_ATTACK_BONUS: f64 = 10.0;
pub const RAGE_DEFENSE_BONUS: f64 = 5.0;

const ARCANE_SURGE_DAMAGE: i32 = 50;
const ICE_SHARD_DAMAGE: i32 = 20;
const DARK_BOLT_BONUS: i32 = 10;
const DRAIN_LIFE_DAMAGE: i32 = 20;
const CURSE_PENALTY: f64 = 5.0;
const CURSE_TURNS: u32 = 3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Archetype {
    Warrior,
    Mage,
    Archer,
    Assassin,
    Wizard,
    /// Stats only: no abilities, no passive.
    Plain,
}

impl Archetype {
    /// Classes offered to the player at character creation.
    pub const PLAYABLE: [Archetype; 4] = [
        Archetype::Warrior,
        Archetype::Mage,
        Archetype::Archer,
        Archetype::Assassin,
    ];

    pub fn profile(self) -> &'static ClassProfile {
        match self {
            Archetype::Warrior => &WARRIOR,
            Archetype::Mage => &MAGE,
            Archetype::Archer => &ARCHER,
            Archetype::Assassin => &ASSASSIN,
            Archetype::Wizard => &WIZARD,
            Archetype::Plain => &PLAIN,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Archetype::Warrior => "warrior",
            Archetype::Mage => "mage",
            Archetype::Archer => "archer",
            Archetype::Assassin => "assassin",
            Archetype::Wizard => "wizard",
            Archetype::Plain => "plain",
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Archetype {
    type Err = BattleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "warrior" | "1" => Ok(Archetype::Warrior),
            "mage" | "2" => Ok(Archetype::Mage),
            "archer" | "3" => Ok(Archetype::Archer),
            "assassin" | "4" => Ok(Archetype::Assassin),
            "wizard" | "evil_wizard" => Ok(Archetype::Wizard),
            "plain" => Ok(Archetype::Plain),
            _ => Err(BattleError::UnknownArchetype {
                name: s.to_string(),
            }),
        }
    }
}

/// End-of-turn hook run after status and cooldown decay.
pub type PassiveHook = fn(&mut Combatant) -> Vec<BattleEvent>;

pub struct ClassProfile {
    pub summary: &'static str,
    pub stats: BaseStats,
    pub kit: &'static [AbilityDef],
    pub passive: Option<PassiveHook>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AbilityInfo {
    pub name: String,
    pub cooldown: u32,
    pub description: String,
}

/// Character-creation view of one archetype.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArchetypeInfo {
    pub archetype: Archetype,
    pub summary: String,
    pub stats: BaseStats,
    pub abilities: Vec<AbilityInfo>,
}

impl Archetype {
    pub fn info(self) -> ArchetypeInfo {
        let profile = self.profile();
        ArchetypeInfo {
            archetype: self,
            summary: profile.summary.to_string(),
            stats: profile.stats,
            abilities: profile
                .kit
                .iter()
                .map(|def| AbilityInfo {
                    name: def.name.to_string(),
                    cooldown: def.cooldown,
                    description: def.description.to_string(),
                })
                .collect(),
        }
    }
}

static WARRIOR: ClassProfile = ClassProfile {
    summary: "Tanky melee fighter who rages at low health.",
    stats: BaseStats {
        health: 140,
        attack: 25,
        defense: 15,
        evasion: 0.05,
    },
    kit: &WARRIOR_KIT,
    passive: Some(berserker_rage),
};

static WARRIOR_KIT: [AbilityDef; 1] = [AbilityDef {
    name: "shield_bash",
    cooldown: 3,
    description: "Stuns the enemy for 1 turn.",
    behavior: shield_bash,
}];

static MAGE: ClassProfile = ClassProfile {
    summary: "Glass-cannon caster with raw damage and random utility magic.",
    stats: BaseStats {
        health: 120,
        attack: 30,
        defense: 3,
        evasion: 0.10,
    },
    kit: &MAGE_KIT,
    passive: None,
};

static MAGE_KIT: [AbilityDef; 2] = [
    AbilityDef {
        name: "arcane_surge",
        cooldown: 4,
        description: "Deals 50 damage to the enemy, ignoring defense.",
        behavior: arcane_surge,
    },
    AbilityDef {
        name: "random_spell",
        cooldown: 5,
        description: "Casts a random spell with various effects.",
        behavior: random_spell,
    },
];

static ARCHER: ClassProfile = ClassProfile {
    summary: "Ranged fighter with multi-hit volleys and a lined-up headshot.",
    stats: BaseStats {
        health: 120,
        attack: 35,
        defense: 7,
        evasion: 0.15,
    },
    kit: &ARCHER_KIT,
    passive: None,
};

static ARCHER_KIT: [AbilityDef; 2] = [
    AbilityDef {
        name: "multi_shot",
        cooldown: 3,
        description: "Hits 3-5 times for a third damage each.",
        behavior: multi_shot,
    },
    AbilityDef {
        name: "headshot",
        cooldown: 4,
        description: "Next attack deals double damage.",
        behavior: headshot,
    },
];

static ASSASSIN: ClassProfile = ClassProfile {
    summary: "Evasive striker that strips enemy evasion.",
    stats: BaseStats {
        health: 100,
        attack: 40,
        defense: 2,
        evasion: 0.25,
    },
    kit: &ASSASSIN_KIT,
    passive: None,
};

static ASSASSIN_KIT: [AbilityDef; 2] = [
    AbilityDef {
        name: "shadow_step",
        cooldown: 3,
        description: "Empowers the next attack and strips the enemy's evasion boost.",
        behavior: shadow_step,
    },
    AbilityDef {
        name: "smoke_bomb",
        cooldown: 4,
        description: "Adds 75% evasion for 3 turns.",
        behavior: smoke_bomb,
    },
];

static WIZARD: ClassProfile = ClassProfile {
    summary: "AI opponent that drains, curses and regenerates.",
    stats: BaseStats {
        health: 150,
        attack: 15,
        defense: 10,
        evasion: 0.25,
    },
    kit: &WIZARD_KIT,
    passive: None,
};

static WIZARD_KIT: [AbilityDef; 5] = [
    AbilityDef {
        name: "dark_bolt",
        cooldown: 3,
        description: "Deals base attack + 10 damage.",
        behavior: dark_bolt,
    },
    AbilityDef {
        name: "drain_life",
        cooldown: 4,
        description: "Deals 20 damage and heals for half of it.",
        behavior: drain_life,
    },
    AbilityDef {
        name: "curse",
        cooldown: 2,
        description: "Weakens the enemy's attack by 5 for 3 turns.",
        behavior: curse,
    },
    AbilityDef {
        name: "shadow_veil",
        cooldown: 5,
        description: "Adds 50% evasion for 2 turns.",
        behavior: shadow_veil,
    },
    AbilityDef {
        name: "regenerate",
        cooldown: 6,
        description: "Heals a third of max health.",
        behavior: regenerate,
    },
];

static PLAIN: ClassProfile = ClassProfile {
    summary: "Stat block without abilities.",
    stats: BaseStats {
        health: 100,
        attack: 20,
        defense: 5,
        evasion: 0.0,
    },
    kit: &[],
    passive: None,
};

fn berserker_rage(warrior: &mut Combatant) -> Vec<BattleEvent> {
    let ratio = warrior.health_ratio();
    let mut events = Vec::new();
    if !warrior.raging && ratio < RAGE_THRESHOLD {
        warrior.raging = true;
        debug!(name = %warrior.name, ratio, "berserker rage starts");
        events.push(BattleEvent::RageStarted {
            name: warrior.name.clone(),
        });
        events.push(apply_status(
            warrior,
            StatusSlot::Empowered,
            RAGE_ATTACK_BONUS,
            EffectDuration::Permanent,
        ));
        events.push(apply_status(
            warrior,
            StatusSlot::Shielded,
            RAGE_DEFENSE_BONUS,
            EffectDuration::Permanent,
        ));
    } else if warrior.raging && ratio >= RAGE_THRESHOLD {
        warrior.raging = false;
        debug!(name = %warrior.name, ratio, "berserker rage ends");
        events.push(BattleEvent::RageEnded {
            name: warrior.name.clone(),
        });
        events.push(clear_status(warrior, StatusSlot::Empowered));
        events.push(clear_status(warrior, StatusSlot::Shielded));
    }
    events
}

fn shield_bash(actor: &mut Combatant, target: &mut Combatant, rng: &mut dyn RngCore) -> Vec<BattleEvent> {
    if roll_evasion(target, rng) {
        return vec![evaded(actor, target)];
    }
    vec![apply_status(target, StatusSlot::Stunned, 0.0, EffectDuration::Turns(1))]
}

fn arcane_surge(actor: &mut Combatant, target: &mut Combatant, rng: &mut dyn RngCore) -> Vec<BattleEvent> {
    if roll_evasion(target, rng) {
        return vec![evaded(actor, target)];
    }
    vec![strike(actor, target, "arcane_surge", ARCANE_SURGE_DAMAGE)]
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ArcaneSpell {
    Teleport,
    IceShard,
    BoostAttack,
    BoostDefense,
}

impl ArcaneSpell {
    pub const ALL: [ArcaneSpell; 4] = [
        ArcaneSpell::Teleport,
        ArcaneSpell::IceShard,
        ArcaneSpell::BoostAttack,
        ArcaneSpell::BoostDefense,
    ];
}

fn random_spell(actor: &mut Combatant, target: &mut Combatant, rng: &mut dyn RngCore) -> Vec<BattleEvent> {
    let spell = ArcaneSpell::ALL[rng.gen_range(0..ArcaneSpell::ALL.len())];
    let mut events = vec![BattleEvent::SpellCast {
        actor: actor.name.clone(),
        spell,
    }];
    match spell {
        ArcaneSpell::Teleport => {
            events.push(apply_status(actor, StatusSlot::EvadeBoost, 1.0, EffectDuration::Turns(3)));
        }
        ArcaneSpell::IceShard => {
            if roll_evasion(target, rng) {
                events.push(evaded(actor, target));
            } else {
                let slow = target.base_evasion / 2.0;
                events.push(apply_status(target, StatusSlot::Slowed, slow, EffectDuration::Turns(4)));
                events.push(strike(actor, target, "ice_shard", ICE_SHARD_DAMAGE));
            }
        }
        ArcaneSpell::BoostAttack => {
            events.push(apply_status(actor, StatusSlot::Empowered, 7.0, EffectDuration::Turns(2)));
        }
        ArcaneSpell::BoostDefense => {
            events.push(apply_status(actor, StatusSlot::Shielded, 5.0, EffectDuration::Turns(2)));
        }
    }
    events
}

fn multi_shot(actor: &mut Combatant, target: &mut Combatant, rng: &mut dyn RngCore) -> Vec<BattleEvent> {
    let attempted: u32 = rng.gen_range(3..=5);
    let per_hit = actor.base_attack / 3;
    let mut landed = 0;
    let mut total = 0;
    for _ in 0..attempted {
        if roll_evasion(target, rng) {
            continue;
        }
        target.take_damage(per_hit);
        total += per_hit;
        landed += 1;
    }
    vec![BattleEvent::MultiShot {
        actor: actor.name.clone(),
        target: target.name.clone(),
        attempted,
        landed,
        total,
    }]
}

fn headshot(actor: &mut Combatant, _target: &mut Combatant, _rng: &mut dyn RngCore) -> Vec<BattleEvent> {
    let bonus = f64::from(actor.base_attack);
    vec![apply_status(actor, StatusSlot::Empowered, bonus, EffectDuration::Turns(2))]
}

fn shadow_step(actor: &mut Combatant, target: &mut Combatant, _rng: &mut dyn RngCore) -> Vec<BattleEvent> {
    let bonus = f64::from(actor.base_attack) * 0.5;
    vec![
        apply_status(actor, StatusSlot::Empowered, bonus, EffectDuration::Turns(2)),
        apply_status(target, StatusSlot::EvadeBoost, 0.0, EffectDuration::Turns(2)),
    ]
}

fn smoke_bomb(actor: &mut Combatant, _target: &mut Combatant, _rng: &mut dyn RngCore) -> Vec<BattleEvent> {
    vec![apply_status(actor, StatusSlot::EvadeBoost, 0.75, EffectDuration::Turns(3))]
}

fn dark_bolt(actor: &mut Combatant, target: &mut Combatant, _rng: &mut dyn RngCore) -> Vec<BattleEvent> {
    let damage = actor.base_attack + DARK_BOLT_BONUS;
    vec![strike(actor, target, "dark_bolt", damage)]
}

fn drain_life(actor: &mut Combatant, target: &mut Combatant, _rng: &mut dyn RngCore) -> Vec<BattleEvent> {
    vec![
        strike(actor, target, "drain_life", DRAIN_LIFE_DAMAGE),
        mend(actor, DRAIN_LIFE_DAMAGE / 2),
    ]
}

fn curse(_actor: &mut Combatant, target: &mut Combatant, _rng: &mut dyn RngCore) -> Vec<BattleEvent> {
    vec![apply_status(
        target,
        StatusSlot::Weakened,
        CURSE_PENALTY,
        EffectDuration::Turns(CURSE_TURNS),
    )]
}

fn shadow_veil(actor: &mut Combatant, _target: &mut Combatant, _rng: &mut dyn RngCore) -> Vec<BattleEvent> {
    vec![apply_status(actor, StatusSlot::EvadeBoost, 0.5, EffectDuration::Turns(2))]
}

fn regenerate(actor: &mut Combatant, _target: &mut Combatant, _rng: &mut dyn RngCore) -> Vec<BattleEvent> {
    let amount = actor.max_health / 3;
    vec![mend(actor, amount)]
}
