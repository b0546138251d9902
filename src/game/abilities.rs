use std::fmt;

use rand::RngCore;

use super::error::BattleError;
use super::state::{BattleEvent, Combatant};

/// Behavior run when an ability activates: `(actor, target, rng) -> report`.
pub type AbilityBehavior = fn(&mut Combatant, &mut Combatant, &mut dyn RngCore) -> Vec<BattleEvent>;

/// Static ability definition. The behavior travels with the definition, so
/// dispatch never looks anything up by name.
pub struct AbilityDef {
    pub name: &'static str,
    pub cooldown: u32,
    pub description: &'static str,
    pub behavior: AbilityBehavior,
}

impl fmt::Debug for AbilityDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AbilityDef")
            .field("name", &self.name)
            .field("cooldown", &self.cooldown)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
struct AbilityEntry {
    def: &'static AbilityDef,
    remaining: u32,
}

/// Ability table in declaration order, each with its own cooldown counter.
#[derive(Debug, Clone, Default)]
pub struct AbilityRegistry {
    entries: Vec<AbilityEntry>,
}

impl AbilityRegistry {
    pub fn new(kit: &'static [AbilityDef]) -> Self {
        Self {
            entries: kit
                .iter()
                .map(|def| AbilityEntry { def, remaining: 0 })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn find(&self, name: &str) -> Option<&AbilityEntry> {
        self.entries.iter().find(|entry| entry.def.name == name)
    }

    pub fn get(&self, index: usize) -> Option<&'static AbilityDef> {
        self.entries.get(index).map(|entry| entry.def)
    }

    pub fn remaining(&self, name: &str) -> Option<u32> {
        self.find(name).map(|entry| entry.remaining)
    }

    pub fn is_ready(&self, name: &str) -> bool {
        self.remaining(name) == Some(0)
    }

    /// Starts the cooldown if the ability is ready. Returns false and leaves
    /// everything untouched otherwise.
    pub fn try_activate(&mut self, name: &str) -> bool {
        match self.entries.iter_mut().find(|entry| entry.def.name == name) {
            Some(entry) if entry.remaining == 0 => {
                entry.remaining = entry.def.cooldown;
                true
            }
            _ => false,
        }
    }

    /// Overrides a cooldown counter. Returns false for unknown abilities.
    pub fn set_remaining(&mut self, name: &str, turns: u32) -> bool {
        match self.entries.iter_mut().find(|entry| entry.def.name == name) {
            Some(entry) => {
                entry.remaining = turns;
                true
            }
            None => false,
        }
    }

    pub fn tick_cooldowns(&mut self) {
        for entry in &mut self.entries {
            entry.remaining = entry.remaining.saturating_sub(1);
        }
    }

    pub fn ready_indices(&self) -> Vec<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.remaining == 0)
            .map(|(index, _)| index)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static AbilityDef, u32)> + '_ {
        self.entries.iter().map(|entry| (entry.def, entry.remaining))
    }

    /// Resolves the ability at `index` and starts its cooldown.
    pub fn activate_index(&mut self, index: usize) -> Result<&'static AbilityDef, BattleError> {
        let count = self.entries.len();
        let entry = self
            .entries
            .get(index)
            .ok_or(BattleError::InvalidIndex { index, count })?;
        let def = entry.def;
        if !self.try_activate(def.name) {
            return Err(BattleError::AbilityOnCooldown {
                ability: def.name.to_string(),
                remaining: self.remaining(def.name).unwrap_or(0),
            });
        }
        Ok(def)
    }
}
