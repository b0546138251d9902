use serde::{Deserialize, Serialize};

/// Named status slots carried by every combatant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StatusSlot {
    Stunned,
    Weakened,
    Vulnerable,
    Slowed,
    Shielded,
    Empowered,
    EvadeBoost,
}

pub const SLOT_COUNT: usize = 7;

impl StatusSlot {
    pub const ALL: [StatusSlot; SLOT_COUNT] = [
        StatusSlot::Stunned,
        StatusSlot::Weakened,
        StatusSlot::Vulnerable,
        StatusSlot::Slowed,
        StatusSlot::Shielded,
        StatusSlot::Empowered,
        StatusSlot::EvadeBoost,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Binary slots only track turns; their magnitude is always zero.
    pub fn is_binary(self) -> bool {
        matches!(self, StatusSlot::Stunned)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatusSlot::Stunned => "stunned",
            StatusSlot::Weakened => "weakened",
            StatusSlot::Vulnerable => "vulnerable",
            StatusSlot::Slowed => "slowed",
            StatusSlot::Shielded => "shielded",
            StatusSlot::Empowered => "empowered",
            StatusSlot::EvadeBoost => "evade_boost",
        }
    }
}

/// How long a status slot stays active.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EffectDuration {
    Turns(u32),
    /// Stays active until explicitly cleared; never ticks down.
    Permanent,
}

impl EffectDuration {
    pub const NONE: EffectDuration = EffectDuration::Turns(0);

    pub fn is_active(self) -> bool {
        match self {
            EffectDuration::Turns(turns) => turns > 0,
            EffectDuration::Permanent => true,
        }
    }

    fn ticked(self) -> Self {
        match self {
            EffectDuration::Turns(turns) => EffectDuration::Turns(turns.saturating_sub(1)),
            EffectDuration::Permanent => EffectDuration::Permanent,
        }
    }
}

impl Default for EffectDuration {
    fn default() -> Self {
        Self::NONE
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SlotState {
    pub magnitude: f64,
    pub remaining: EffectDuration,
}

impl SlotState {
    pub const INACTIVE: SlotState = SlotState {
        magnitude: 0.0,
        remaining: EffectDuration::NONE,
    };

    pub fn is_active(&self) -> bool {
        self.remaining.is_active()
    }
}

impl Default for SlotState {
    fn default() -> Self {
        Self::INACTIVE
    }
}

/// Timed modifiers owned by a single combatant. Writes overwrite, they never stack.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct StatusEffectSet {
    slots: [SlotState; SLOT_COUNT],
}

impl StatusEffectSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: StatusSlot) -> SlotState {
        self.slots[slot.index()]
    }

    pub fn is_active(&self, slot: StatusSlot) -> bool {
        self.slots[slot.index()].is_active()
    }

    /// Magnitude of an active slot; inactive slots are never read.
    pub fn magnitude(&self, slot: StatusSlot) -> Option<f64> {
        let state = self.slots[slot.index()];
        state.is_active().then_some(state.magnitude)
    }

    pub fn apply(&mut self, slot: StatusSlot, magnitude: f64, duration: EffectDuration) {
        let magnitude = if slot.is_binary() { 0.0 } else { magnitude };
        self.slots[slot.index()] = SlotState {
            magnitude,
            remaining: duration,
        };
    }

    pub fn clear(&mut self, slot: StatusSlot) {
        self.slots[slot.index()] = SlotState::INACTIVE;
    }

    fn net(&self, bonus: StatusSlot, penalty: StatusSlot) -> f64 {
        self.magnitude(bonus).unwrap_or(0.0) - self.magnitude(penalty).unwrap_or(0.0)
    }

    pub fn effective_attack(&self, base: i32) -> i32 {
        let value = f64::from(base) + self.net(StatusSlot::Empowered, StatusSlot::Weakened);
        (value.floor() as i32).max(1)
    }

    pub fn effective_defense(&self, base: i32) -> i32 {
        let value = f64::from(base) + self.net(StatusSlot::Shielded, StatusSlot::Vulnerable);
        (value.floor() as i32).max(0)
    }

    pub fn effective_evasion(&self, base: f64) -> f64 {
        (base + self.net(StatusSlot::EvadeBoost, StatusSlot::Slowed)).clamp(0.0, 1.0)
    }

    /// Owner turn-end decay. A slot that reaches zero turns drops its magnitude.
    pub fn tick(&mut self) {
        for state in &mut self.slots {
            if let EffectDuration::Turns(0) = state.remaining {
                continue;
            }
            state.remaining = state.remaining.ticked();
            if !state.is_active() {
                state.magnitude = 0.0;
            }
        }
    }

    pub fn active(&self) -> impl Iterator<Item = (StatusSlot, SlotState)> + '_ {
        StatusSlot::ALL
            .iter()
            .map(move |slot| (*slot, self.get(*slot)))
            .filter(|(_, state)| state.is_active())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn inactive_slots_leave_base_stats_untouched() {
        let mut set = StatusEffectSet::new();
        set.apply(StatusSlot::Empowered, 12.0, EffectDuration::NONE);
        set.apply(StatusSlot::Vulnerable, 4.0, EffectDuration::NONE);
        set.apply(StatusSlot::EvadeBoost, 0.4, EffectDuration::NONE);

        assert_eq!(set.effective_attack(25), 25);
        assert_eq!(set.effective_defense(15), 15);
        assert_eq!(set.effective_evasion(0.25), 0.25);
    }

    #[test]
    fn modifiers_combine_and_respect_floors() {
        let mut set = StatusEffectSet::new();
        set.apply(StatusSlot::Weakened, 30.0, EffectDuration::Turns(2));
        set.apply(StatusSlot::Vulnerable, 20.0, EffectDuration::Turns(2));
        set.apply(StatusSlot::Slowed, 0.5, EffectDuration::Turns(2));

        assert_eq!(set.effective_attack(10), 1, "attack floors at 1");
        assert_eq!(set.effective_defense(5), 0, "defense floors at 0");
        assert_eq!(set.effective_evasion(0.1), 0.0, "evasion clamps at 0");

        set.apply(StatusSlot::EvadeBoost, 1.0, EffectDuration::Turns(3));
        assert_eq!(set.effective_evasion(0.25), 0.75);
        set.clear(StatusSlot::Slowed);
        assert_eq!(set.effective_evasion(0.25), 1.0, "evasion clamps at 1");
    }

    #[test]
    fn apply_overwrites_instead_of_stacking() {
        let mut set = StatusEffectSet::new();
        set.apply(StatusSlot::Empowered, 7.0, EffectDuration::Turns(2));
        set.apply(StatusSlot::Empowered, 3.0, EffectDuration::Turns(5));

        assert_eq!(
            set.get(StatusSlot::Empowered),
            SlotState {
                magnitude: 3.0,
                remaining: EffectDuration::Turns(5)
            }
        );
        assert_eq!(set.effective_attack(20), 23);
    }

    #[test]
    fn tick_expires_slot_and_clears_magnitude() {
        let mut set = StatusEffectSet::new();
        set.apply(StatusSlot::Shielded, 5.0, EffectDuration::Turns(2));

        set.tick();
        assert!(set.is_active(StatusSlot::Shielded));
        assert_eq!(set.effective_defense(10), 15);

        set.tick();
        assert!(!set.is_active(StatusSlot::Shielded));
        assert_eq!(set.get(StatusSlot::Shielded), SlotState::INACTIVE);

        set.tick();
        assert_eq!(set.get(StatusSlot::Shielded).remaining, EffectDuration::Turns(0));
    }

    #[test]
    fn permanent_slots_survive_ticks_until_cleared() {
        let mut set = StatusEffectSet::new();
        set.apply(StatusSlot::Empowered, 10.0, EffectDuration::Permanent);
        for _ in 0..50 {
            set.tick();
        }
        assert!(set.is_active(StatusSlot::Empowered));
        assert_eq!(set.effective_attack(25), 35);

        set.clear(StatusSlot::Empowered);
        assert!(!set.is_active(StatusSlot::Empowered));
    }

    #[test]
    fn stun_is_binary() {
        let mut set = StatusEffectSet::new();
        set.apply(StatusSlot::Stunned, 99.0, EffectDuration::Turns(1));
        assert!(set.is_active(StatusSlot::Stunned));
        assert_eq!(set.magnitude(StatusSlot::Stunned), Some(0.0));

        set.tick();
        assert!(!set.is_active(StatusSlot::Stunned));
    }

    #[test]
    fn active_lists_only_live_slots() {
        let mut set = StatusEffectSet::new();
        set.apply(StatusSlot::Slowed, 0.05, EffectDuration::Turns(4));
        set.apply(StatusSlot::Weakened, 5.0, EffectDuration::NONE);

        let active: Vec<StatusSlot> = set.active().map(|(slot, _)| slot).collect();
        assert_eq!(active, vec![StatusSlot::Slowed]);
    }

    proptest! {
        #[test]
        fn apply_then_read_back_matches_duration(
            slot_index in 0usize..SLOT_COUNT,
            magnitude in 0.0f64..50.0,
            turns in 0u32..10,
        ) {
            let slot = StatusSlot::ALL[slot_index];
            let mut set = StatusEffectSet::new();
            set.apply(slot, magnitude, EffectDuration::Turns(turns));
            prop_assert_eq!(set.is_active(slot), turns > 0);
        }

        #[test]
        fn ticks_count_down_and_floor_at_zero(turns in 0u32..20, ticks in 0u32..40) {
            let mut set = StatusEffectSet::new();
            set.apply(StatusSlot::Weakened, 3.0, EffectDuration::Turns(turns));
            for _ in 0..ticks {
                set.tick();
            }
            let expected = turns.saturating_sub(ticks);
            prop_assert_eq!(set.get(StatusSlot::Weakened).remaining, EffectDuration::Turns(expected));
            prop_assert_eq!(set.is_active(StatusSlot::Weakened), expected > 0);
        }

        #[test]
        fn effective_stats_stay_in_bounds(
            base_attack in 0i32..200,
            base_defense in 0i32..200,
            base_evasion in 0.0f64..1.0,
            swing in -100.0f64..100.0,
        ) {
            let mut set = StatusEffectSet::new();
            set.apply(StatusSlot::Weakened, swing, EffectDuration::Turns(1));
            set.apply(StatusSlot::Vulnerable, swing, EffectDuration::Turns(1));
            set.apply(StatusSlot::Slowed, swing, EffectDuration::Turns(1));

            prop_assert!(set.effective_attack(base_attack) >= 1);
            prop_assert!(set.effective_defense(base_defense) >= 0);
            let evasion = set.effective_evasion(base_evasion);
            prop_assert!((0.0..=1.0).contains(&evasion));
        }
    }
}
