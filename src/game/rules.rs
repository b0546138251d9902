use std::str::FromStr;

use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use super::error::BattleError;
use super::state::{BattleEvent, Combatant, CombatantSnapshot};
use crate::ai::{AiAgent, AiConfig, EnemyDecision};

/// Consecutive rejected commands tolerated before `Battle::run` gives up.
pub const MAX_CONSECUTIVE_REJECTIONS: u32 = 16;
pub const DEFAULT_MAX_ROUNDS: u32 = 1000;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ActionKey {
    Attack,
    Special,
    Heal,
    Quit,
}

impl ActionKey {
    pub fn label(self) -> &'static str {
        match self {
            ActionKey::Attack => "Attack",
            ActionKey::Special => "Use Special Ability",
            ActionKey::Heal => "Heal",
            ActionKey::Quit => "Quit",
        }
    }
}

impl FromStr for ActionKey {
    type Err = BattleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "attack" => Ok(ActionKey::Attack),
            "special" | "ability" => Ok(ActionKey::Special),
            "heal" => Ok(ActionKey::Heal),
            "quit" | "flee" => Ok(ActionKey::Quit),
            _ => Err(BattleError::UnknownAction { key: s.to_string() }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionOption {
    pub label: String,
    pub key: ActionKey,
}

/// Menu offered to the player, in display order. Combatants without a kit get
/// no special entry.
pub fn available_actions(combatant: &Combatant) -> Vec<ActionOption> {
    [
        ActionKey::Attack,
        ActionKey::Special,
        ActionKey::Heal,
        ActionKey::Quit,
    ]
    .into_iter()
    .filter(|key| *key != ActionKey::Special || !combatant.abilities.is_empty())
    .map(|key| ActionOption {
        label: key.label().to_string(),
        key,
    })
    .collect()
}

/// Resolves a 1-based menu position against the combatant's own menu.
pub fn menu_choice(combatant: &Combatant, position: usize) -> Result<ActionKey, BattleError> {
    position
        .checked_sub(1)
        .and_then(|index| available_actions(combatant).get(index).map(|option| option.key))
        .ok_or_else(|| BattleError::UnknownAction {
            key: position.to_string(),
        })
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionResult {
    pub continues: bool,
    pub defeated_opponent: bool,
    pub self_defeated: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<BattleEvent>,
}

impl ActionResult {
    /// Reads the defeat flags from raw health, then clamps both sides to 0.
    fn settle(actor: &mut Combatant, opponent: &mut Combatant, events: Vec<BattleEvent>) -> Self {
        let defeated_opponent = opponent.is_defeated();
        let self_defeated = actor.is_defeated();
        actor.settle_health();
        opponent.settle_health();
        Self {
            continues: !defeated_opponent && !self_defeated,
            defeated_opponent,
            self_defeated,
            events,
        }
    }
}

pub fn resolve_player_action(
    key: ActionKey,
    player: &mut Combatant,
    enemy: &mut Combatant,
    ability_index: Option<usize>,
    rng: &mut dyn RngCore,
) -> Result<ActionResult, BattleError> {
    if player.is_stunned() {
        debug!(name = %player.name, ?key, "stunned, action skipped");
        let events = vec![BattleEvent::TurnSkipped {
            name: player.name.clone(),
        }];
        return Ok(ActionResult::settle(player, enemy, events));
    }

    let events = match key {
        ActionKey::Attack => player.attack(enemy, rng).events,
        ActionKey::Special => {
            let index = ability_index.ok_or(BattleError::MissingAbilityIndex)?;
            player.invoke_by_index(index, enemy, rng)?
        }
        ActionKey::Heal => match player.heal() {
            Ok(gained) => vec![BattleEvent::Healed {
                target: player.name.clone(),
                amount: gained,
                health: player.health,
            }],
            Err(err) if err.consumes_turn() => {
                debug!(name = %player.name, "heal wasted at full health");
                vec![BattleEvent::HealWasted {
                    target: player.name.clone(),
                }]
            }
            Err(err) => return Err(err),
        },
        ActionKey::Quit => {
            debug!(name = %player.name, "player fled");
            return Ok(ActionResult {
                continues: false,
                defeated_opponent: false,
                self_defeated: false,
                events: vec![BattleEvent::Fled {
                    name: player.name.clone(),
                }],
            });
        }
    };

    debug!(name = %player.name, ?key, enemy_health = enemy.health, "player action resolved");
    Ok(ActionResult::settle(player, enemy, events))
}

pub fn resolve_enemy_turn(
    enemy: &mut Combatant,
    player: &mut Combatant,
    agent: &AiAgent,
    rng: &mut dyn RngCore,
) -> ActionResult {
    let events = match agent.decide(enemy, rng) {
        EnemyDecision::Stunned => vec![BattleEvent::TurnSkipped {
            name: enemy.name.clone(),
        }],
        EnemyDecision::Ability { index } => match enemy.invoke_by_index(index, player, rng) {
            Ok(events) => events,
            Err(err) => {
                debug!(name = %enemy.name, %err, "ai ability rejected, attacking instead");
                enemy.attack(player, rng).events
            }
        },
        EnemyDecision::Attack => enemy.attack(player, rng).events,
    };

    debug!(name = %enemy.name, player_health = player.health, "enemy turn resolved");
    ActionResult::settle(enemy, player, events)
}

/// Status decay, cooldown decay and passives for the actor who just moved.
pub fn end_of_turn(combatant: &mut Combatant) -> Vec<BattleEvent> {
    combatant.update()
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BattlePhase {
    AwaitingPlayerAction,
    ResolvingPlayerAction,
    AwaitingEnemyAction,
    ResolvingEnemyAction,
    EndOfRound,
    PlayerDefeated,
    EnemyDefeated,
    BothDefeated,
    Fled,
    Stalemate,
}

impl BattlePhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            BattlePhase::PlayerDefeated
                | BattlePhase::EnemyDefeated
                | BattlePhase::BothDefeated
                | BattlePhase::Fled
                | BattlePhase::Stalemate
        )
    }
}

/// Terminal phase implied by the two health totals, if any.
pub fn outcome_phase(player: &Combatant, enemy: &Combatant) -> Option<BattlePhase> {
    match (player.is_defeated(), enemy.is_defeated()) {
        (true, true) => Some(BattlePhase::BothDefeated),
        (true, false) => Some(BattlePhase::PlayerDefeated),
        (false, true) => Some(BattlePhase::EnemyDefeated),
        (false, false) => None,
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerCommand {
    pub key: ActionKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ability_index: Option<usize>,
}

impl PlayerCommand {
    pub fn attack() -> Self {
        Self {
            key: ActionKey::Attack,
            ability_index: None,
        }
    }

    pub fn special(index: usize) -> Self {
        Self {
            key: ActionKey::Special,
            ability_index: Some(index),
        }
    }

    pub fn heal() -> Self {
        Self {
            key: ActionKey::Heal,
            ability_index: None,
        }
    }

    pub fn quit() -> Self {
        Self {
            key: ActionKey::Quit,
            ability_index: None,
        }
    }
}

/// Source of the player's choices for `Battle::run`. Every rejection is
/// passed back through `on_rejected` so the controller can re-prompt.
pub trait PlayerController {
    fn choose(
        &mut self,
        player: &Combatant,
        enemy: &Combatant,
        actions: &[ActionOption],
    ) -> PlayerCommand;

    fn on_rejected(&mut self, _error: &BattleError) {}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BattleConfig {
    pub ai: AiConfig,
    /// Rounds before the battle is called a stalemate. Zero disables the guard.
    pub max_rounds: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            ai: AiConfig::default(),
            max_rounds: DEFAULT_MAX_ROUNDS,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoundReport {
    pub round: u32,
    pub phase: BattlePhase,
    pub events: Vec<BattleEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BattleView {
    pub round: u32,
    pub phase: BattlePhase,
    pub player: CombatantSnapshot,
    pub enemy: CombatantSnapshot,
}

/// One duel between the player and the AI opponent, driven a round at a time.
pub struct Battle<R: RngCore> {
    player: Combatant,
    enemy: Combatant,
    agent: AiAgent,
    config: BattleConfig,
    rng: R,
    phase: BattlePhase,
    round: u32,
    event_log: Vec<BattleEvent>,
}

impl Battle<SmallRng> {
    /// Seeds from `config.seed`, or from entropy when no seed is set.
    pub fn from_config(player: Combatant, enemy: Combatant, config: BattleConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self::new(player, enemy, config, rng)
    }

    pub fn seeded(player: Combatant, enemy: Combatant, seed: u64) -> Self {
        Self::from_config(
            player,
            enemy,
            BattleConfig {
                seed: Some(seed),
                ..BattleConfig::default()
            },
        )
    }
}

impl<R: RngCore> Battle<R> {
    pub fn new(player: Combatant, enemy: Combatant, config: BattleConfig, rng: R) -> Self {
        Self {
            player,
            enemy,
            agent: AiAgent::new(config.ai),
            config,
            rng,
            phase: BattlePhase::AwaitingPlayerAction,
            round: 0,
            event_log: Vec::new(),
        }
    }

    pub fn player(&self) -> &Combatant {
        &self.player
    }

    pub fn enemy(&self) -> &Combatant {
        &self.enemy
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn is_over(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn event_log(&self) -> &[BattleEvent] {
        &self.event_log
    }

    pub fn available_actions(&self) -> Vec<ActionOption> {
        available_actions(&self.player)
    }

    pub fn view(&self) -> BattleView {
        BattleView {
            round: self.round,
            phase: self.phase,
            player: self.player.snapshot(),
            enemy: self.enemy.snapshot(),
        }
    }

    fn set_phase(&mut self, next: BattlePhase) {
        trace!(round = self.round, from = ?self.phase, to = ?next, "phase transition");
        self.phase = next;
    }

    /// Plays one full round. A rejected command leaves the battle exactly as
    /// it was, still waiting for the player.
    pub fn submit(&mut self, command: PlayerCommand) -> Result<RoundReport, BattleError> {
        if self.phase.is_terminal() {
            return Err(BattleError::BattleOver);
        }

        let round = self.round + 1;
        self.set_phase(BattlePhase::ResolvingPlayerAction);
        let player_result = match resolve_player_action(
            command.key,
            &mut self.player,
            &mut self.enemy,
            command.ability_index,
            &mut self.rng,
        ) {
            Ok(result) => result,
            Err(err) => {
                debug!(round, %err, "player command rejected");
                self.set_phase(BattlePhase::AwaitingPlayerAction);
                return Err(err);
            }
        };

        self.round = round;
        let mut events = vec![BattleEvent::RoundStarted { round }];
        events.extend(player_result.events);

        if command.key == ActionKey::Quit && !player_result.continues {
            self.set_phase(BattlePhase::Fled);
            info!(round, name = %self.player.name, "battle abandoned");
            return Ok(self.record(round, events));
        }

        events.extend(end_of_turn(&mut self.player));

        if player_result.continues {
            self.set_phase(BattlePhase::AwaitingEnemyAction);
            self.set_phase(BattlePhase::ResolvingEnemyAction);
            let enemy_result =
                resolve_enemy_turn(&mut self.enemy, &mut self.player, &self.agent, &mut self.rng);
            events.extend(enemy_result.events);
            events.extend(end_of_turn(&mut self.enemy));
        }

        self.set_phase(BattlePhase::EndOfRound);
        if let Some(outcome) = outcome_phase(&self.player, &self.enemy) {
            for fallen in [&self.player, &self.enemy] {
                if fallen.is_defeated() {
                    events.push(BattleEvent::Defeated {
                        name: fallen.name.clone(),
                    });
                }
            }
            self.set_phase(outcome);
            info!(round, phase = ?outcome, "battle finished");
        } else if self.config.max_rounds > 0 && round >= self.config.max_rounds {
            self.set_phase(BattlePhase::Stalemate);
            info!(round, "battle called as stalemate");
        } else {
            self.set_phase(BattlePhase::AwaitingPlayerAction);
        }

        Ok(self.record(round, events))
    }

    fn record(&mut self, round: u32, events: Vec<BattleEvent>) -> RoundReport {
        self.event_log.extend(events.iter().cloned());
        RoundReport {
            round,
            phase: self.phase,
            events,
        }
    }

    /// Drives the battle to a terminal phase. A controller that is rejected
    /// `MAX_CONSECUTIVE_REJECTIONS` times in a row stops the run with
    /// `ControllerStalled`; the battle stays waiting for the player.
    pub fn run<C>(&mut self, controller: &mut C) -> Result<BattlePhase, BattleError>
    where
        C: PlayerController + ?Sized,
    {
        let mut rejections = 0;
        while !self.phase.is_terminal() {
            let actions = self.available_actions();
            let command = controller.choose(&self.player, &self.enemy, &actions);
            match self.submit(command) {
                Ok(_) => rejections = 0,
                Err(err) => {
                    controller.on_rejected(&err);
                    rejections += 1;
                    if rejections >= MAX_CONSECUTIVE_REJECTIONS {
                        warn!(rejections, last = %err, "controller keeps submitting rejected commands");
                        return Err(BattleError::ControllerStalled { rejections });
                    }
                }
            }
        }
        Ok(self.phase)
    }
}
