pub mod ai;
pub mod game;

use rand::rngs::SmallRng;
use serde_wasm_bindgen::to_value;
use std::str::FromStr;
use wasm_bindgen::prelude::*;

pub use ai::{AiAgent, AiConfig, EnemyDecision};
pub use game::{
    available_actions, end_of_turn, resolve_enemy_turn, resolve_player_action, AbilityDef,
    AbilityRegistry, ActionKey, ActionOption, ActionResult, Archetype, ArchetypeInfo, Battle,
    BattleConfig, BattleError, BattleEvent, BattlePhase, BattleView, Combatant,
    CombatantSnapshot, EffectDuration, PlayerCommand, PlayerController, RoundReport,
    StatusEffectSet, StatusSlot,
};

/// Name given to the AI opponent in interactive sessions.
pub const ENEMY_NAME: &str = "Dark Wizard";

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    set_panic_hook();
}

fn to_js_error(error: BattleError) -> JsValue {
    to_value(&error).unwrap_or_else(|serialize_err| JsValue::from_str(&serialize_err.to_string()))
}

fn serde_to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// Parses an optional JSON battle config; missing fields take their defaults.
fn parse_config(config_json: Option<String>) -> Result<BattleConfig, JsValue> {
    match config_json {
        Some(json) if !json.trim().is_empty() => {
            serde_json::from_str(&json).map_err(serde_to_js_error)
        }
        _ => Ok(BattleConfig::default()),
    }
}

/// One player-versus-wizard duel held on the JS side between turns.
#[wasm_bindgen]
pub struct BattleSession {
    battle: Battle<SmallRng>,
}

#[wasm_bindgen]
impl BattleSession {
    #[wasm_bindgen(constructor)]
    pub fn new(
        player_class: &str,
        player_name: Option<String>,
        config_json: Option<String>,
    ) -> Result<BattleSession, JsValue> {
        let archetype = Archetype::from_str(player_class).map_err(to_js_error)?;
        let config = parse_config(config_json)?;
        let name = player_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| archetype.to_string());
        let player = Combatant::new(name, archetype);
        let enemy = Combatant::new(ENEMY_NAME, Archetype::Wizard);
        Ok(BattleSession {
            battle: Battle::from_config(player, enemy, config),
        })
    }

    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.battle.view()).map_err(serde_to_js_error)
    }

    pub fn available_actions_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.battle.available_actions()).map_err(serde_to_js_error)
    }

    pub fn event_log_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.battle.event_log()).map_err(serde_to_js_error)
    }

    /// Plays one round. Rejections come back as a serialized `BattleError`
    /// and leave the session waiting for another command.
    pub fn submit_json(&mut self, key: &str, ability_index: Option<u32>) -> Result<String, JsValue> {
        let key = ActionKey::from_str(key).map_err(to_js_error)?;
        let command = PlayerCommand {
            key,
            ability_index: ability_index.map(|index| index as usize),
        };
        let report = self.battle.submit(command).map_err(to_js_error)?;
        serde_json::to_string(&report).map_err(serde_to_js_error)
    }

    pub fn phase(&self) -> Result<JsValue, JsValue> {
        to_value(&self.battle.phase()).map_err(JsValue::from)
    }

    pub fn is_over(&self) -> bool {
        self.battle.is_over()
    }
}

/// Describes every playable archetype for character creation.
#[wasm_bindgen(js_name = "listArchetypes")]
pub fn list_archetypes() -> Result<JsValue, JsValue> {
    let catalogue: Vec<ArchetypeInfo> = Archetype::PLAYABLE
        .iter()
        .map(|archetype| archetype.info())
        .collect();
    to_value(&catalogue).map_err(JsValue::from)
}

/// Menu for a fresh combatant of the given archetype.
#[wasm_bindgen(js_name = "availableActions")]
pub fn available_actions_for(player_class: &str) -> Result<JsValue, JsValue> {
    let archetype = Archetype::from_str(player_class).map_err(to_js_error)?;
    let combatant = Combatant::new(archetype.to_string(), archetype);
    to_value(&available_actions(&combatant)).map_err(JsValue::from)
}

#[cfg(feature = "console_error_panic_hook")]
fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

#[cfg(not(feature = "console_error_panic_hook"))]
fn set_panic_hook() {}
