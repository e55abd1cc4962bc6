use std::collections::{BTreeMap, BTreeSet};

use crate::data::{Automation, UpgradeCatalog, UpgradeDefinition, UpgradeScope};

use super::minigame::{MinigameId, MinigameRecord};
use super::resource_store::ResourceLedger;

pub const DEFAULT_PLAYER_NAME: &str = "Player";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub offline_progress_enabled: bool,
    pub player_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            offline_progress_enabled: true,
            player_name: DEFAULT_PLAYER_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stats {
    pub total_play_time_ms: f64,
}

/// Everything a save captures, held live for the session.
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub ledger: ResourceLedger,
    pub minigames: BTreeMap<MinigameId, MinigameRecord>,
    /// Levels of global upgrades.
    pub upgrades: BTreeMap<String, u32>,
    pub automations: BTreeSet<Automation>,
    pub settings: Settings,
    pub stats: Stats,
    pub last_saved_ms: i64,
    pub last_played_ms: i64,
}

impl GameState {
    pub fn new_game(now_ms: i64) -> Self {
        let minigames = MinigameId::ALL
            .into_iter()
            .map(|id| (id, MinigameRecord::new(id.unlocked_by_default())))
            .collect();
        Self {
            ledger: ResourceLedger::default(),
            minigames,
            upgrades: BTreeMap::new(),
            automations: BTreeSet::new(),
            settings: Settings::default(),
            stats: Stats::default(),
            last_saved_ms: now_ms,
            last_played_ms: now_ms,
        }
    }

    pub fn minigame(&self, id: MinigameId) -> Option<&MinigameRecord> {
        self.minigames.get(&id)
    }

    pub fn minigame_mut(&mut self, id: MinigameId) -> &mut MinigameRecord {
        self.minigames
            .entry(id)
            .or_insert_with(|| MinigameRecord::new(id.unlocked_by_default()))
    }

    pub fn is_unlocked(&self, id: MinigameId) -> bool {
        self.minigame(id).is_some_and(|record| record.unlocked)
    }

    pub fn upgrade_level(&self, definition: &UpgradeDefinition) -> u32 {
        match definition.scope {
            UpgradeScope::Global => self.upgrades.get(definition.id).copied().unwrap_or(0),
            UpgradeScope::Minigame(minigame) => self
                .minigame(minigame)
                .map(|record| record.upgrade_level(definition.id))
                .unwrap_or(0),
        }
    }

    pub(crate) fn set_upgrade_level(&mut self, definition: &UpgradeDefinition, level: u32) {
        let levels = match definition.scope {
            UpgradeScope::Global => &mut self.upgrades,
            UpgradeScope::Minigame(minigame) => &mut self.minigame_mut(minigame).upgrades,
        };
        levels.insert(definition.id.to_string(), level);
    }

    /// Recomputes enabled automations from owned one-time upgrades.
    pub fn refresh_automations(&mut self, catalog: &UpgradeCatalog) {
        self.automations = catalog
            .iter()
            .filter(|definition| self.upgrade_level(definition) > 0)
            .filter_map(|definition| definition.enables)
            .collect();
    }

    pub fn is_automation_enabled(&self, automation: Automation) -> bool {
        self.automations.contains(&automation)
    }
}
