use std::collections::BTreeMap;

use tracing::warn;

use crate::core::{GameState, MinigameId, MinigameRecord, Resource, Settings, Stats};
use crate::data::{Rules, UpgradeScope};

use super::model::{
    CURRENT_SAVE_VERSION, SaveMinigame, SaveSettings, SaveSnapshot, SaveStats,
};

pub fn snapshot_from_state(state: &GameState, saved_at_ms: i64) -> SaveSnapshot {
    let mut resources = BTreeMap::new();
    let mut total_resources_earned = BTreeMap::new();
    for resource in Resource::ALL {
        let balance = state.ledger.balance(resource);
        resources.insert(resource.id().to_string(), balance.current);
        total_resources_earned.insert(resource.id().to_string(), balance.lifetime);
    }

    let minigames = state
        .minigames
        .iter()
        .map(|(id, record)| {
            let saved = SaveMinigame {
                unlocked: record.unlocked,
                top_scores: record.top_scores.clone(),
                play_count: record.play_count,
                upgrades: record.upgrades.clone(),
            };
            (id.id().to_string(), saved)
        })
        .collect();

    SaveSnapshot {
        version: CURRENT_SAVE_VERSION.to_string(),
        last_saved: saved_at_ms,
        last_played: state.last_played_ms,
        resources,
        minigames,
        upgrades: state.upgrades.clone(),
        settings: SaveSettings {
            offline_progress_enabled: state.settings.offline_progress_enabled,
            player_name: state.settings.player_name.clone(),
        },
        stats: SaveStats {
            total_play_time: state.stats.total_play_time_ms,
            total_resources_earned,
        },
    }
}

/// Rebuilds live state from a validated snapshot. Ids this build does not
/// know are dropped with a warning and levels are clamped to their maximum.
pub fn state_from_snapshot(snapshot: &SaveSnapshot, rules: &Rules) -> GameState {
    let mut state = GameState::new_game(snapshot.last_played);
    state.last_saved_ms = snapshot.last_saved;

    for (id, &current) in &snapshot.resources {
        let Some(resource) = Resource::from_id(id) else {
            warn!(resource = %id, "dropping unknown resource from save");
            continue;
        };
        let lifetime = snapshot
            .stats
            .total_resources_earned
            .get(id)
            .copied()
            .unwrap_or(current);
        state.ledger.restore(resource, current, lifetime);
    }

    for (id, saved) in &snapshot.minigames {
        let Some(minigame) = MinigameId::from_id(id) else {
            warn!(minigame = %id, "dropping unknown minigame from save");
            continue;
        };
        let record = MinigameRecord {
            unlocked: saved.unlocked,
            top_scores: saved.top_scores.clone(),
            play_count: saved.play_count,
            upgrades: adopt_levels(rules, UpgradeScope::Minigame(minigame), &saved.upgrades),
        };
        state.minigames.insert(minigame, record);
    }

    state.upgrades = adopt_levels(rules, UpgradeScope::Global, &snapshot.upgrades);
    state.settings = Settings {
        offline_progress_enabled: snapshot.settings.offline_progress_enabled,
        player_name: snapshot.settings.player_name.clone(),
    };
    state.stats = Stats {
        total_play_time_ms: snapshot.stats.total_play_time,
    };
    state.refresh_automations(&rules.catalog);
    state
}

fn adopt_levels(
    rules: &Rules,
    scope: UpgradeScope,
    saved: &BTreeMap<String, u32>,
) -> BTreeMap<String, u32> {
    let mut levels = BTreeMap::new();
    for (id, &level) in saved {
        let Some(definition) = rules
            .catalog
            .get(id)
            .filter(|definition| definition.scope == scope)
        else {
            warn!(upgrade = %id, "dropping unknown upgrade from save");
            continue;
        };
        let clamped = if definition.max_level == 0 {
            level
        } else {
            level.min(definition.max_level)
        };
        if clamped != level {
            warn!(upgrade = %id, level, clamped, "clamping saved upgrade level");
        }
        levels.insert(id.clone(), clamped);
    }
    levels
}
