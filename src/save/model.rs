use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Decimal;
use crate::core::{DEFAULT_PLAYER_NAME, Resource};

pub const CURRENT_SAVE_VERSION: &str = "1.2.0";

/// On-disk save shape. Decimal fields serialize as strings; map keys are the
/// string ids of resources, minigames and upgrades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSnapshot {
    pub version: String,
    pub last_saved: i64,
    pub last_played: i64,
    pub resources: BTreeMap<String, Decimal>,
    pub minigames: BTreeMap<String, SaveMinigame>,
    pub upgrades: BTreeMap<String, u32>,
    pub settings: SaveSettings,
    pub stats: SaveStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveMinigame {
    pub unlocked: bool,
    pub top_scores: Vec<Decimal>,
    pub play_count: u64,
    pub upgrades: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSettings {
    pub offline_progress_enabled: bool,
    #[serde(default = "default_player_name")]
    pub player_name: String,
}

impl Default for SaveSettings {
    fn default() -> Self {
        Self {
            offline_progress_enabled: true,
            player_name: default_player_name(),
        }
    }
}

fn default_player_name() -> String {
    DEFAULT_PLAYER_NAME.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveStats {
    /// Milliseconds.
    pub total_play_time: f64,
    pub total_resources_earned: BTreeMap<String, Decimal>,
}

/// Slot-picker summary, always derived from a stored snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveSlotMetadata {
    pub slot: usize,
    pub player_name: String,
    pub last_played: i64,
    pub total_play_time: f64,
    pub credits: Decimal,
}

impl SaveSlotMetadata {
    pub fn from_snapshot(slot: usize, snapshot: &SaveSnapshot) -> Self {
        Self {
            slot,
            player_name: snapshot.settings.player_name.clone(),
            last_played: snapshot.last_played,
            total_play_time: snapshot.stats.total_play_time,
            credits: snapshot
                .resources
                .get(Resource::Credits.id())
                .copied()
                .unwrap_or_default(),
        }
    }
}
