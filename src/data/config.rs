use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::core::MinigameId;

/// Tunables for the economy engine. Every field has a default, so a config
/// file only needs the keys it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Sum of top scores is divided by this to get the base credit rate.
    pub score_to_rate_divisor: f64,
    pub generation_eligible: Vec<MinigameId>,
    pub top_score_cap: usize,
    pub max_offline_seconds: f64,
    pub offline_efficiency: f64,
    /// Upper bound for efficiency once upgrade bonuses are added.
    pub offline_efficiency_cap: f64,
    pub offline_modal_min_seconds: f64,
    pub auto_save_interval_ms: f64,
    pub max_frame_delta_ms: f64,
    pub display_interval_ms: f64,
    pub default_upgrade_growth_rate: f64,
    pub max_save_slots: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            score_to_rate_divisor: 100.0,
            generation_eligible: vec![MinigameId::CodeBreaker, MinigameId::CodeRunner],
            top_score_cap: 5,
            max_offline_seconds: 8.0 * 60.0 * 60.0,
            offline_efficiency: 0.5,
            offline_efficiency_cap: 0.95,
            offline_modal_min_seconds: 60.0,
            auto_save_interval_ms: 30_000.0,
            max_frame_delta_ms: 1_000.0,
            display_interval_ms: 1_000.0,
            default_upgrade_growth_rate: 1.15,
            max_save_slots: 3,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.score_to_rate_divisor.is_finite() && self.score_to_rate_divisor > 0.0) {
            bail!("scoreToRateDivisor must be a positive number");
        }
        if self.top_score_cap == 0 {
            bail!("topScoreCap must be at least 1");
        }
        if !(self.max_offline_seconds.is_finite() && self.max_offline_seconds >= 0.0) {
            bail!("maxOfflineSeconds must be a non-negative number");
        }
        if !(0.0..1.0).contains(&self.offline_efficiency) {
            bail!("offlineEfficiency must be within [0, 1)");
        }
        if !(self.offline_efficiency..1.0).contains(&self.offline_efficiency_cap) {
            bail!("offlineEfficiencyCap must be within [offlineEfficiency, 1)");
        }
        if !(self.offline_modal_min_seconds.is_finite() && self.offline_modal_min_seconds >= 0.0) {
            bail!("offlineModalMinSeconds must be a non-negative number");
        }
        for (name, value) in [
            ("autoSaveIntervalMs", self.auto_save_interval_ms),
            ("maxFrameDeltaMs", self.max_frame_delta_ms),
            ("displayIntervalMs", self.display_interval_ms),
        ] {
            if !(value.is_finite() && value > 0.0) {
                bail!("{name} must be a positive number");
            }
        }
        if !(self.default_upgrade_growth_rate.is_finite() && self.default_upgrade_growth_rate >= 1.0)
        {
            bail!("defaultUpgradeGrowthRate must be at least 1");
        }
        if self.max_save_slots == 0 {
            bail!("maxSaveSlots must be at least 1");
        }
        Ok(())
    }

    pub fn is_generation_eligible(&self, minigame: MinigameId) -> bool {
        self.generation_eligible.contains(&minigame)
    }
}
