mod config;
mod loader;
mod upgrade_catalog;

use anyhow::Result;

pub use config::EngineConfig;
pub use loader::{load_config_from_path, load_config_from_str};
pub use upgrade_catalog::{
    Automation, CostSpec, EffectCurve, EffectKind, UpgradeCatalog, UpgradeCategory,
    UpgradeDefinition, UpgradeScope,
};

/// Everything about the game that is not player data: tunables plus the
/// compiled-in upgrade definitions.
#[derive(Debug, Clone, PartialEq)]
pub struct Rules {
    pub config: EngineConfig,
    pub catalog: UpgradeCatalog,
}

impl Rules {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let catalog = UpgradeCatalog::builtin(config.default_upgrade_growth_rate);
        Ok(Self { config, catalog })
    }
}

impl Default for Rules {
    fn default() -> Self {
        let config = EngineConfig::default();
        let catalog = UpgradeCatalog::builtin(config.default_upgrade_growth_rate);
        Self { config, catalog }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{EngineConfig, Rules, UpgradeCategory, load_config_from_str};

    #[test]
    fn builtin_catalog_is_consistent() {
        let rules = Rules::default();
        let mut seen = HashSet::new();
        for definition in rules.catalog.iter() {
            assert!(seen.insert(definition.id), "duplicate id {}", definition.id);
            let expected_costs = match definition.category {
                UpgradeCategory::DualCurrency => 2,
                _ => 1,
            };
            assert_eq!(definition.costs.len(), expected_costs, "{}", definition.id);
            if definition.category == UpgradeCategory::OneTime {
                assert_eq!(definition.max_level, 1, "{}", definition.id);
            }
        }
    }

    #[test]
    fn default_config_is_valid() {
        EngineConfig::default()
            .validate()
            .expect("defaults should validate");
    }

    #[test]
    fn config_overrides_merge_with_defaults() {
        let config = load_config_from_str(r#"{ "maxOfflineSeconds": 3600, "offlineEfficiency": 0.25 }"#)
            .expect("partial config should load");
        assert_eq!(config.max_offline_seconds, 3600.0);
        assert_eq!(config.offline_efficiency, 0.25);
        assert_eq!(config.top_score_cap, EngineConfig::default().top_score_cap);
    }

    #[test]
    fn out_of_range_config_is_rejected() {
        assert!(load_config_from_str(r#"{ "offlineEfficiency": 1.5 }"#).is_err());
        assert!(load_config_from_str(r#"{ "scoreToRateDivisor": 0 }"#).is_err());
        assert!(load_config_from_str(r#"{ "maxSaveSlots": 0 }"#).is_err());
        assert!(Rules::new(EngineConfig {
            top_score_cap: 0,
            ..EngineConfig::default()
        })
        .is_err());
    }
}
