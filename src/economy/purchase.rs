use thiserror::Error;
use tracing::{debug, info};

use crate::Decimal;
use crate::core::{GameState, MinigameId, Resource};
use crate::data::{Automation, Rules, UpgradeScope};

use super::cost::level_cost;
use super::effects::describe_effect;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PurchaseError {
    #[error("unknown upgrade: {0}")]
    UnknownUpgrade(String),
    #[error("upgrade {0} is already at max level")]
    MaxLevel(String),
    #[error("cannot afford upgrade {0}")]
    InsufficientFunds(String),
    #[error("minigame {} is locked", .0.id())]
    MinigameLocked(MinigameId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseReceipt {
    pub upgrade_id: &'static str,
    pub new_level: u32,
    pub spent: Vec<(Resource, Decimal)>,
    /// Automation switched on by this purchase.
    pub enabled: Option<Automation>,
}

/// Buys one level of `upgrade_id`. Every cost is deducted together or not at
/// all; a failed purchase leaves `state` untouched.
pub fn purchase(
    rules: &Rules,
    state: &mut GameState,
    upgrade_id: &str,
) -> Result<PurchaseReceipt, PurchaseError> {
    let definition = rules
        .catalog
        .get(upgrade_id)
        .ok_or_else(|| PurchaseError::UnknownUpgrade(upgrade_id.to_string()))?;
    if let UpgradeScope::Minigame(minigame) = definition.scope {
        if !state.is_unlocked(minigame) {
            return Err(PurchaseError::MinigameLocked(minigame));
        }
    }

    let level = state.upgrade_level(definition);
    if definition.is_maxed(level) {
        return Err(PurchaseError::MaxLevel(upgrade_id.to_string()));
    }
    let costs = level_cost(definition, level);
    if !state.ledger.try_subtract_all(&costs) {
        debug!(upgrade = upgrade_id, level, "purchase rejected: insufficient funds");
        return Err(PurchaseError::InsufficientFunds(upgrade_id.to_string()));
    }

    let new_level = level + 1;
    state.set_upgrade_level(definition, new_level);
    let enabled = if level == 0 { definition.enables } else { None };
    if let Some(automation) = enabled {
        state.automations.insert(automation);
        info!(automation = automation.label(), "automation enabled");
    }
    info!(upgrade = upgrade_id, new_level, "upgrade purchased");

    Ok(PurchaseReceipt {
        upgrade_id: definition.id,
        new_level,
        spent: costs,
        enabled,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpgradeDisplayInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub level: u32,
    /// 0 means unlimited.
    pub max_level: u32,
    /// Empty once maxed.
    pub next_costs: Vec<(Resource, Decimal)>,
    pub effect_description: String,
    pub can_afford: bool,
    pub is_maxed: bool,
}

pub fn display_info(rules: &Rules, state: &GameState, upgrade_id: &str) -> Option<UpgradeDisplayInfo> {
    let definition = rules.catalog.get(upgrade_id)?;
    let level = state.upgrade_level(definition);
    let is_maxed = definition.is_maxed(level);
    let next_costs = if is_maxed {
        Vec::new()
    } else {
        level_cost(definition, level)
    };
    let effect_description = if is_maxed {
        describe_effect(definition, level)
    } else {
        format!(
            "{} -> {}",
            describe_effect(definition, level),
            describe_effect(definition, level + 1)
        )
    };
    let unlocked = match definition.scope {
        UpgradeScope::Global => true,
        UpgradeScope::Minigame(minigame) => state.is_unlocked(minigame),
    };

    Some(UpgradeDisplayInfo {
        id: definition.id,
        name: definition.name,
        level,
        max_level: definition.max_level,
        can_afford: !is_maxed && unlocked && state.ledger.can_afford_all(&next_costs),
        next_costs,
        effect_description,
        is_maxed,
    })
}
