mod cost;
mod effects;
mod purchase;

pub use cost::{
    MAX_AFFORDABLE_SCAN, calculate_affordable_levels, calculate_bulk_cost, calculate_cost,
    calculate_linear_cost, level_cost,
};
pub use effects::{
    additive_effect, compounding_effect, describe_effect, effect_at, generation_multiplier,
    minigame_effect, offline_efficiency,
};
pub use purchase::{PurchaseError, PurchaseReceipt, UpgradeDisplayInfo, display_info, purchase};
