use crate::Decimal;
use crate::core::Resource;
use crate::data::{CostSpec, UpgradeCategory, UpgradeDefinition};

/// Upper bound on levels examined by [`calculate_affordable_levels`].
pub const MAX_AFFORDABLE_SCAN: u32 = 10_000;

/// `base × growth^level`.
pub fn calculate_cost(base: Decimal, growth: Decimal, level: u32) -> Decimal {
    base * growth.pow(u64::from(level))
}

/// `base + increment × level`.
pub fn calculate_linear_cost(base: Decimal, increment: Decimal, level: u32) -> Decimal {
    base + increment * Decimal::from(level)
}

/// Literal sum of `count` consecutive scaling costs starting at `start_level`.
pub fn calculate_bulk_cost(base: Decimal, growth: Decimal, start_level: u32, count: u32) -> Decimal {
    (0..count)
        .map(|offset| calculate_cost(base, growth, start_level.saturating_add(offset)))
        .sum()
}

/// Largest `n` with `calculate_bulk_cost(base, growth, start_level, n) <= available`,
/// scanning at most [`MAX_AFFORDABLE_SCAN`] levels.
pub fn calculate_affordable_levels(
    base: Decimal,
    growth: Decimal,
    start_level: u32,
    available: Decimal,
) -> u32 {
    let mut total = Decimal::ZERO;
    let mut levels = 0;
    while levels < MAX_AFFORDABLE_SCAN {
        let next = total + calculate_cost(base, growth, start_level.saturating_add(levels));
        if next > available {
            break;
        }
        total = next;
        levels += 1;
    }
    levels
}

fn entry_cost(category: UpgradeCategory, entry: &CostSpec, level: u32) -> Decimal {
    match category {
        UpgradeCategory::Scaling | UpgradeCategory::DualCurrency => {
            calculate_cost(entry.base, entry.growth, level)
        }
        UpgradeCategory::Linear => calculate_linear_cost(entry.base, entry.growth, level),
        UpgradeCategory::OneTime => entry.base,
    }
}

/// Everything the level after `level` costs, one entry per resource.
pub fn level_cost(definition: &UpgradeDefinition, level: u32) -> Vec<(Resource, Decimal)> {
    definition
        .costs
        .iter()
        .map(|entry| (entry.resource, entry_cost(definition.category, entry, level)))
        .collect()
}
