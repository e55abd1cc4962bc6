use std::collections::BTreeMap;

use crate::Decimal;
use crate::data::Rules;
use crate::economy::generation_multiplier;

use super::minigame::MinigameId;
use super::resource_store::{Resource, ResourceAmounts};
use super::state::GameState;

/// How the credit rate was put together; for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationBreakdown {
    pub per_minigame_contribution: BTreeMap<MinigameId, Decimal>,
    pub base_rate: Decimal,
    pub multiplier: Decimal,
    pub final_rate: Decimal,
}

/// Recomputed from scratch on every call so score reports and purchases are
/// visible immediately.
pub fn generation_breakdown(state: &GameState, rules: &Rules) -> GenerationBreakdown {
    let divisor = Decimal::try_from(rules.config.score_to_rate_divisor).unwrap_or(Decimal::ONE);
    let per_minigame_contribution: BTreeMap<MinigameId, Decimal> = state
        .minigames
        .iter()
        .filter(|(id, _)| rules.config.is_generation_eligible(**id))
        .map(|(&id, record)| {
            let contribution = record
                .top_score_sum()
                .checked_div(divisor)
                .unwrap_or(Decimal::ZERO);
            (id, contribution)
        })
        .collect();

    let base_rate: Decimal = per_minigame_contribution.values().sum();
    let multiplier = generation_multiplier(state, &rules.catalog);
    GenerationBreakdown {
        per_minigame_contribution,
        base_rate,
        multiplier,
        final_rate: base_rate * multiplier,
    }
}

/// Per-second generation for every resource. Only credits are generated;
/// the other resources come from minigame rewards.
pub fn generation_rates(state: &GameState, rules: &Rules) -> ResourceAmounts {
    let mut rates = ResourceAmounts::default();
    rates.set(
        Resource::Credits,
        generation_breakdown(state, rules).final_rate,
    );
    rates
}

pub fn current_rate(state: &GameState, rules: &Rules, resource: Resource) -> Decimal {
    generation_rates(state, rules).get(resource)
}

/// `rate × seconds`; non-positive or non-finite durations earn nothing.
pub fn calculate_generation_over_time(rate: Decimal, seconds: f64) -> Decimal {
    if !(seconds > 0.0) {
        return Decimal::ZERO;
    }
    match Decimal::try_from(seconds) {
        Ok(seconds) => rate * seconds,
        Err(_) => Decimal::ZERO,
    }
}
