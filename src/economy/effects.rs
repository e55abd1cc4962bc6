use crate::Decimal;
use crate::core::{GameState, MinigameId};
use crate::data::{
    EffectCurve, EffectKind, Rules, UpgradeCatalog, UpgradeDefinition, UpgradeScope,
};

/// `base + delta × level`.
pub fn additive_effect(base: Decimal, delta: Decimal, level: u32) -> Decimal {
    base + delta * Decimal::from(level)
}

/// `base × growth^level`.
pub fn compounding_effect(base: Decimal, growth: Decimal, level: u32) -> Decimal {
    base * growth.pow(u64::from(level))
}

/// Effect of `definition` at `level`; an unowned upgrade yields its curve's
/// identity (0 additive, 1 compounding).
pub fn effect_at(definition: &UpgradeDefinition, level: u32) -> Decimal {
    match (definition.curve, level) {
        (EffectCurve::Additive, 0) => Decimal::ZERO,
        (EffectCurve::Compounding, 0) => Decimal::ONE,
        (EffectCurve::Additive, _) => {
            additive_effect(definition.base_effect, definition.effect_delta, level)
        }
        (EffectCurve::Compounding, _) => {
            compounding_effect(definition.base_effect, definition.effect_delta, level)
        }
    }
}

fn owned_effects<'a>(
    state: &'a GameState,
    catalog: &'a UpgradeCatalog,
    scope: UpgradeScope,
    kind: EffectKind,
) -> impl Iterator<Item = Decimal> + 'a {
    catalog
        .for_scope(scope)
        .filter(move |definition| definition.effect == kind)
        .map(move |definition| effect_at(definition, state.upgrade_level(definition)))
}

/// `(1 + Σ generation bonuses) × Π generation multipliers`.
pub fn generation_multiplier(state: &GameState, catalog: &UpgradeCatalog) -> Decimal {
    let bonus: Decimal =
        owned_effects(state, catalog, UpgradeScope::Global, EffectKind::GenerationBonus).sum();
    let product = owned_effects(
        state,
        catalog,
        UpgradeScope::Global,
        EffectKind::GenerationMultiplier,
    )
    .fold(Decimal::ONE, |acc, factor| acc * factor);
    (Decimal::ONE + bonus) * product
}

/// Configured efficiency plus upgrade bonuses, held below the configured cap.
pub fn offline_efficiency(state: &GameState, rules: &Rules) -> Decimal {
    let base = Decimal::try_from(rules.config.offline_efficiency).unwrap_or_default();
    let cap = Decimal::try_from(rules.config.offline_efficiency_cap).unwrap_or_default();
    let bonus: Decimal = owned_effects(
        state,
        &rules.catalog,
        UpgradeScope::Global,
        EffectKind::OfflineEfficiencyBonus,
    )
    .sum();
    (base + bonus).min(cap)
}

/// Sum of a minigame's local upgrade effects of one kind, e.g. extra timer
/// seconds for Code Breaker.
pub fn minigame_effect(
    state: &GameState,
    catalog: &UpgradeCatalog,
    minigame: MinigameId,
    kind: EffectKind,
) -> Decimal {
    owned_effects(state, catalog, UpgradeScope::Minigame(minigame), kind).sum()
}

/// Short player-facing text for the effect at `level`.
pub fn describe_effect(definition: &UpgradeDefinition, level: u32) -> String {
    let value = effect_at(definition, level);
    match definition.effect {
        EffectKind::GenerationBonus => format!("+{} generation", percent(value)),
        EffectKind::GenerationMultiplier => format!("x{} generation", value.format_human(2)),
        EffectKind::OfflineEfficiencyBonus => {
            format!("+{} offline efficiency", percent(value))
        }
        EffectKind::TimeBonus => format!("+{}s timer", value.format_human(1)),
        EffectKind::SpeedBonus => format!("+{} speed", percent(value)),
        EffectKind::Hint => match (definition.enables, level) {
            (Some(automation), 0) => format!("{} disabled", automation.label()),
            (Some(automation), _) => format!("{} enabled", automation.label()),
            (None, 0) => "no hints".to_string(),
            (None, _) => "pattern hints shown".to_string(),
        },
    }
}

fn percent(value: Decimal) -> String {
    if value.is_zero() {
        "0%".to_string()
    } else {
        value.format_percent(0)
    }
}

#[cfg(test)]
mod tests {
    use super::{describe_effect, effect_at, generation_multiplier, minigame_effect};
    use crate::Decimal;
    use crate::core::{GameState, MinigameId};
    use crate::data::{EffectKind, Rules};

    fn d(text: &str) -> Decimal {
        text.parse().expect("valid decimal literal")
    }

    #[test]
    fn level_zero_is_identity() {
        let rules = Rules::default();
        let typer = rules.catalog.get("autoTyper").expect("autoTyper");
        let overclock = rules.catalog.get("overclock").expect("overclock");
        assert!(effect_at(typer, 0).is_zero());
        assert_eq!(effect_at(overclock, 0), Decimal::ONE);
    }

    #[test]
    fn curves_scale_with_level() {
        let rules = Rules::default();
        let keyboard = rules.catalog.get("mechanicalKeyboard").expect("keyboard");
        let overclock = rules.catalog.get("overclock").expect("overclock");
        assert!(effect_at(keyboard, 4).approx_eq(d("0.2"), 1e-12));
        assert!(effect_at(overclock, 2).approx_eq(d("1.1025"), 1e-12));
    }

    #[test]
    fn multiplier_combines_bonuses_and_factors() {
        let rules = Rules::default();
        let mut state = GameState::new_game(0);
        assert_eq!(generation_multiplier(&state, &rules.catalog), Decimal::ONE);

        state.upgrades.insert("autoTyper".to_string(), 3);
        state.upgrades.insert("mechanicalKeyboard".to_string(), 2);
        state.upgrades.insert("overclock".to_string(), 1);
        // (1 + 0.3 + 0.1) × 1.05
        let multiplier = generation_multiplier(&state, &rules.catalog);
        assert!(multiplier.approx_eq(d("1.47"), 1e-12), "got {multiplier}");
    }

    #[test]
    fn minigame_effects_stay_local() {
        let rules = Rules::default();
        let mut state = GameState::new_game(0);
        state
            .minigame_mut(MinigameId::CodeBreaker)
            .upgrades
            .insert("extendedTimer".to_string(), 4);

        let bonus = minigame_effect(
            &state,
            &rules.catalog,
            MinigameId::CodeBreaker,
            EffectKind::TimeBonus,
        );
        assert_eq!(bonus, d("2"));
        assert!(
            minigame_effect(
                &state,
                &rules.catalog,
                MinigameId::CodeRunner,
                EffectKind::TimeBonus
            )
            .is_zero()
        );
        assert_eq!(generation_multiplier(&state, &rules.catalog), Decimal::ONE);
    }

    #[test]
    fn descriptions_read_naturally() {
        let rules = Rules::default();
        let typer = rules.catalog.get("autoTyper").expect("autoTyper");
        let daemon = rules.catalog.get("breakerDaemon").expect("daemon");
        assert_eq!(describe_effect(typer, 2), "+20% generation");
        assert_eq!(describe_effect(daemon, 1), "Auto-Breaker enabled");
    }
}
