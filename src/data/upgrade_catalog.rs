use serde::{Deserialize, Serialize};

use crate::Decimal;
use crate::core::{MinigameId, Resource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpgradeCategory {
    /// Repeatable, `base × growth^level`.
    Scaling,
    /// Repeatable, `base + increment × level`.
    Linear,
    /// Bought once at a fixed price.
    OneTime,
    /// Repeatable, two resources each on their own scaling curve.
    DualCurrency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpgradeScope {
    Global,
    Minigame(MinigameId),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostSpec {
    pub resource: Resource,
    pub base: Decimal,
    /// Growth rate for scaling curves, per-level increment for linear ones.
    pub growth: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    /// Summed into the generation multiplier.
    GenerationBonus,
    /// Multiplied into the generation multiplier.
    GenerationMultiplier,
    OfflineEfficiencyBonus,
    /// Extra seconds on a timed minigame.
    TimeBonus,
    SpeedBonus,
    Hint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectCurve {
    /// `base + delta × level`; identity 0.
    Additive,
    /// `base × delta^level`; identity 1.
    Compounding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Automation {
    AutoBreaker,
    AutoRunner,
}

impl Automation {
    pub fn label(self) -> &'static str {
        match self {
            Self::AutoBreaker => "Auto-Breaker",
            Self::AutoRunner => "Auto-Runner",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpgradeDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub category: UpgradeCategory,
    pub scope: UpgradeScope,
    /// One entry, or two for dual-currency upgrades.
    pub costs: Vec<CostSpec>,
    pub effect: EffectKind,
    pub curve: EffectCurve,
    pub base_effect: Decimal,
    pub effect_delta: Decimal,
    /// 0 means unlimited.
    pub max_level: u32,
    /// Automation switched on by the first purchase.
    pub enables: Option<Automation>,
}

impl UpgradeDefinition {
    pub fn is_maxed(&self, level: u32) -> bool {
        self.max_level != 0 && level >= self.max_level
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpgradeCatalog {
    definitions: Vec<UpgradeDefinition>,
}

impl UpgradeCatalog {
    pub fn new(definitions: Vec<UpgradeDefinition>) -> Self {
        Self { definitions }
    }

    /// The upgrades shipped with the game. `default_growth` prices the
    /// scaling upgrades that do not carry their own curve.
    pub fn builtin(default_growth: f64) -> Self {
        let default_growth = num(default_growth);
        let credits = |base: f64, growth: Decimal| CostSpec {
            resource: Resource::Credits,
            base: num(base),
            growth,
        };
        let technique = |base: f64, growth: f64| CostSpec {
            resource: Resource::TechniquePoints,
            base: num(base),
            growth: num(growth),
        };
        let renown = |base: f64, growth: f64| CostSpec {
            resource: Resource::RenownPoints,
            base: num(base),
            growth: num(growth),
        };

        Self::new(vec![
            UpgradeDefinition {
                id: "autoTyper",
                name: "Auto-Typer",
                category: UpgradeCategory::Scaling,
                scope: UpgradeScope::Global,
                costs: vec![credits(15.0, default_growth)],
                effect: EffectKind::GenerationBonus,
                curve: EffectCurve::Additive,
                base_effect: Decimal::ZERO,
                effect_delta: num(0.1),
                max_level: 0,
                enables: None,
            },
            UpgradeDefinition {
                id: "mechanicalKeyboard",
                name: "Mechanical Keyboard",
                category: UpgradeCategory::Linear,
                scope: UpgradeScope::Global,
                costs: vec![credits(50.0, num(25.0))],
                effect: EffectKind::GenerationBonus,
                curve: EffectCurve::Additive,
                base_effect: Decimal::ZERO,
                effect_delta: num(0.05),
                max_level: 20,
                enables: None,
            },
            UpgradeDefinition {
                id: "overclock",
                name: "Overclock",
                category: UpgradeCategory::Scaling,
                scope: UpgradeScope::Global,
                costs: vec![credits(250.0, num(1.25))],
                effect: EffectKind::GenerationMultiplier,
                curve: EffectCurve::Compounding,
                base_effect: Decimal::ONE,
                effect_delta: num(1.05),
                max_level: 0,
                enables: None,
            },
            UpgradeDefinition {
                id: "neuralLink",
                name: "Neural Link",
                category: UpgradeCategory::DualCurrency,
                scope: UpgradeScope::Global,
                costs: vec![credits(1_000.0, num(1.5)), technique(5.0, 1.3)],
                effect: EffectKind::GenerationMultiplier,
                curve: EffectCurve::Compounding,
                base_effect: Decimal::ONE,
                effect_delta: num(1.1),
                max_level: 25,
                enables: None,
            },
            UpgradeDefinition {
                id: "offlineCache",
                name: "Offline Cache",
                category: UpgradeCategory::Linear,
                scope: UpgradeScope::Global,
                costs: vec![renown(10.0, 10.0)],
                effect: EffectKind::OfflineEfficiencyBonus,
                curve: EffectCurve::Additive,
                base_effect: Decimal::ZERO,
                effect_delta: num(0.05),
                max_level: 5,
                enables: None,
            },
            UpgradeDefinition {
                id: "breakerDaemon",
                name: "Breaker Daemon",
                category: UpgradeCategory::OneTime,
                scope: UpgradeScope::Global,
                costs: vec![credits(2_500.0, Decimal::ONE)],
                effect: EffectKind::Hint,
                curve: EffectCurve::Additive,
                base_effect: Decimal::ONE,
                effect_delta: Decimal::ZERO,
                max_level: 1,
                enables: Some(Automation::AutoBreaker),
            },
            UpgradeDefinition {
                id: "runnerDaemon",
                name: "Runner Daemon",
                category: UpgradeCategory::OneTime,
                scope: UpgradeScope::Global,
                costs: vec![renown(10.0, 1.0)],
                effect: EffectKind::Hint,
                curve: EffectCurve::Additive,
                base_effect: Decimal::ONE,
                effect_delta: Decimal::ZERO,
                max_level: 1,
                enables: Some(Automation::AutoRunner),
            },
            UpgradeDefinition {
                id: "extendedTimer",
                name: "Extended Timer",
                category: UpgradeCategory::Scaling,
                scope: UpgradeScope::Minigame(MinigameId::CodeBreaker),
                costs: vec![technique(3.0, 1.4)],
                effect: EffectKind::TimeBonus,
                curve: EffectCurve::Additive,
                base_effect: Decimal::ZERO,
                effect_delta: num(0.5),
                max_level: 10,
                enables: None,
            },
            UpgradeDefinition {
                id: "patternHint",
                name: "Pattern Hint",
                category: UpgradeCategory::OneTime,
                scope: UpgradeScope::Minigame(MinigameId::CodeBreaker),
                costs: vec![technique(10.0, 1.0)],
                effect: EffectKind::Hint,
                curve: EffectCurve::Additive,
                base_effect: Decimal::ONE,
                effect_delta: Decimal::ZERO,
                max_level: 1,
                enables: None,
            },
            UpgradeDefinition {
                id: "sprintBoots",
                name: "Sprint Boots",
                category: UpgradeCategory::Linear,
                scope: UpgradeScope::Minigame(MinigameId::CodeRunner),
                costs: vec![technique(2.0, 2.0)],
                effect: EffectKind::SpeedBonus,
                curve: EffectCurve::Additive,
                base_effect: Decimal::ZERO,
                effect_delta: num(0.05),
                max_level: 10,
                enables: None,
            },
        ])
    }

    pub fn get(&self, id: &str) -> Option<&UpgradeDefinition> {
        self.definitions.iter().find(|definition| definition.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &UpgradeDefinition> {
        self.definitions.iter()
    }

    pub fn for_scope(&self, scope: UpgradeScope) -> impl Iterator<Item = &UpgradeDefinition> {
        self.definitions
            .iter()
            .filter(move |definition| definition.scope == scope)
    }
}

fn num(value: f64) -> Decimal {
    Decimal::try_from(value).unwrap_or_default()
}
