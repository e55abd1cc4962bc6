use serde::{Deserialize, Serialize};
use tracing::error;

use crate::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Resource {
    Credits,
    TechniquePoints,
    RenownPoints,
}

impl Resource {
    pub const COUNT: usize = 3;
    pub const ALL: [Resource; Resource::COUNT] = [
        Resource::Credits,
        Resource::TechniquePoints,
        Resource::RenownPoints,
    ];

    pub fn index(self) -> usize {
        match self {
            Self::Credits => 0,
            Self::TechniquePoints => 1,
            Self::RenownPoints => 2,
        }
    }

    /// Key used in save files.
    pub fn id(self) -> &'static str {
        match self {
            Self::Credits => "credits",
            Self::TechniquePoints => "techniquePoints",
            Self::RenownPoints => "renownPoints",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|resource| resource.id() == id)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Credits => "credits",
            Self::TechniquePoints => "technique points",
            Self::RenownPoints => "renown",
        }
    }
}

/// One amount per resource.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResourceAmounts([Decimal; Resource::COUNT]);

impl ResourceAmounts {
    pub fn get(&self, resource: Resource) -> Decimal {
        self.0[resource.index()]
    }

    pub fn set(&mut self, resource: Resource, amount: Decimal) {
        self.0[resource.index()] = amount;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Resource, Decimal)> + '_ {
        Resource::ALL
            .into_iter()
            .map(|resource| (resource, self.get(resource)))
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(Decimal::is_zero)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Balance {
    pub current: Decimal,
    pub lifetime: Decimal,
}

/// Current and lifetime-earned amounts per resource. Current balances never
/// go negative; lifetime totals never decrease.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceLedger {
    balances: [Balance; Resource::COUNT],
}

impl ResourceLedger {
    pub fn balance(&self, resource: Resource) -> Balance {
        self.balances[resource.index()]
    }

    pub fn current(&self, resource: Resource) -> Decimal {
        self.balances[resource.index()].current
    }

    pub fn lifetime(&self, resource: Resource) -> Decimal {
        self.balances[resource.index()].lifetime
    }

    pub fn current_amounts(&self) -> ResourceAmounts {
        let mut amounts = ResourceAmounts::default();
        for resource in Resource::ALL {
            amounts.set(resource, self.current(resource));
        }
        amounts
    }

    pub fn add(&mut self, resource: Resource, amount: Decimal) {
        if !amount.is_positive() {
            return;
        }
        let balance = &mut self.balances[resource.index()];
        balance.current += amount;
        balance.lifetime += amount;
    }

    pub fn can_afford(&self, resource: Resource, amount: Decimal) -> bool {
        self.current(resource) >= amount
    }

    /// Deducts `amount` if affordable. Lifetime totals are untouched.
    pub fn try_subtract(&mut self, resource: Resource, amount: Decimal) -> bool {
        if amount.is_negative() || !self.can_afford(resource, amount) {
            return false;
        }
        let balance = &mut self.balances[resource.index()];
        balance.current = (balance.current - amount).non_negative();
        true
    }

    /// Affordability of a whole cost list; repeated resources are summed.
    pub fn can_afford_all(&self, costs: &[(Resource, Decimal)]) -> bool {
        let mut required = [Decimal::ZERO; Resource::COUNT];
        for &(resource, amount) in costs {
            if amount.is_negative() {
                return false;
            }
            required[resource.index()] += amount;
        }
        Resource::ALL
            .into_iter()
            .all(|resource| self.can_afford(resource, required[resource.index()]))
    }

    /// All-or-nothing deduction of every cost in the list.
    pub fn try_subtract_all(&mut self, costs: &[(Resource, Decimal)]) -> bool {
        if !self.can_afford_all(costs) {
            return false;
        }
        let mut deducted: Vec<(Resource, Decimal)> = Vec::with_capacity(costs.len());
        for &(resource, amount) in costs {
            if self.try_subtract(resource, amount) {
                deducted.push((resource, amount));
                continue;
            }
            // Unreachable while purchases run on one thread; refund so the
            // ledger stays whole, but make the broken invariant loud.
            error!(
                resource = resource.id(),
                %amount,
                "deduction failed after affordability check; refunding"
            );
            for (refund_resource, refund_amount) in deducted {
                self.balances[refund_resource.index()].current += refund_amount;
            }
            debug_assert!(false, "multi-resource deduction failed after check");
            return false;
        }
        true
    }

    /// Overwrites a balance wholesale; used when adopting a loaded save.
    pub(crate) fn restore(&mut self, resource: Resource, current: Decimal, lifetime: Decimal) {
        self.balances[resource.index()] = Balance {
            current: current.non_negative(),
            lifetime: lifetime.max(current).non_negative(),
        };
    }
}
