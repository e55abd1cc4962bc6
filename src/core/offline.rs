use tracing::{info, warn};

use crate::Decimal;
use crate::data::Rules;
use crate::economy::offline_efficiency;

use super::rates::{calculate_generation_over_time, generation_rates};
use super::resource_store::{Resource, ResourceAmounts, ResourceLedger};
use super::state::GameState;

#[derive(Debug, Clone, PartialEq)]
pub struct OfflineProgressResult {
    /// False when offline progress is switched off in settings.
    pub was_calculated: bool,
    pub should_show_modal: bool,
    pub was_capped: bool,
    /// Seconds credited, after the cap.
    pub elapsed_seconds: f64,
    pub efficiency: Decimal,
    pub earnings: ResourceAmounts,
}

impl OfflineProgressResult {
    fn skipped() -> Self {
        Self {
            was_calculated: false,
            should_show_modal: false,
            was_capped: false,
            elapsed_seconds: 0.0,
            efficiency: Decimal::ZERO,
            earnings: ResourceAmounts::default(),
        }
    }
}

/// Earnings for the time between `last_played_ms` and `now_ms`, capped and
/// scaled by offline efficiency. Does not touch the ledger.
pub fn calculate_offline_progress(
    state: &GameState,
    rules: &Rules,
    last_played_ms: i64,
    now_ms: i64,
) -> OfflineProgressResult {
    if !state.settings.offline_progress_enabled {
        return OfflineProgressResult::skipped();
    }
    let config = &rules.config;
    let raw_seconds = now_ms.saturating_sub(last_played_ms).max(0) as f64 / 1_000.0;
    let was_capped = raw_seconds > config.max_offline_seconds;
    let elapsed_seconds = raw_seconds.min(config.max_offline_seconds);
    let efficiency = offline_efficiency(state, rules);

    let mut earnings = ResourceAmounts::default();
    for (resource, rate) in generation_rates(state, rules).iter() {
        earnings.set(
            resource,
            calculate_generation_over_time(rate, elapsed_seconds) * efficiency,
        );
    }

    OfflineProgressResult {
        was_calculated: true,
        should_show_modal: raw_seconds >= config.offline_modal_min_seconds && !earnings.is_zero(),
        was_capped,
        elapsed_seconds,
        efficiency,
        earnings,
    }
}

pub fn apply_offline_progress(ledger: &mut ResourceLedger, result: &OfflineProgressResult) {
    for (resource, amount) in result.earnings.iter() {
        ledger.add(resource, amount);
    }
}

/// Per-session offline catch-up. The calculation runs once; a result that
/// needs confirmation is held until `confirm` or `dismiss` clears it.
#[derive(Debug, Default)]
pub struct OfflineProgress {
    pending: Option<OfflineProgressResult>,
    resolved: bool,
}

impl OfflineProgress {
    /// Computes the catch-up since `state.last_played_ms` and moves the
    /// baseline to `now_ms`. Short absences are credited straight away.
    pub fn resume(
        &mut self,
        state: &mut GameState,
        rules: &Rules,
        now_ms: i64,
    ) -> Option<OfflineProgressResult> {
        if self.resolved {
            warn!("offline progress already resolved this session");
            return None;
        }
        self.resolved = true;

        let result = calculate_offline_progress(state, rules, state.last_played_ms, now_ms);
        state.last_played_ms = now_ms;
        if result.should_show_modal {
            info!(
                seconds = result.elapsed_seconds,
                capped = result.was_capped,
                "offline progress awaiting confirmation"
            );
            self.pending = Some(result.clone());
        } else if result.was_calculated {
            apply_offline_progress(&mut state.ledger, &result);
            info!(
                seconds = result.elapsed_seconds,
                credits = %result.earnings.get(Resource::Credits),
                "applied offline progress"
            );
        }
        Some(result)
    }

    pub fn pending(&self) -> Option<&OfflineProgressResult> {
        self.pending.as_ref()
    }

    /// Applies the pending result exactly once.
    pub fn confirm(&mut self, ledger: &mut ResourceLedger) -> Option<OfflineProgressResult> {
        let Some(result) = self.pending.take() else {
            warn!("no pending offline progress to confirm");
            return None;
        };
        apply_offline_progress(ledger, &result);
        info!(
            credits = %result.earnings.get(Resource::Credits),
            "confirmed offline progress"
        );
        Some(result)
    }

    pub fn dismiss(&mut self) -> bool {
        self.pending.take().is_some()
    }
}
