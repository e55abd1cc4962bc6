use anyhow::Result;
use tracing::{info, warn};

use crate::Decimal;
use crate::DecimalError;
use crate::core::{
    DisplayUpdate, FrameHandle, FrameReport, GameState, GenerationBreakdown, MinigameId,
    OfflineProgress, OfflineProgressResult, Resource, Scheduler, SubscriptionId, TickEngine,
    TickState, calculate_offline_progress, current_rate, generation_breakdown, insert_score,
};
use crate::data::{EffectKind, Rules};
use crate::economy::{UpgradeDisplayInfo, display_info, minigame_effect, purchase};
use crate::save::{SaveStorage, SaveSystem, snapshot_from_state, state_from_snapshot};

/// Owns everything one running game needs: rules, live state, the tick
/// engine, offline catch-up and the save slots.
pub struct GameSession<S: SaveStorage, F: Scheduler> {
    rules: Rules,
    state: GameState,
    saves: SaveSystem<S>,
    slot: usize,
    ticker: TickEngine<F>,
    offline: OfflineProgress,
    next_autosave_ms: Option<f64>,
    last_save_error: Option<String>,
}

impl<S: SaveStorage, F: Scheduler> GameSession<S, F> {
    /// Loads `slot`, or starts a new game if it is empty or unreadable.
    pub fn open(
        rules: Rules,
        mut saves: SaveSystem<S>,
        scheduler: F,
        slot: usize,
        now_ms: i64,
    ) -> Result<Self> {
        saves.init()?;
        saves.slot_key(slot)?;
        let state = match saves.load(slot) {
            Some(snapshot) => {
                info!(slot, "loaded save");
                state_from_snapshot(&snapshot, &rules)
            }
            None => {
                info!(slot, "starting a new game");
                GameState::new_game(now_ms)
            }
        };
        let ticker = TickEngine::new(scheduler, &rules.config);
        Ok(Self {
            rules,
            state,
            saves,
            slot,
            ticker,
            offline: OfflineProgress::default(),
            next_autosave_ms: None,
            last_save_error: None,
        })
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn saves(&self) -> &SaveSystem<S> {
        &self.saves
    }

    pub fn saves_mut(&mut self) -> &mut SaveSystem<S> {
        &mut self.saves
    }

    pub fn last_save_error(&self) -> Option<&str> {
        self.last_save_error.as_deref()
    }

    // Minigame surface.

    /// Records a finished run. Returns the rank the score took in the top
    /// list, or `None` if it did not place or the minigame is locked.
    pub fn report_score(
        &mut self,
        minigame: MinigameId,
        score: &str,
    ) -> Result<Option<usize>, DecimalError> {
        let score: Decimal = score.parse()?;
        if score.is_negative() {
            warn!(minigame = minigame.id(), %score, "ignoring negative score");
            return Ok(None);
        }
        if !self.state.is_unlocked(minigame) {
            warn!(minigame = minigame.id(), "ignoring score for locked minigame");
            return Ok(None);
        }
        let cap = self.rules.config.top_score_cap;
        let rank = insert_score(&mut self.state.minigame_mut(minigame).top_scores, score, cap);
        if let Some(rank) = rank {
            info!(minigame = minigame.id(), %score, rank, "new top score");
        }
        Ok(rank)
    }

    pub fn is_unlocked(&self, minigame: MinigameId) -> bool {
        self.state.is_unlocked(minigame)
    }

    /// Returns true if the minigame was locked before.
    pub fn unlock_minigame(&mut self, minigame: MinigameId) -> bool {
        let record = self.state.minigame_mut(minigame);
        if record.unlocked {
            return false;
        }
        record.unlocked = true;
        info!(minigame = minigame.id(), "minigame unlocked");
        true
    }

    pub fn increment_play_count(&mut self, minigame: MinigameId) -> u64 {
        let record = self.state.minigame_mut(minigame);
        record.play_count += 1;
        record.play_count
    }

    /// Minigame reward payout, e.g. technique points for a cleared puzzle.
    pub fn award(&mut self, resource: Resource, amount: Decimal) {
        self.state.ledger.add(resource, amount);
    }

    pub fn minigame_bonus(&self, minigame: MinigameId, kind: EffectKind) -> Decimal {
        minigame_effect(&self.state, &self.rules.catalog, minigame, kind)
    }

    // Rates and upgrades.

    pub fn current_rate(&self, resource: Resource) -> String {
        current_rate(&self.state, &self.rules, resource).to_string()
    }

    pub fn generation_breakdown(&self) -> GenerationBreakdown {
        generation_breakdown(&self.state, &self.rules)
    }

    pub fn purchase(&mut self, upgrade_id: &str) -> bool {
        match purchase(&self.rules, &mut self.state, upgrade_id) {
            Ok(_) => true,
            Err(error) => {
                info!(upgrade = upgrade_id, %error, "purchase refused");
                false
            }
        }
    }

    pub fn display_info(&self, upgrade_id: &str) -> Option<UpgradeDisplayInfo> {
        display_info(&self.rules, &self.state, upgrade_id)
    }

    // Offline progress.

    pub fn calculate_offline_progress(&self, last_played_ms: i64, now_ms: i64) -> OfflineProgressResult {
        calculate_offline_progress(&self.state, &self.rules, last_played_ms, now_ms)
    }

    /// Runs the once-per-session catch-up since the last played time.
    pub fn resume_offline(&mut self, now_ms: i64) -> Option<OfflineProgressResult> {
        self.offline.resume(&mut self.state, &self.rules, now_ms)
    }

    pub fn pending_offline(&self) -> Option<&OfflineProgressResult> {
        self.offline.pending()
    }

    pub fn confirm_offline(&mut self) -> bool {
        self.offline.confirm(&mut self.state.ledger).is_some()
    }

    pub fn dismiss_offline(&mut self) -> bool {
        self.offline.dismiss()
    }

    // Tick control.

    pub fn tick_state(&self) -> TickState {
        self.ticker.state()
    }

    pub fn start(&mut self) -> bool {
        self.ticker.start()
    }

    pub fn stop(&mut self) {
        self.ticker.stop();
    }

    pub fn pause(&mut self) -> bool {
        self.ticker.pause()
    }

    pub fn resume(&mut self) -> bool {
        self.ticker.resume()
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&DisplayUpdate) + 'static) -> SubscriptionId {
        self.ticker.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.ticker.unsubscribe(id)
    }

    pub fn scheduler_mut(&mut self) -> &mut F {
        self.ticker.scheduler_mut()
    }

    /// One host frame: accumulate generation, then autosave when due. The
    /// commit finishes before the save reads state.
    pub fn on_frame(&mut self, handle: FrameHandle, now_ms: f64) -> Option<FrameReport> {
        let report = self
            .ticker
            .on_frame(handle, now_ms, &mut self.state, &self.rules)?;
        let interval = self.rules.config.auto_save_interval_ms;
        match self.next_autosave_ms {
            None => self.next_autosave_ms = Some(now_ms + interval),
            Some(due) if now_ms >= due => {
                self.flush(now_ms as i64);
                self.next_autosave_ms = Some(now_ms + interval);
            }
            Some(_) => {}
        }
        Some(report)
    }

    // Persistence.

    pub fn save_now(&mut self, now_ms: i64) -> Result<()> {
        self.state.last_played_ms = now_ms;
        self.state.last_saved_ms = now_ms;
        let snapshot = snapshot_from_state(&self.state, now_ms);
        self.saves.save(self.slot, &snapshot)
    }

    /// Save for autosave and unload hooks; failures are logged and kept for
    /// display, never raised.
    pub fn flush(&mut self, now_ms: i64) -> bool {
        match self.save_now(now_ms) {
            Ok(()) => {
                self.last_save_error = None;
                true
            }
            Err(error) => {
                warn!(slot = self.slot, error = %format!("{error:#}"), "save failed");
                self.last_save_error = Some(format!("{error:#}"));
                false
            }
        }
    }

    /// Replaces live state with `slot`. On failure the current state is kept.
    pub fn load_slot(&mut self, slot: usize) -> bool {
        let Some(snapshot) = self.saves.load(slot) else {
            return false;
        };
        self.state = state_from_snapshot(&snapshot, &self.rules);
        self.slot = slot;
        self.offline = OfflineProgress::default();
        self.ticker.reset_progress();
        self.next_autosave_ms = None;
        info!(slot, "switched save slot");
        true
    }

    /// Saves, then tears down the tick engine.
    pub fn shutdown(&mut self, now_ms: i64) -> bool {
        let saved = self.flush(now_ms);
        self.ticker.destroy();
        saved
    }
}
