use tracing::{debug, info, warn};

use crate::Decimal;
use crate::data::{EngineConfig, Rules};

use super::rates::{calculate_generation_over_time, generation_rates};
use super::resource_store::{Resource, ResourceAmounts};
use super::scheduler::{FrameHandle, Scheduler};
use super::state::GameState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickState {
    Stopped,
    Running,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickCommand {
    Start,
    Stop,
    Pause,
    Resume,
}

impl TickState {
    /// The state after `command`, or `None` if the transition is not allowed.
    pub fn apply(self, command: TickCommand) -> Option<TickState> {
        match (self, command) {
            (TickState::Stopped, TickCommand::Start) => Some(TickState::Running),
            (_, TickCommand::Stop) => Some(TickState::Stopped),
            (TickState::Running, TickCommand::Pause) => Some(TickState::Paused),
            (TickState::Paused, TickCommand::Resume) => Some(TickState::Running),
            _ => None,
        }
    }
}

/// What the display cadence publishes.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayUpdate {
    pub rates: ResourceAmounts,
    pub balances: ResourceAmounts,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    /// Clamped delta actually integrated; 0 while paused.
    pub delta_ms: f64,
    /// Whole units written to the ledger this frame.
    pub committed: ResourceAmounts,
    /// Set when this frame published a display update.
    pub display: Option<DisplayUpdate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type DisplayCallback = Box<dyn FnMut(&DisplayUpdate)>;

/// Integrates the generation rate over frame callbacks. Fractional earnings
/// accumulate per resource and only whole units reach the ledger.
pub struct TickEngine<S: Scheduler> {
    scheduler: S,
    state: TickState,
    destroyed: bool,
    pending: Option<FrameHandle>,
    last_frame_ms: Option<f64>,
    fractional: ResourceAmounts,
    max_frame_delta_ms: f64,
    display_interval_ms: f64,
    display_elapsed_ms: f64,
    last_display: Option<DisplayUpdate>,
    subscribers: Vec<(SubscriptionId, DisplayCallback)>,
    next_subscription: u64,
}

impl<S: Scheduler> TickEngine<S> {
    pub fn new(scheduler: S, config: &EngineConfig) -> Self {
        Self {
            scheduler,
            state: TickState::Stopped,
            destroyed: false,
            pending: None,
            last_frame_ms: None,
            fractional: ResourceAmounts::default(),
            max_frame_delta_ms: config.max_frame_delta_ms,
            display_interval_ms: config.display_interval_ms,
            display_elapsed_ms: 0.0,
            last_display: None,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn state(&self) -> TickState {
        self.state
    }

    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Not-yet-committed earnings for `resource`.
    pub fn fractional(&self, resource: Resource) -> Decimal {
        self.fractional.get(resource)
    }

    fn transition(&mut self, command: TickCommand) -> bool {
        if self.destroyed {
            warn!(?command, "tick engine destroyed; ignoring command");
            return false;
        }
        match self.state.apply(command) {
            Some(next) => {
                self.state = next;
                true
            }
            None => {
                warn!(?command, state = ?self.state, "ignoring tick command");
                false
            }
        }
    }

    pub fn start(&mut self) -> bool {
        if !self.transition(TickCommand::Start) {
            return false;
        }
        self.last_frame_ms = None;
        self.fractional = ResourceAmounts::default();
        self.display_elapsed_ms = self.display_interval_ms;
        self.pending = Some(self.scheduler.schedule_next());
        info!("tick engine started");
        true
    }

    /// Cancels the queued frame; safe to call in any state.
    pub fn stop(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel(handle);
        }
        if self.state != TickState::Stopped {
            self.state = TickState::Stopped;
            info!("tick engine stopped");
        }
    }

    pub fn pause(&mut self) -> bool {
        self.transition(TickCommand::Pause)
    }

    /// Resumes with a fresh baseline so time spent paused is not awarded.
    pub fn resume(&mut self) -> bool {
        if !self.transition(TickCommand::Resume) {
            return false;
        }
        self.last_frame_ms = None;
        true
    }

    /// Drops uncommitted fractions and the frame baseline, e.g. when the
    /// state underneath is swapped. The queued frame stays valid.
    pub fn reset_progress(&mut self) {
        self.last_frame_ms = None;
        self.fractional = ResourceAmounts::default();
        self.display_elapsed_ms = self.display_interval_ms;
        self.last_display = None;
    }

    /// Stops for good and drops every subscriber.
    pub fn destroy(&mut self) {
        self.stop();
        self.subscribers.clear();
        self.last_display = None;
        self.destroyed = true;
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&DisplayUpdate) + 'static) -> SubscriptionId {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(existing, _)| *existing != id);
        self.subscribers.len() != before
    }

    /// Runs one frame. Frames that are not the one currently queued (stale,
    /// cancelled, or arriving after stop) are ignored and return `None`.
    pub fn on_frame(
        &mut self,
        handle: FrameHandle,
        now_ms: f64,
        game: &mut GameState,
        rules: &Rules,
    ) -> Option<FrameReport> {
        if self.pending != Some(handle) || self.state == TickState::Stopped {
            debug!(frame = handle.0, "ignoring stale frame");
            return None;
        }
        self.pending = Some(self.scheduler.schedule_next());

        if self.state == TickState::Paused {
            return Some(FrameReport {
                delta_ms: 0.0,
                committed: ResourceAmounts::default(),
                display: None,
            });
        }

        let delta_ms = match self.last_frame_ms {
            Some(previous) => (now_ms - previous).clamp(0.0, self.max_frame_delta_ms),
            None => 0.0,
        };
        self.last_frame_ms = Some(now_ms);
        game.stats.total_play_time_ms += delta_ms;

        let rates = generation_rates(game, rules);
        let seconds = delta_ms / 1_000.0;
        let mut committed = ResourceAmounts::default();
        for (resource, rate) in rates.iter() {
            let accumulated =
                self.fractional.get(resource) + calculate_generation_over_time(rate, seconds);
            let whole = accumulated.floor();
            if whole >= Decimal::ONE {
                game.ledger.add(resource, whole);
                committed.set(resource, whole);
                self.fractional.set(resource, (accumulated - whole).non_negative());
            } else {
                self.fractional.set(resource, accumulated);
            }
        }
        if !committed.is_zero() {
            debug!(
                credits = %committed.get(Resource::Credits),
                delta_ms,
                "committed generated resources"
            );
        }

        let display = self.advance_display(delta_ms, rates, game);
        Some(FrameReport {
            delta_ms,
            committed,
            display,
        })
    }

    fn advance_display(
        &mut self,
        delta_ms: f64,
        rates: ResourceAmounts,
        game: &GameState,
    ) -> Option<DisplayUpdate> {
        self.display_elapsed_ms += delta_ms;
        if self.display_elapsed_ms < self.display_interval_ms {
            return None;
        }
        self.display_elapsed_ms %= self.display_interval_ms;

        let update = DisplayUpdate {
            rates,
            balances: game.ledger.current_amounts(),
        };
        if self.last_display.as_ref() == Some(&update) {
            return None;
        }
        for (_, callback) in &mut self.subscribers {
            callback(&update);
        }
        self.last_display = Some(update.clone());
        Some(update)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::{FrameReport, TickCommand, TickEngine, TickState};
    use crate::Decimal;
    use crate::core::{GameState, ManualScheduler, MinigameId, Resource, Scheduler};
    use crate::data::Rules;

    struct Harness {
        engine: TickEngine<ManualScheduler>,
        game: GameState,
        rules: Rules,
    }

    impl Harness {
        /// Credits rate of `top_score / 100` per second.
        fn new(top_score: i64) -> Self {
            let rules = Rules::default();
            let mut game = GameState::new_game(0);
            game.minigame_mut(MinigameId::CodeBreaker).top_scores = vec![Decimal::from(top_score)];
            Self {
                engine: TickEngine::new(ManualScheduler::default(), &rules.config),
                game,
                rules,
            }
        }

        fn frame(&mut self, now_ms: f64) -> Option<FrameReport> {
            let handle = self
                .engine
                .scheduler_mut()
                .pop_due()
                .expect("a frame should be queued");
            self.engine
                .on_frame(handle, now_ms, &mut self.game, &self.rules)
        }

        fn credits(&self) -> Decimal {
            self.game.ledger.current(Resource::Credits)
        }
    }

    #[test]
    fn transitions_follow_the_state_machine() {
        use TickCommand::*;
        use TickState::*;
        assert_eq!(Stopped.apply(Start), Some(Running));
        assert_eq!(Running.apply(Start), None);
        assert_eq!(Running.apply(Pause), Some(Paused));
        assert_eq!(Paused.apply(Pause), None);
        assert_eq!(Paused.apply(Resume), Some(Running));
        assert_eq!(Running.apply(Resume), None);
        assert_eq!(Paused.apply(Stop), Some(Stopped));
        assert_eq!(Stopped.apply(Stop), Some(Stopped));
    }

    #[test]
    fn first_frame_after_start_has_no_delta() {
        let mut harness = Harness::new(100);
        assert!(harness.engine.start());
        let report = harness.frame(50_000.0).expect("frame runs");
        assert_eq!(report.delta_ms, 0.0);
        assert!(harness.credits().is_zero());
    }

    #[test]
    fn fractions_accumulate_until_a_whole_unit() {
        let mut harness = Harness::new(100);
        harness.engine.start();
        harness.frame(0.0);
        for now in [250.0, 500.0, 750.0] {
            harness.frame(now);
            assert!(harness.credits().is_zero());
        }
        assert_eq!(
            harness.engine.fractional(Resource::Credits),
            "0.75".parse::<Decimal>().expect("literal")
        );

        let report = harness.frame(1_000.0).expect("frame runs");
        assert_eq!(report.committed.get(Resource::Credits), Decimal::ONE);
        assert_eq!(harness.credits(), Decimal::ONE);
        assert_eq!(harness.game.ledger.lifetime(Resource::Credits), Decimal::ONE);
        assert!(harness.engine.fractional(Resource::Credits).is_zero());
    }

    #[test]
    fn long_gaps_are_clamped() {
        let mut harness = Harness::new(100);
        harness.engine.start();
        harness.frame(0.0);
        let report = harness.frame(10.0 * 60.0 * 60.0 * 1_000.0).expect("frame runs");
        assert_eq!(report.delta_ms, 1_000.0);
        assert_eq!(harness.credits(), Decimal::ONE);
        assert_eq!(harness.game.stats.total_play_time_ms, 1_000.0);
    }

    #[test]
    fn paused_frames_keep_the_loop_alive_without_generating() {
        let mut harness = Harness::new(100);
        harness.engine.start();
        harness.frame(0.0);
        assert!(harness.engine.pause());

        let report = harness.frame(1_000.0).expect("paused frames still run");
        assert_eq!(report.delta_ms, 0.0);
        assert!(harness.credits().is_zero());
        assert_eq!(harness.engine.scheduler().pending_len(), 1);
    }

    #[test]
    fn resume_resets_the_baseline() {
        let mut harness = Harness::new(100);
        harness.engine.start();
        harness.frame(0.0);
        harness.engine.pause();
        harness.frame(500.0);
        assert!(harness.engine.resume());

        let report = harness.frame(3_600_000.0).expect("frame runs");
        assert_eq!(report.delta_ms, 0.0);
        let report = harness.frame(3_600_500.0).expect("frame runs");
        assert_eq!(report.delta_ms, 500.0);
    }

    #[test]
    fn reset_progress_discards_fractions_and_baseline() {
        let mut harness = Harness::new(100);
        harness.engine.start();
        harness.frame(0.0);
        harness.frame(900.0);
        assert!(!harness.engine.fractional(Resource::Credits).is_zero());

        harness.engine.reset_progress();
        assert!(harness.engine.fractional(Resource::Credits).is_zero());
        assert_eq!(harness.engine.state(), TickState::Running);

        let report = harness.frame(1_000.0).expect("queued frame still runs");
        assert_eq!(report.delta_ms, 0.0);
        assert!(harness.credits().is_zero());
        assert!(report.display.is_some());
    }

    #[test]
    fn stop_cancels_already_queued_frames() {
        let mut harness = Harness::new(100);
        harness.engine.start();
        let queued = harness.engine.pending_frame().expect("frame queued");
        harness.engine.stop();
        harness.engine.stop();

        assert_eq!(harness.engine.state(), TickState::Stopped);
        assert_eq!(harness.engine.scheduler().pending_len(), 0);
        let report = harness
            .engine
            .on_frame(queued, 1_000.0, &mut harness.game, &harness.rules);
        assert_eq!(report, None);
    }

    #[test]
    fn stale_handles_are_ignored() {
        let mut harness = Harness::new(100);
        harness.engine.start();
        let stale = harness.engine.scheduler_mut().schedule_next();
        let report = harness
            .engine
            .on_frame(stale, 0.0, &mut harness.game, &harness.rules);
        assert_eq!(report, None);
    }

    #[test]
    fn double_start_is_ignored() {
        let mut harness = Harness::new(100);
        assert!(harness.engine.start());
        assert!(!harness.engine.start());
        assert_eq!(harness.engine.scheduler().pending_len(), 1);
    }

    #[test]
    fn display_publishes_only_on_change() {
        let mut harness = Harness::new(0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        harness
            .engine
            .subscribe(move |update| sink.borrow_mut().push(update.clone()));

        harness.engine.start();
        harness.frame(0.0);
        harness.frame(1_000.0);
        harness.frame(2_000.0);
        assert_eq!(seen.borrow().len(), 1);

        harness.game.minigame_mut(MinigameId::CodeBreaker).top_scores = vec![Decimal::from(500_i64)];
        harness.frame(3_000.0);
        assert_eq!(seen.borrow().len(), 2);
        assert_eq!(
            seen.borrow()[1].rates.get(Resource::Credits),
            Decimal::from(5_i64)
        );
    }

    #[test]
    fn display_cadence_is_independent_of_commits() {
        let mut harness = Harness::new(100);
        let seen = Rc::new(RefCell::new(0_usize));
        let sink = Rc::clone(&seen);
        harness.engine.subscribe(move |_| *sink.borrow_mut() += 1);

        harness.engine.start();
        harness.frame(0.0);
        for step in 1..=8 {
            harness.frame(step as f64 * 250.0);
        }
        assert_eq!(harness.credits(), Decimal::from(2_i64));
        assert_eq!(*seen.borrow(), 3);
    }

    #[test]
    fn unsubscribe_and_destroy() {
        let mut harness = Harness::new(0);
        let id = harness.engine.subscribe(|_| {});
        assert!(harness.engine.unsubscribe(id));
        assert!(!harness.engine.unsubscribe(id));

        harness.engine.start();
        harness.engine.destroy();
        harness.engine.destroy();
        assert_eq!(harness.engine.state(), TickState::Stopped);
        assert!(!harness.engine.start());
        assert_eq!(harness.engine.scheduler().pending_len(), 0);
    }
}
