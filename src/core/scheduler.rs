use std::cell::Cell;
use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of "now" in milliseconds.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs_f64() * 1_000.0)
            .unwrap_or(0.0)
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: Cell<f64>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now_ms: Cell::new(start_ms),
        }
    }

    pub fn set(&self, now_ms: f64) {
        self.now_ms.set(now_ms);
    }

    pub fn advance(&self, delta_ms: f64) {
        self.now_ms.set(self.now_ms.get() + delta_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now_ms.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(pub u64);

/// Requests frame callbacks from the host loop.
pub trait Scheduler {
    fn schedule_next(&mut self) -> FrameHandle;
    fn cancel(&mut self, handle: FrameHandle);
}

/// Queue of requested frames that the host drains one at a time.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    queued: VecDeque<FrameHandle>,
}

impl ManualScheduler {
    /// Oldest queued frame, if any.
    pub fn pop_due(&mut self) -> Option<FrameHandle> {
        self.queued.pop_front()
    }

    pub fn pending_len(&self) -> usize {
        self.queued.len()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_next(&mut self) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        self.queued.push_back(handle);
        handle
    }

    fn cancel(&mut self, handle: FrameHandle) {
        self.queued.retain(|queued| *queued != handle);
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, ManualClock, ManualScheduler, Scheduler};

    #[test]
    fn manual_clock_moves_only_on_request() {
        let clock = ManualClock::new(1_000.0);
        assert_eq!(clock.now_ms(), 1_000.0);
        clock.advance(16.0);
        assert_eq!(clock.now_ms(), 1_016.0);
        clock.set(5.0);
        assert_eq!(clock.now_ms(), 5.0);
    }

    #[test]
    fn cancelled_frames_leave_the_queue() {
        let mut scheduler = ManualScheduler::default();
        let first = scheduler.schedule_next();
        let second = scheduler.schedule_next();
        assert_ne!(first, second);
        scheduler.cancel(first);
        assert_eq!(scheduler.pending_len(), 1);
        assert_eq!(scheduler.pop_due(), Some(second));
        assert_eq!(scheduler.pop_due(), None);
    }
}
