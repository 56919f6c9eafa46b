use std::time::{Duration, Instant};

use tracing::debug;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(150);
pub const DEFAULT_REFRESH_DELAY: Duration = Duration::from_millis(60);

/// Debounces resize notifications into single recomputation passes.
///
/// The coordinator is strictly single-flight: at most one deadline is
/// pending, and every new resize signal resets it instead of stacking a
/// second one. It is driven by the host loop — the host reports signals and
/// polls with the current time; the coordinator never spawns timers of its
/// own.
#[derive(Debug)]
pub struct ResizeCoordinator {
    debounce: Duration,
    refresh_delay: Duration,
    deadline: Option<Instant>,
    active: bool,
}

impl Default for ResizeCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl ResizeCoordinator {
    pub fn new() -> Self {
        Self::with_delays(DEFAULT_DEBOUNCE, DEFAULT_REFRESH_DELAY)
    }

    pub fn with_delays(debounce: Duration, refresh_delay: Duration) -> Self {
        Self {
            debounce,
            refresh_delay,
            deadline: None,
            active: true,
        }
    }

    /// A viewport resize was observed. Reschedules the pending pass, if any.
    pub fn notify_resize(&mut self, now: Instant) {
        if !self.active {
            return;
        }
        self.deadline = Some(now + self.debounce);
    }

    /// Ask for a recompute after external DOM mutation. Uses a shorter delay
    /// than resize debouncing, just long enough for the mutation to settle.
    pub fn refresh(&mut self, now: Instant) {
        if !self.active {
            return;
        }
        self.deadline = Some(now + self.refresh_delay);
    }

    /// True while a pass is scheduled but has not fired yet.
    pub fn pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns `true` exactly once when the pending deadline has passed;
    /// the caller then runs the recomputation pass.
    pub fn poll(&mut self, now: Instant) -> bool {
        if !self.active {
            return false;
        }
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Tear down: drops the pending deadline and refuses any further
    /// scheduling. Terminal.
    pub fn cleanup(&mut self) {
        self.active = false;
        self.deadline = None;
        debug!("resize coordinator cleaned up");
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}
