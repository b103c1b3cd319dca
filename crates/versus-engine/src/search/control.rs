//! Search control: interruption flag and time budget.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Number of nodes between two clock checks, minus one.
const CLOCK_CHECK_MASK: u64 = 1023;

#[derive(Debug, Clone, Copy, Default)]
struct Clock {
    start: Option<Instant>,
    budget: Option<Duration>,
}

/// Decides when a search must stop.
///
/// Interruption is cooperative: the search polls
/// [`should_stop`](SearchControl::should_stop) at every node and unwinds
/// with a best-effort score once it returns `true`. The flag is raised
/// either by [`interrupt`](SearchControl::interrupt) (from any thread) or
/// by the clock once the time budget is spent.
#[derive(Debug)]
pub struct SearchControl {
    stopped: Arc<AtomicBool>,
    clock: Mutex<Clock>,
}

impl SearchControl {
    /// Create a control driven by the shared `stopped` flag, without budget.
    pub fn new(stopped: Arc<AtomicBool>) -> Self {
        Self {
            stopped,
            clock: Mutex::new(Clock::default()),
        }
    }

    /// Start the clock for a new search with an optional time budget.
    ///
    /// Lowers the stop flag.
    pub fn start(&self, budget: Option<Duration>) {
        *self.clock.lock().unwrap_or_else(PoisonError::into_inner) = Clock {
            start: Some(Instant::now()),
            budget,
        };
        self.stopped.store(false, Ordering::Release);
    }

    /// Raise the stop flag.
    pub fn interrupt(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    /// Whether the stop flag is raised.
    pub fn is_interrupted(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Check whether the search should abort immediately.
    ///
    /// The clock is only read every 1024 nodes; when the budget is
    /// exceeded the stop flag is raised so later calls return at once.
    pub fn should_stop(&self, nodes: u64) -> bool {
        if self.stopped.load(Ordering::Relaxed) {
            return true;
        }

        if nodes & CLOCK_CHECK_MASK != 0 {
            return false;
        }

        if self.is_out_of_time() {
            self.interrupt();
            return true;
        }

        false
    }

    /// Whether the time budget of the current search is spent.
    pub fn is_out_of_time(&self) -> bool {
        let clock = *self.clock.lock().unwrap_or_else(PoisonError::into_inner);
        match (clock.start, clock.budget) {
            (Some(start), Some(budget)) => start.elapsed() >= budget,
            _ => false,
        }
    }

    /// Elapsed time since the clock was started.
    ///
    /// Returns [`Duration::ZERO`] if no search was started.
    pub fn elapsed(&self) -> Duration {
        self.clock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .start
            .map_or(Duration::ZERO, |s| s.elapsed())
    }

    /// Time budget of the current search.
    pub fn budget(&self) -> Option<Duration> {
        self.clock.lock().unwrap_or_else(PoisonError::into_inner).budget
    }

    /// Reference to the shared stop flag.
    pub fn stop_flag(&self) -> &Arc<AtomicBool> {
        &self.stopped
    }
}

impl Default for SearchControl {
    fn default() -> Self {
        Self::new(Arc::new(AtomicBool::new(false)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interrupt_is_seen_immediately() {
        let control = SearchControl::default();
        control.start(None);
        assert!(!control.should_stop(1));
        control.interrupt();
        assert!(control.should_stop(1));
        assert!(control.is_interrupted());
    }

    #[test]
    fn start_lowers_the_flag() {
        let control = SearchControl::default();
        control.interrupt();
        control.start(None);
        assert!(!control.is_interrupted());
    }

    #[test]
    fn exhausted_budget_raises_the_flag_on_clock_checks() {
        let control = SearchControl::default();
        control.start(Some(Duration::ZERO));
        // Not a clock-check node
        assert!(!control.should_stop(1));
        assert!(control.should_stop(1024));
        assert!(control.is_interrupted());
    }

    #[test]
    fn no_budget_never_runs_out() {
        let control = SearchControl::default();
        control.start(None);
        assert!(!control.is_out_of_time());
        assert!(!control.should_stop(0));
        assert_eq!(control.budget(), None);
    }

    #[test]
    fn shared_flag_interrupts_from_outside() {
        let flag = Arc::new(AtomicBool::new(false));
        let control = SearchControl::new(Arc::clone(&flag));
        control.start(None);
        flag.store(true, Ordering::Release);
        assert!(control.should_stop(3));
    }
}
