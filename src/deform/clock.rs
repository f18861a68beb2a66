//! Time and frame scheduling seams.
//!
//! The controller never reads the wall clock or arms a frame callback
//! directly. It goes through [`Clock`] and [`FrameScheduler`], so tests can
//! drive animations with hand-picked timestamps.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Monotonic milliseconds
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Asks the host to call back once on the next display refresh
pub trait FrameScheduler {
    fn schedule_next_frame(&mut self);
}

/// Milliseconds since construction
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn set(&self, now_ms: f64) {
        self.now.set(now_ms);
    }

    pub fn advance(&self, delta_ms: f64) {
        self.now.set(self.now.get() + delta_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

/// Records frame requests instead of acting on them. Clones share the count.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    requested: Rc<Cell<usize>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests made since the last call, resetting the count
    pub fn take_requests(&self) -> usize {
        self.requested.replace(0)
    }

    pub fn pending(&self) -> bool {
        self.requested.get() > 0
    }
}

impl FrameScheduler for ManualScheduler {
    fn schedule_next_frame(&mut self) {
        self.requested.set(self.requested.get() + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualClock::new(10.0);
        let handle = clock.clone();
        handle.advance(5.0);
        assert_eq!(clock.now_ms(), 15.0);
        handle.set(2.0);
        assert_eq!(clock.now_ms(), 2.0);
    }

    #[test]
    fn test_manual_scheduler_counts_requests() {
        let scheduler = ManualScheduler::new();
        let mut boxed: Box<dyn FrameScheduler> = Box::new(scheduler.clone());
        boxed.schedule_next_frame();
        boxed.schedule_next_frame();
        assert!(scheduler.pending());
        assert_eq!(scheduler.take_requests(), 2);
        assert!(!scheduler.pending());
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let first = clock.now_ms();
        assert!(clock.now_ms() >= first);
    }
}
