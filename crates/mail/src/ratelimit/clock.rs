//! Time sources for the rate limiter

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Source of monotonic time and a way to pause the caller
pub trait Clock: Send + Sync {
    /// Current instant
    fn now(&self) -> Instant;

    /// Block the calling thread for the given duration
    fn sleep(&self, duration: Duration);
}

/// Wall clock backed by `std::thread::sleep`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Clock that only moves when told to.
///
/// `sleep` advances the clock instead of blocking, which lets quota-bound
/// runs complete instantly while still observing the time they would take.
#[derive(Debug)]
pub struct ManualClock {
    start: Instant,
    offset: Mutex<Duration>,
    slept: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
            slept: Mutex::new(Duration::ZERO),
        }
    }

    /// Move the clock forward without counting it as sleep
    pub fn advance(&self, duration: Duration) {
        *self.offset.lock().unwrap_or_else(PoisonError::into_inner) += duration;
    }

    /// Time elapsed since the clock was created
    pub fn elapsed(&self) -> Duration {
        *self.offset.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Total time spent in `sleep`
    pub fn slept(&self) -> Duration {
        *self.slept.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + self.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        *self.slept.lock().unwrap_or_else(PoisonError::into_inner) += duration;
        self.advance(duration);
    }
}
