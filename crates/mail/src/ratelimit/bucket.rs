//! Token-bucket rate limiter
//!
//! The bucket starts full with `rate` tokens and refills continuously at
//! `rate` tokens per second, never beyond `rate`. A caller takes `cost`
//! tokens before each remote call, sleeping just long enough for the
//! bucket to cover the deficit when it runs short.
//!
//! Typical usage:
//! ```ignore
//! let limiter = RateLimiter::new(250.0);
//! limiter.wait(10.0)?;
//! client.list_threads(...)?;
//! ```

use log::debug;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use super::clock::{Clock, SystemClock};

/// Smallest sleep issued, so a rounding-sized deficit still makes progress
const MIN_SLEEP: Duration = Duration::from_micros(1);

/// A request whose cost can never be satisfied by the bucket
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Rate limit request too big (requested {cost}, capacity {capacity})")]
pub struct CostExceedsCapacity {
    pub cost: f64,
    pub capacity: f64,
}

/// Mutable bucket state, guarded as a whole so a refill is never counted twice
#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

impl Bucket {
    fn refill(&mut self, now: Instant, rate: f64) {
        let elapsed = now.saturating_duration_since(self.last_refill);
        self.tokens = (self.tokens + elapsed.as_secs_f64() * rate).min(rate);
        self.last_refill = now;
    }
}

/// Token-bucket admission control shared by all remote calls
pub struct RateLimiter {
    rate: f64,
    bucket: Mutex<Bucket>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Create a limiter allowing `rate` units per second, backed by the wall clock
    pub fn new(rate: f64) -> Self {
        Self::with_clock(rate, Arc::new(SystemClock))
    }

    /// Create a limiter driven by the given clock
    pub fn with_clock(rate: f64, clock: Arc<dyn Clock>) -> Self {
        let bucket = Bucket {
            tokens: rate,
            last_refill: clock.now(),
        };
        Self {
            rate,
            bucket: Mutex::new(bucket),
            clock,
        }
    }

    /// Maximum number of tokens the bucket holds
    pub fn capacity(&self) -> f64 {
        self.rate
    }

    /// Tokens available right now
    pub fn available(&self) -> f64 {
        let mut bucket = self.lock();
        bucket.refill(self.clock.now(), self.rate);
        bucket.tokens
    }

    /// Take `cost` tokens, blocking until the bucket holds enough.
    ///
    /// Fails without waiting or consuming anything when `cost` exceeds the
    /// capacity, since such a request could never be admitted.
    pub fn wait(&self, cost: f64) -> Result<(), CostExceedsCapacity> {
        if cost > self.rate {
            return Err(CostExceedsCapacity {
                cost,
                capacity: self.rate,
            });
        }

        loop {
            let delay = {
                let mut bucket = self.lock();
                bucket.refill(self.clock.now(), self.rate);
                if bucket.tokens >= cost {
                    bucket.tokens -= cost;
                    return Ok(());
                }
                let deficit = cost - bucket.tokens;
                Duration::from_secs_f64(deficit / self.rate).max(MIN_SLEEP)
            };

            // Sleep with the lock released so other callers can refill and take
            debug!("Rate limit: waiting {:?} for {} units", delay, cost);
            self.clock.sleep(delay);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Bucket> {
        self.bucket.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("rate", &self.rate)
            .field("bucket", &*self.lock())
            .finish()
    }
}
