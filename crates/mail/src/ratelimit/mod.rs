//! Quota admission control
//!
//! This module provides:
//! - A token-bucket rate limiter shared by every remote call
//! - The per-operation quota cost schedule
//! - A clock abstraction so waiting can be driven by tests

mod bucket;
mod clock;
mod costs;

pub use bucket::{CostExceedsCapacity, RateLimiter};
pub use clock::{Clock, ManualClock, SystemClock};
pub use costs::QuotaCosts;
