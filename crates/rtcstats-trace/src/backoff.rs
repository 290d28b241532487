//! Reconnect delay computation.
//!
//! The delay doubles with every attempt, gets a random jitter on top to
//! spread reconnect storms, and never exceeds what is left of the overall
//! reconnect budget.

use std::time::Duration;

use rand::{Rng, RngCore};

/// Delay before reconnect attempt `attempt` (0-based).
///
/// `min(2^attempt * base + jitter, remaining)`. Overflowing attempts
/// saturate instead of wrapping.
pub fn backoff_delay(attempt: u32, base: Duration, jitter: Duration, remaining: Duration) -> Duration {
    let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
    base.saturating_mul(factor)
        .saturating_add(jitter)
        .min(remaining)
}

/// Uniform jitter in `[0, max)`. Zero when `max` is zero.
pub fn jitter(rng: &mut dyn RngCore, max: Duration) -> Duration {
    let max_ms = u64::try_from(max.as_millis()).unwrap_or(u64::MAX);
    if max_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rng.gen_range(0..max_ms))
}
