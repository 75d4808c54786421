// SPDX-License-Identifier: MIT

//! Bounded exponential backoff with full jitter for Event Channel
//! reconnection: initial delay 1s, cap 30s.

use rand::Rng;
use std::time::Duration;

const INITIAL_DELAY: Duration = Duration::from_secs(1);
const MAX_DELAY: Duration = Duration::from_secs(30);

/// Tracks the current delay across successive reconnect attempts. `reset`
/// on a successful connection so the next failure starts back at
/// [`INITIAL_DELAY`] rather than continuing to grow.
pub struct Backoff {
    attempt: u32,
}

impl Backoff {
    pub fn new() -> Self {
        Self { attempt: 0 }
    }

    /// Returns the delay to sleep before the next attempt, with full
    /// jitter (`Uniform(0, cap)` rather than `cap/2 +/- cap/2`, per the
    /// "full jitter" strategy: avoids synchronized retry storms across
    /// many agents reconnecting to the same center at once).
    pub fn next_delay(&mut self) -> Duration {
        let exp = INITIAL_DELAY.saturating_mul(1u32.checked_shl(self.attempt).unwrap_or(u32::MAX));
        let cap = exp.min(MAX_DELAY);
        self.attempt = self.attempt.saturating_add(1);
        if cap.is_zero() {
            return cap;
        }
        rand::thread_rng().gen_range(Duration::ZERO..=cap)
    }

    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod tests;
