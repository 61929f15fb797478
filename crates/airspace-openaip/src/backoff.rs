//! Exponential retry delay with an abort ceiling.
//!
//! Each failure doubles the delay. Once the doubled delay would exceed the
//! ceiling the policy gives up instead of saturating, so a loop driven by it
//! always terminates.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Backoff {
    base: Duration,
    ceiling: Duration,
    current: Duration,
    failures: u32,
}

impl Backoff {
    pub fn new(base: Duration, ceiling: Duration) -> Self {
        let base = base.max(Duration::from_millis(1));
        let ceiling = ceiling.max(base);
        Self {
            base,
            ceiling,
            current: base,
            failures: 0,
        }
    }

    pub fn reset(&mut self) {
        self.current = self.base;
        self.failures = 0;
    }

    /// Records a failure. Returns the delay to wait before retrying, or
    /// `None` when the retry budget is spent.
    pub fn fail(&mut self) -> Option<Duration> {
        self.failures += 1;
        self.current = self.current.saturating_mul(2);
        if self.current > self.ceiling {
            None
        } else {
            Some(self.current)
        }
    }

    /// Consecutive failures since the last reset.
    pub fn failures(&self) -> u32 {
        self.failures
    }
}
