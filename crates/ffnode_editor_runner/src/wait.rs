// SPDX-License-Identifier: MIT OR Apache-2.0
//! Bounded waiting with exponential backoff.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Time source used by the wait loops
pub trait Clock: Send + Sync {
    /// Current instant
    fn now(&self) -> Instant;
    /// Block for `duration`
    fn sleep(&self, duration: Duration);
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Virtual clock whose `sleep` only advances time
#[derive(Debug)]
pub struct ManualClock {
    now: parking_lot::Mutex<Instant>,
    slept: parking_lot::Mutex<Vec<Duration>>,
}

impl ManualClock {
    /// Create a clock starting at the current instant
    pub fn new() -> Self {
        Self {
            now: parking_lot::Mutex::new(Instant::now()),
            slept: parking_lot::Mutex::new(Vec::new()),
        }
    }

    /// Move time forward without recording a sleep
    pub fn advance(&self, duration: Duration) {
        *self.now.lock() += duration;
    }

    /// Every sleep requested so far
    pub fn sleeps(&self) -> Vec<Duration> {
        self.slept.lock().clone()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }

    fn sleep(&self, duration: Duration) {
        self.slept.lock().push(duration);
        self.advance(duration);
    }
}

/// Retry schedule for readiness checks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollPolicy {
    /// First sleep between checks
    pub initial_interval: Duration,
    /// Longest sleep between checks
    pub max_interval: Duration,
    /// Growth factor applied to the interval after each check
    pub backoff: f64,
    /// Give up after this much time
    pub deadline: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(250),
            max_interval: Duration::from_secs(2),
            backoff: 2.0,
            deadline: Duration::from_secs(30),
        }
    }
}

impl PollPolicy {
    /// Fixed-interval policy, used for short process waits
    pub fn fixed(interval: Duration, deadline: Duration) -> Self {
        Self {
            initial_interval: interval,
            max_interval: interval,
            backoff: 1.0,
            deadline,
        }
    }

    /// Call `check` until it yields a value or the deadline passes.
    ///
    /// `check` runs at least once, even with a zero deadline. On timeout the
    /// time actually waited is returned.
    pub fn poll_until<T>(
        &self,
        clock: &dyn Clock,
        mut check: impl FnMut() -> Option<T>,
    ) -> Result<T, Duration> {
        let start = clock.now();
        let backoff = if self.backoff.is_finite() {
            self.backoff.max(1.0)
        } else {
            1.0
        };
        let mut interval = self.initial_interval;
        loop {
            if let Some(value) = check() {
                return Ok(value);
            }
            let waited = clock.now().saturating_duration_since(start);
            if waited >= self.deadline {
                return Err(waited);
            }
            clock.sleep(interval.min(self.deadline - waited));
            interval = Duration::try_from_secs_f64(interval.as_secs_f64() * backoff)
                .map_or(self.max_interval, |next| next.min(self.max_interval));
        }
    }
}
