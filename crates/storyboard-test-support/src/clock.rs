//! Test clocks.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use storyboard_core::clock::Clock;

/// A clock that always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// A clock that advances by a fixed step on every call, for tests that need
/// distinct, ordered timestamps.
#[derive(Debug)]
pub struct StepClock {
    start: DateTime<Utc>,
    step: Duration,
    calls: Mutex<i64>,
}

impl StepClock {
    #[must_use]
    pub fn new(start: DateTime<Utc>, step: Duration) -> Self {
        Self {
            start,
            step,
            calls: Mutex::new(0),
        }
    }
}

impl Clock for StepClock {
    fn now(&self) -> DateTime<Utc> {
        let mut calls = self.calls.lock().unwrap();
        let now = self.start + self.step * i32::try_from(*calls).unwrap_or(i32::MAX);
        *calls += 1;
        now
    }
}
