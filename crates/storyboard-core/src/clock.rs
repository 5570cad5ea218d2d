//! Time source for `created_at` stamps.

use chrono::{DateTime, Utc};

/// Source of the timestamps stamped onto users and assets at insertion.
/// Injected into the store so tests can control insertion order.
pub trait Clock: Send + Sync {
    /// The instant to stamp onto the next insert.
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the operating system time.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
