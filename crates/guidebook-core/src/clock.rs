//! Clock abstraction.
//!
//! Wall-clock time only ever enters the system when a record is stamped.
//! The campaign log fold never reads a clock.

use chrono::{DateTime, Utc};

/// Source of the current time for stamping records and events.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock that delegates to the system clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
