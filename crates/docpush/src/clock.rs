//! Pacific-time clock
//!
//! Records are stamped with one instant per run. The instant comes from a
//! [`Clock`] so tests can pin it.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Civil time zone used for `created_at`
pub const PACIFIC: Tz = chrono_tz::America::Los_Angeles;

pub trait Clock {
    fn now(&self) -> DateTime<Tz>;
}

/// Reads the system clock and converts to [`PACIFIC`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&PACIFIC)
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Tz>);

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self(instant.with_timezone(&PACIFIC))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Tz> {
        self.0
    }
}
