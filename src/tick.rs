//! Clock readings and timestamp values.
//!
//! A tick is a `(seconds, nanos)` pair where `seconds` is the signed number of seconds since the
//! Unix epoch and `nanos` is the number of nanoseconds within that second.

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, TimeZone};

/// A trait that defines the clock interface consumed by [`TuidGenerator`](crate::TuidGenerator).
pub trait TimeSource {
    /// Returns the current `(seconds, nanos)` since the Unix epoch.
    fn now(&mut self) -> (i64, u32);
}

/// The default [`TimeSource`] that reads the system wall clock.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Default)]
pub struct StdSystemTime;

impl TimeSource for StdSystemTime {
    fn now(&mut self) -> (i64, u32) {
        SystemTime::now().to_tick()
    }
}

/// A timestamp value that can be decomposed into a `(seconds, nanos)` tick.
pub trait ToTick {
    /// Returns the `(seconds, nanos)` since the Unix epoch represented by this value.
    fn to_tick(&self) -> (i64, u32);
}

impl ToTick for (i64, u32) {
    fn to_tick(&self) -> (i64, u32) {
        *self
    }
}

impl ToTick for SystemTime {
    fn to_tick(&self) -> (i64, u32) {
        match self.duration_since(UNIX_EPOCH) {
            Ok(d) => (d.as_secs() as i64, d.subsec_nanos()),
            Err(err) => {
                // count backwards from the epoch, keeping `nanos` non-negative
                let d = err.duration();
                match d.subsec_nanos() {
                    0 => (-(d.as_secs() as i64), 0),
                    n => (-(d.as_secs() as i64) - 1, 1_000_000_000 - n),
                }
            }
        }
    }
}

impl<Tz: TimeZone> ToTick for DateTime<Tz> {
    fn to_tick(&self) -> (i64, u32) {
        (self.timestamp(), self.timestamp_subsec_nanos())
    }
}
