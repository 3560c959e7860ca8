//! Time source abstraction for real and fixed wall-clock time.
//!
//! The reconciliation loop never calls `Local::now()` directly; it asks an
//! injected [`TimeSource`] so tests can pin the clock to a chosen minute.

use chrono::{DateTime, Local, Timelike};
use std::sync::Mutex;

use crate::schedule::TimeOfDay;

/// Trait for abstracting wall-clock reads.
pub trait TimeSource: Send + Sync {
    /// Get the current local time.
    fn now(&self) -> DateTime<Local>;

    /// Current time of day at minute resolution; seconds are dropped.
    fn time_of_day(&self) -> TimeOfDay {
        time_of_day(&self.now())
    }
}

/// Minute-resolution time of day of any chrono timestamp.
pub fn time_of_day<T: Timelike>(time: &T) -> TimeOfDay {
    TimeOfDay::from_minute_of_day((time.hour() * 60 + time.minute()) as u16)
}

/// Real-time implementation that uses the system clock.
pub struct RealTimeSource;

impl TimeSource for RealTimeSource {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock pinned to a settable time of day.
///
/// `now()` keeps reporting the real date so that anything formatting a full
/// timestamp still has one; only `time_of_day()` is controlled.
pub struct FixedTimeSource {
    current: Mutex<TimeOfDay>,
}

impl FixedTimeSource {
    pub fn new(time: TimeOfDay) -> Self {
        Self {
            current: Mutex::new(time),
        }
    }

    /// Move the pinned clock.
    pub fn set(&self, time: TimeOfDay) {
        let mut guard = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *guard = time;
    }
}

impl TimeSource for FixedTimeSource {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    fn time_of_day(&self) -> TimeOfDay {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn test_time_of_day_ignores_seconds() {
        let time = NaiveTime::from_hms_opt(19, 0, 59).unwrap();
        assert_eq!(time_of_day(&time), TimeOfDay::new(19, 0).unwrap());
    }

    #[test]
    fn test_fixed_time_source_can_be_moved() {
        let clock = FixedTimeSource::new(TimeOfDay::new(6, 0).unwrap());
        assert_eq!(clock.time_of_day().minute_of_day(), 360);
        clock.set(TimeOfDay::new(22, 15).unwrap());
        assert_eq!(clock.time_of_day().minute_of_day(), 1335);
    }
}
