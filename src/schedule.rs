//! Daily light/dark window evaluation.
//!
//! The schedule is two points in the day: the minute light mode begins and the
//! minute dark mode begins. Everything here is pure arithmetic on minute-of-day
//! values, with no clock reads and no I/O, so the reconciliation loop and the
//! status command agree on the answer for any given minute.
//!
//! ## Window shapes
//!
//! - **Normal** (`light < dark`, e.g. 07:00 → 19:00): dark before the light
//!   point and from the dark point onwards.
//! - **Inverted** (`dark <= light`, e.g. dark 22:00, light 06:00): dark only in
//!   `[dark, light)`. Equal points give an empty dark interval, so the desired
//!   mode is light for the whole day.
//!
//! A boundary minute belongs to the mode it transitions into.

use serde::Serialize;
use std::fmt;

use crate::common::constants::{MAXIMUM_HOUR, MAXIMUM_MINUTE, MINUTES_PER_DAY};

/// Binary appearance mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Light,
    Dark,
}

impl Mode {
    pub fn from_dark(is_dark: bool) -> Self {
        if is_dark { Mode::Dark } else { Mode::Light }
    }

    pub fn is_dark(self) -> bool {
        self == Mode::Dark
    }

    pub fn opposite(self) -> Self {
        match self {
            Mode::Light => Mode::Dark,
            Mode::Dark => Mode::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Light => "light",
            Mode::Dark => "dark",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A wall-clock time of day at minute resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    /// Build a time of day, returning `None` outside 00:00..=23:59.
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        (hour <= MAXIMUM_HOUR && minute <= MAXIMUM_MINUTE).then_some(Self { hour, minute })
    }

    /// Inverse of [`TimeOfDay::minute_of_day`]; values past the end of the day wrap.
    pub fn from_minute_of_day(minute_of_day: u16) -> Self {
        let wrapped = minute_of_day % MINUTES_PER_DAY;
        Self {
            hour: (wrapped / 60) as u8,
            minute: (wrapped % 60) as u8,
        }
    }

    pub fn hour(self) -> u8 {
        self.hour
    }

    pub fn minute(self) -> u8 {
        self.minute
    }

    /// Minutes since midnight, always in `0..1440`.
    pub fn minute_of_day(self) -> u16 {
        u16::from(self.hour) * 60 + u16::from(self.minute)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Core decision: should the appearance be dark at `now`?
///
/// All three arguments are minutes of day in `0..1440`.
pub fn desired_is_dark(now: u16, light: u16, dark: u16) -> bool {
    if light < dark {
        now < light || now >= dark
    } else {
        dark <= now && now < light
    }
}

/// The pair of daily switch points, derived from configuration on every evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub light: TimeOfDay,
    pub dark: TimeOfDay,
}

impl TimeWindow {
    pub fn new(light: TimeOfDay, dark: TimeOfDay) -> Self {
        Self { light, dark }
    }

    /// Whether dark mode wraps past midnight (dark point at or before the light point).
    pub fn is_inverted(&self) -> bool {
        self.dark.minute_of_day() <= self.light.minute_of_day()
    }

    /// Whether the schedule never asks for dark mode.
    pub fn is_always_light(&self) -> bool {
        self.dark == self.light
    }

    /// Desired mode at the given time of day.
    pub fn mode_at(&self, now: TimeOfDay) -> Mode {
        Mode::from_dark(desired_is_dark(
            now.minute_of_day(),
            self.light.minute_of_day(),
            self.dark.minute_of_day(),
        ))
    }

    /// The next switch point strictly after `now` that changes the desired mode.
    ///
    /// Returns the mode entered at that point and the number of minutes until it,
    /// in `1..=1440`. `None` when the schedule never changes mode.
    pub fn next_boundary(&self, now: TimeOfDay) -> Option<Boundary> {
        if self.is_always_light() {
            return None;
        }

        let now_minute = now.minute_of_day();
        let until = |point: TimeOfDay| -> u16 {
            let delta = (point.minute_of_day() + MINUTES_PER_DAY - now_minute) % MINUTES_PER_DAY;
            if delta == 0 { MINUTES_PER_DAY } else { delta }
        };

        let to_light = until(self.light);
        let to_dark = until(self.dark);
        let boundary = if to_dark < to_light {
            Boundary {
                at: self.dark,
                mode: Mode::Dark,
                minutes_until: to_dark,
            }
        } else {
            Boundary {
                at: self.light,
                mode: Mode::Light,
                minutes_until: to_light,
            }
        };
        Some(boundary)
    }
}

/// A future switch point of the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundary {
    pub at: TimeOfDay,
    pub mode: Mode,
    pub minutes_until: u16,
}
