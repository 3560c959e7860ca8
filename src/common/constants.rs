//! Application-wide constants: persisted key names, documented defaults and timing.

use std::time::Duration;

// # Persisted settings keys
//
// These names are the on-disk layout of the flat settings store and must not change.

pub const KEY_SCHEDULE_ENABLED: &str = "scheduleEnabled";
pub const KEY_LIGHT_MODE_HOUR: &str = "lightModeHour";
pub const KEY_LIGHT_MODE_MINUTE: &str = "lightModeMinute";
pub const KEY_DARK_MODE_HOUR: &str = "darkModeHour";
pub const KEY_DARK_MODE_MINUTE: &str = "darkModeMinute";
pub const KEY_SHOW_WINDOW_ON_LAUNCH: &str = "showWindowOnLaunch";

// # Defaults

pub const DEFAULT_SCHEDULE_ENABLED: bool = false;
pub const DEFAULT_LIGHT_HOUR: u8 = 7;
pub const DEFAULT_LIGHT_MINUTE: u8 = 0;
pub const DEFAULT_DARK_HOUR: u8 = 19;
pub const DEFAULT_DARK_MINUTE: u8 = 0;
/// Only applies while the key has never been written (first run).
pub const DEFAULT_SHOW_WINDOW_ON_LAUNCH: bool = true;

// # Validation ranges

pub const MINIMUM_HOUR: u8 = 0;
pub const MAXIMUM_HOUR: u8 = 23;
pub const MINIMUM_MINUTE: u8 = 0;
pub const MAXIMUM_MINUTE: u8 = 59;
pub const MINUTES_PER_DAY: u16 = 24 * 60;

// # Scheduler timing

/// Period between reconciliation ticks.
pub const TICK_INTERVAL: Duration = Duration::from_secs(60);
/// Delay before the first evaluation after start, leaving room for a permission prompt.
pub const STARTUP_DELAY: Duration = Duration::from_secs(1);
/// How long one-shot commands wait for the appearance change to complete.
pub const COMMAND_COMPLETION_TIMEOUT: Duration = Duration::from_secs(10);
/// Quiet period after the last settings file event before reloading.
pub const WATCHER_DEBOUNCE: Duration = Duration::from_millis(500);

// # Files

pub const APP_DIR_NAME: &str = "switchr";
pub const SETTINGS_FILE_NAME: &str = "settings.toml";
pub const LOCK_FILE_NAME: &str = "switchr.lock";

// # Exit codes

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
