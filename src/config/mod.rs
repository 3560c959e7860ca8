//! Persisted schedule configuration with write-through storage.
//!
//! The configuration is six independent scalar settings kept in a flat
//! key/value store:
//!
//! ```toml
//! scheduleEnabled = false     # Follow the daily schedule at all
//! lightModeHour = 7           # Light mode starts at lightModeHour:lightModeMinute
//! lightModeMinute = 0
//! darkModeHour = 19           # Dark mode starts at darkModeHour:darkModeMinute
//! darkModeMinute = 0
//! showWindowOnLaunch = true   # Show the settings summary when the daemon starts
//! ```
//!
//! ## Loading
//!
//! Loading never fails. Each key is read on its own, and a missing key, a value
//! of the wrong type, an out-of-range value or an unreadable file all fall back
//! to the documented default for that key.
//!
//! ## Saving
//!
//! Every mutation goes through [`ConfigStore::save`], which validates the value
//! and then persists that single key immediately. There are no multi-key
//! transactions: a crash while saving loses at most the key being written.

pub mod loading;
pub mod store;
pub mod validation;
pub mod watcher;

use serde::Serialize;
use std::fmt;

use crate::common::constants::*;
use crate::schedule::{TimeOfDay, TimeWindow};

pub use loading::{get_config_base_dir, get_custom_config_dir, get_settings_path, open, set_config_dir};
pub use store::{KeyValueStore, MemoryStore, TomlFileStore};
pub use watcher::start_config_watcher;

/// Type of value a setting holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    Int,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Bool => f.write_str("boolean"),
            ValueKind::Int => f.write_str("integer"),
        }
    }
}

/// A single persisted scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
}

impl SettingValue {
    pub fn kind(self) -> ValueKind {
        match self {
            SettingValue::Bool(_) => ValueKind::Bool,
            SettingValue::Int(_) => ValueKind::Int,
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Bool(value) => write!(f, "{value}"),
            SettingValue::Int(value) => write!(f, "{value}"),
        }
    }
}

/// The six persisted settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    ScheduleEnabled,
    LightModeHour,
    LightModeMinute,
    DarkModeHour,
    DarkModeMinute,
    ShowWindowOnLaunch,
}

impl SettingKey {
    pub const ALL: [SettingKey; 6] = [
        SettingKey::ScheduleEnabled,
        SettingKey::LightModeHour,
        SettingKey::LightModeMinute,
        SettingKey::DarkModeHour,
        SettingKey::DarkModeMinute,
        SettingKey::ShowWindowOnLaunch,
    ];

    /// Storage key name.
    pub fn as_str(self) -> &'static str {
        match self {
            SettingKey::ScheduleEnabled => KEY_SCHEDULE_ENABLED,
            SettingKey::LightModeHour => KEY_LIGHT_MODE_HOUR,
            SettingKey::LightModeMinute => KEY_LIGHT_MODE_MINUTE,
            SettingKey::DarkModeHour => KEY_DARK_MODE_HOUR,
            SettingKey::DarkModeMinute => KEY_DARK_MODE_MINUTE,
            SettingKey::ShowWindowOnLaunch => KEY_SHOW_WINDOW_ON_LAUNCH,
        }
    }

    /// Look up a key by its storage name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == name)
    }

    pub fn kind(self) -> ValueKind {
        match self {
            SettingKey::ScheduleEnabled | SettingKey::ShowWindowOnLaunch => ValueKind::Bool,
            _ => ValueKind::Int,
        }
    }

    /// Inclusive range for integer settings.
    pub fn range(self) -> Option<(i64, i64)> {
        match self {
            SettingKey::LightModeHour | SettingKey::DarkModeHour => {
                Some((i64::from(MINIMUM_HOUR), i64::from(MAXIMUM_HOUR)))
            }
            SettingKey::LightModeMinute | SettingKey::DarkModeMinute => {
                Some((i64::from(MINIMUM_MINUTE), i64::from(MAXIMUM_MINUTE)))
            }
            _ => None,
        }
    }

    pub fn default_value(self) -> SettingValue {
        ScheduleConfig::default().get(self)
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors for values that cannot be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Integer outside the key's inclusive range
    OutOfRange {
        key: SettingKey,
        value: i64,
        min: i64,
        max: i64,
    },
    /// Value of the wrong type for the key
    TypeMismatch { key: SettingKey, expected: ValueKind },
    /// Name that is not one of the persisted settings
    UnknownKey(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::OutOfRange {
                key,
                value,
                min,
                max,
            } => write!(f, "{key} must be between {min} and {max} (got {value})"),
            ConfigError::TypeMismatch { key, expected } => {
                write!(f, "{key} expects a {expected} value")
            }
            ConfigError::UnknownKey(name) => write!(f, "Unknown setting '{name}'"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// In-memory view of the persisted schedule settings.
///
/// Hour and minute fields always hold valid values: every path that writes
/// them goes through [`validation::validate_value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScheduleConfig {
    pub enabled: bool,
    pub light_hour: u8,
    pub light_minute: u8,
    pub dark_hour: u8,
    pub dark_minute: u8,
    pub show_window_on_launch: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: DEFAULT_SCHEDULE_ENABLED,
            light_hour: DEFAULT_LIGHT_HOUR,
            light_minute: DEFAULT_LIGHT_MINUTE,
            dark_hour: DEFAULT_DARK_HOUR,
            dark_minute: DEFAULT_DARK_MINUTE,
            show_window_on_launch: DEFAULT_SHOW_WINDOW_ON_LAUNCH,
        }
    }
}

impl ScheduleConfig {
    pub fn light_time(&self) -> TimeOfDay {
        TimeOfDay::from_minute_of_day(u16::from(self.light_hour) * 60 + u16::from(self.light_minute))
    }

    pub fn dark_time(&self) -> TimeOfDay {
        TimeOfDay::from_minute_of_day(u16::from(self.dark_hour) * 60 + u16::from(self.dark_minute))
    }

    /// Derive the evaluation window. Recomputed on every call, never cached.
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.light_time(), self.dark_time())
    }

    /// Read one setting as a storable value.
    pub fn get(&self, key: SettingKey) -> SettingValue {
        match key {
            SettingKey::ScheduleEnabled => SettingValue::Bool(self.enabled),
            SettingKey::LightModeHour => SettingValue::Int(i64::from(self.light_hour)),
            SettingKey::LightModeMinute => SettingValue::Int(i64::from(self.light_minute)),
            SettingKey::DarkModeHour => SettingValue::Int(i64::from(self.dark_hour)),
            SettingKey::DarkModeMinute => SettingValue::Int(i64::from(self.dark_minute)),
            SettingKey::ShowWindowOnLaunch => SettingValue::Bool(self.show_window_on_launch),
        }
    }

    /// Validate and apply one setting in memory.
    pub fn apply(&mut self, key: SettingKey, value: SettingValue) -> Result<(), ConfigError> {
        validation::validate_value(key, value)?;
        match (key, value) {
            (SettingKey::ScheduleEnabled, SettingValue::Bool(v)) => self.enabled = v,
            (SettingKey::ShowWindowOnLaunch, SettingValue::Bool(v)) => {
                self.show_window_on_launch = v
            }
            // Range already checked, the narrowing cannot truncate
            (SettingKey::LightModeHour, SettingValue::Int(v)) => self.light_hour = v as u8,
            (SettingKey::LightModeMinute, SettingValue::Int(v)) => self.light_minute = v as u8,
            (SettingKey::DarkModeHour, SettingValue::Int(v)) => self.dark_hour = v as u8,
            (SettingKey::DarkModeMinute, SettingValue::Int(v)) => self.dark_minute = v as u8,
            (key, _) => {
                return Err(ConfigError::TypeMismatch {
                    key,
                    expected: key.kind(),
                });
            }
        }
        Ok(())
    }

    /// Print the settings summary.
    pub fn log_config(&self) {
        log_block_start!("Schedule settings");
        log_indented!(
            "Auto-switch: {}",
            if self.enabled { "enabled" } else { "disabled" }
        );
        log_indented!("Light mode from: {}", self.light_time());
        log_indented!("Dark mode from: {}", self.dark_time());

        let window = self.window();
        if window.is_always_light() {
            log_indented!("Both switch points are equal, the schedule keeps light mode all day");
        } else if window.is_inverted() {
            log_indented!("Dark interval runs {} → {}", self.dark_time(), self.light_time());
        }
        log_indented!(
            "Show settings on launch: {}",
            if self.show_window_on_launch { "yes" } else { "no" }
        );
    }
}

/// Source of truth for [`ScheduleConfig`] across restarts.
///
/// Holds the last loaded configuration and the backing store. All writes are
/// write-through: the store is updated before the cached value changes.
pub struct ConfigStore {
    store: Box<dyn KeyValueStore>,
    config: ScheduleConfig,
}

impl ConfigStore {
    /// Wrap a store and load the configuration from it.
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        let config = load_from(store.as_ref());
        Self { store, config }
    }

    /// Re-read every key from the store, applying defaults for anything unusable.
    pub fn load(&mut self) -> ScheduleConfig {
        self.config = load_from(self.store.as_ref());
        self.config
    }

    /// The configuration as of the last load or save.
    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    /// Validate and persist a single setting.
    pub fn save(&mut self, key: SettingKey, value: SettingValue) -> anyhow::Result<()> {
        let mut updated = self.config;
        updated.apply(key, value)?;
        self.store.set(key.as_str(), value)?;
        self.config = updated;
        Ok(())
    }

    pub fn set_enabled(&mut self, enabled: bool) -> anyhow::Result<()> {
        self.save(SettingKey::ScheduleEnabled, SettingValue::Bool(enabled))
    }

    pub fn set_show_window_on_launch(&mut self, show: bool) -> anyhow::Result<()> {
        self.save(SettingKey::ShowWindowOnLaunch, SettingValue::Bool(show))
    }

    /// Persist the light point as two independent key writes.
    pub fn set_light_time(&mut self, time: TimeOfDay) -> anyhow::Result<()> {
        self.save(SettingKey::LightModeHour, SettingValue::Int(time.hour().into()))?;
        self.save(SettingKey::LightModeMinute, SettingValue::Int(time.minute().into()))
    }

    /// Persist the dark point as two independent key writes.
    pub fn set_dark_time(&mut self, time: TimeOfDay) -> anyhow::Result<()> {
        self.save(SettingKey::DarkModeHour, SettingValue::Int(time.hour().into()))?;
        self.save(SettingKey::DarkModeMinute, SettingValue::Int(time.minute().into()))
    }
}

fn load_from(store: &dyn KeyValueStore) -> ScheduleConfig {
    let mut config = ScheduleConfig::default();

    for key in SettingKey::ALL {
        match store.get(key.as_str()) {
            Ok(None) => {}
            Ok(Some(value)) => {
                if let Err(e) = config.apply(key, value) {
                    log_warning!("Ignoring stored value: {e}");
                    log_indented!("Using default {} = {}", key, key.default_value());
                }
            }
            Err(e) => {
                log_warning!("Could not read setting {key}: {e}");
                log_indented!("Using default {} = {}", key, key.default_value());
            }
        }
    }

    config
}

#[cfg(test)]
mod tests;
