//! Value validation and parsing of user-supplied setting values.

use anyhow::{Context, Result};
use chrono::{NaiveTime, Timelike};

use super::{ConfigError, SettingKey, SettingValue, ValueKind};
use crate::schedule::TimeOfDay;

/// Check that a value has the right type and lies in the key's range.
pub fn validate_value(key: SettingKey, value: SettingValue) -> Result<(), ConfigError> {
    if value.kind() != key.kind() {
        return Err(ConfigError::TypeMismatch {
            key,
            expected: key.kind(),
        });
    }

    if let (SettingValue::Int(v), Some((min, max))) = (value, key.range())
        && !(min..=max).contains(&v)
    {
        return Err(ConfigError::OutOfRange {
            key,
            value: v,
            min,
            max,
        });
    }

    Ok(())
}

/// Parse a boolean the way the CLI accepts it.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Parse `HH:MM` (or `HH:MM:SS`, seconds dropped) into a time of day.
pub fn parse_time(raw: &str) -> Result<TimeOfDay> {
    let raw = raw.trim();
    let time = NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .with_context(|| format!("Invalid time format: {raw} (use HH:MM)"))?;
    TimeOfDay::new(time.hour() as u8, time.minute() as u8)
        .with_context(|| format!("Time out of range: {raw}"))
}

/// Parse a raw string into a validated value for `key`.
pub fn parse_value(key: SettingKey, raw: &str) -> Result<SettingValue> {
    let value = match key.kind() {
        ValueKind::Bool => SettingValue::Bool(
            parse_bool(raw).with_context(|| format!("{key} expects true or false, got '{raw}'"))?,
        ),
        ValueKind::Int => SettingValue::Int(
            raw.trim()
                .parse::<i64>()
                .with_context(|| format!("{key} expects an integer, got '{raw}'"))?,
        ),
    };
    validate_value(key, value)?;
    Ok(value)
}

/// A field name as typed on the command line, resolved to the settings it touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldTarget {
    /// One persisted key
    Key(SettingKey),
    /// `light` alias: hour and minute of the light point from `HH:MM`
    LightTime,
    /// `dark` alias: hour and minute of the dark point from `HH:MM`
    DarkTime,
}

/// Resolve a CLI field name, accepting the persisted names and short aliases.
pub fn resolve_field(name: &str) -> Result<FieldTarget, ConfigError> {
    if let Some(key) = SettingKey::from_name(name) {
        return Ok(FieldTarget::Key(key));
    }

    let target = match name {
        "enabled" | "schedule" => FieldTarget::Key(SettingKey::ScheduleEnabled),
        "show_on_launch" => FieldTarget::Key(SettingKey::ShowWindowOnLaunch),
        "light" | "light_time" => FieldTarget::LightTime,
        "dark" | "dark_time" => FieldTarget::DarkTime,
        _ => return Err(ConfigError::UnknownKey(name.to_string())),
    };
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_ranges() {
        assert!(validate_value(SettingKey::LightModeHour, SettingValue::Int(0)).is_ok());
        assert!(validate_value(SettingKey::LightModeHour, SettingValue::Int(23)).is_ok());
        assert_eq!(
            validate_value(SettingKey::DarkModeHour, SettingValue::Int(24)),
            Err(ConfigError::OutOfRange {
                key: SettingKey::DarkModeHour,
                value: 24,
                min: 0,
                max: 23
            })
        );
        assert!(validate_value(SettingKey::DarkModeMinute, SettingValue::Int(60)).is_err());
        assert!(validate_value(SettingKey::LightModeMinute, SettingValue::Int(-1)).is_err());
    }

    #[test]
    fn test_validate_types() {
        assert!(matches!(
            validate_value(SettingKey::ScheduleEnabled, SettingValue::Int(1)),
            Err(ConfigError::TypeMismatch { .. })
        ));
        assert!(validate_value(SettingKey::LightModeHour, SettingValue::Bool(true)).is_err());
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time("07:30").unwrap(), TimeOfDay::new(7, 30).unwrap());
        assert_eq!(parse_time("7:05").unwrap(), TimeOfDay::new(7, 5).unwrap());
        assert_eq!(parse_time("19:00:45").unwrap(), TimeOfDay::new(19, 0).unwrap());
        assert!(parse_time("25:00").is_err());
        assert!(parse_time("noon").is_err());
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(
            parse_value(SettingKey::ScheduleEnabled, "yes").unwrap(),
            SettingValue::Bool(true)
        );
        assert_eq!(
            parse_value(SettingKey::DarkModeHour, "21").unwrap(),
            SettingValue::Int(21)
        );
        assert!(parse_value(SettingKey::DarkModeHour, "42").is_err());
        assert!(parse_value(SettingKey::ShowWindowOnLaunch, "maybe").is_err());
    }

    #[test]
    fn test_resolve_field_aliases() {
        assert_eq!(
            resolve_field("scheduleEnabled").unwrap(),
            FieldTarget::Key(SettingKey::ScheduleEnabled)
        );
        assert_eq!(
            resolve_field("enabled").unwrap(),
            FieldTarget::Key(SettingKey::ScheduleEnabled)
        );
        assert_eq!(resolve_field("light").unwrap(), FieldTarget::LightTime);
        assert_eq!(resolve_field("dark").unwrap(), FieldTarget::DarkTime);
        assert_eq!(
            resolve_field("sunset"),
            Err(ConfigError::UnknownKey("sunset".to_string()))
        );
    }
}
