//! Get command implementation for reading settings
//!
//! Prints settings in a `field = value` form, or as a JSON object with
//! `--json`. Output carries no header so it can be used from scripts.

use anyhow::{Context, Result};
use serde_json::{Map, Value, json};

use crate::config::validation::{FieldTarget, resolve_field};
use crate::config::{self, ScheduleConfig, SettingKey, SettingValue};

/// Resolve the requested fields to `(name, value)` pairs.
///
/// `all` expands to every persisted key. The `light`/`dark` aliases read as
/// `HH:MM` strings.
pub fn collect_values(config: &ScheduleConfig, fields: &[String]) -> Result<Vec<(String, Value)>> {
    if fields.len() == 1 && fields[0] == "all" {
        return Ok(SettingKey::ALL
            .into_iter()
            .map(|key| (key.as_str().to_string(), setting_json(config.get(key))))
            .collect());
    }

    fields
        .iter()
        .map(|field| -> Result<(String, Value)> {
            let value = match resolve_field(field)? {
                FieldTarget::Key(key) => setting_json(config.get(key)),
                FieldTarget::LightTime => json!(config.light_time().to_string()),
                FieldTarget::DarkTime => json!(config.dark_time().to_string()),
            };
            Ok((field.clone(), value))
        })
        .collect()
}

fn setting_json(value: SettingValue) -> Value {
    match value {
        SettingValue::Bool(v) => json!(v),
        SettingValue::Int(v) => json!(v),
    }
}

/// Handle the get command - read settings
pub fn handle_get_command(fields: &[String], json: bool) -> Result<()> {
    let store = config::open()?;
    let values = collect_values(store.config(), fields)?;

    if json {
        let object: Map<String, Value> = values.into_iter().collect();
        let output = serde_json::to_string_pretty(&Value::Object(object))
            .context("Failed to serialize settings")?;
        println!("{output}");
    } else {
        for (field, value) in values {
            println!("{field} = {value}");
        }
    }
    Ok(())
}

/// Display help for the get command
pub fn display_help() {
    log_version!();
    log_block_start!("get - Read setting values");
    log_block_start!("Usage: switchr get [OPTIONS] <field> [<field>...]");
    log_block_start!("Arguments:");
    log_indented!("<field>  A setting name, an alias, or 'all'");
    log_block_start!("Fields:");
    log_indented!("scheduleEnabled, enabled       Follow the daily schedule (true/false)");
    log_indented!("lightModeHour, lightModeMinute Light mode start");
    log_indented!("darkModeHour, darkModeMinute   Dark mode start");
    log_indented!("light, dark                    Switch points as HH:MM");
    log_indented!("showWindowOnLaunch             Show the settings summary on start");
    log_block_start!("Options:");
    log_indented!("-j, --json  Output as JSON");
    log_block_start!("Examples:");
    log_indented!("switchr get all");
    log_indented!("switchr get --json light dark enabled");
    log_end!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_collect_all() {
        let values = collect_values(&ScheduleConfig::default(), &fields(&["all"])).unwrap();
        assert_eq!(values.len(), 6);
        assert_eq!(values[0], ("scheduleEnabled".to_string(), json!(false)));
        assert_eq!(values[3], ("darkModeHour".to_string(), json!(19)));
    }

    #[test]
    fn test_collect_aliases() {
        let config = ScheduleConfig {
            light_hour: 6,
            light_minute: 5,
            ..ScheduleConfig::default()
        };
        let values = collect_values(&config, &fields(&["light", "dark", "enabled"])).unwrap();
        assert_eq!(values[0].1, json!("06:05"));
        assert_eq!(values[1].1, json!("19:00"));
        assert_eq!(values[2].1, json!(false));
    }

    #[test]
    fn test_collect_unknown_field() {
        let err = collect_values(&ScheduleConfig::default(), &fields(&["sunset"])).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::UnknownKey("sunset".to_string()))
        );
    }
}
