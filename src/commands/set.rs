//! Set command implementation for modifying settings
//!
//! Every assignment is parsed and validated before anything is written, so a
//! typo in the last field leaves the file untouched. Each key is then saved
//! on its own. Once every key is written, a running instance is asked to
//! reload with `SIGUSR2`.

use anyhow::Result;

use crate::config::validation::{FieldTarget, parse_time, parse_value, resolve_field};
use crate::config::{self, ConfigStore, SettingKey, SettingValue};
use crate::io::lock;
use crate::io::signals::{self, AppSignal};
use crate::schedule::TimeOfDay;

/// A validated assignment ready to be saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Assignment {
    Key(SettingKey, SettingValue),
    LightTime(TimeOfDay),
    DarkTime(TimeOfDay),
}

fn parse_assignment(field: &str, raw: &str) -> Result<Assignment> {
    Ok(match resolve_field(field)? {
        FieldTarget::Key(key) => Assignment::Key(key, parse_value(key, raw)?),
        FieldTarget::LightTime => Assignment::LightTime(parse_time(raw)?),
        FieldTarget::DarkTime => Assignment::DarkTime(parse_time(raw)?),
    })
}

/// Validate all assignments, then save them. Returns what was written.
pub fn apply_assignments(
    store: &mut ConfigStore,
    fields: &[(String, String)],
) -> Result<Vec<(String, String)>> {
    let mut parsed = Vec::with_capacity(fields.len());
    for (field, raw) in fields {
        match parse_assignment(field, raw) {
            Ok(assignment) => parsed.push((field, assignment)),
            Err(e) => {
                log_pipe!();
                log_error!("Invalid value for field '{field}': {e}");
                anyhow::bail!("Configuration validation failed");
            }
        }
    }

    let mut written = Vec::with_capacity(parsed.len());
    for (field, assignment) in parsed {
        let shown = match assignment {
            Assignment::Key(key, value) => {
                store.save(key, value)?;
                value.to_string()
            }
            Assignment::LightTime(time) => {
                store.set_light_time(time)?;
                time.to_string()
            }
            Assignment::DarkTime(time) => {
                store.set_dark_time(time)?;
                time.to_string()
            }
        };
        written.push((field.clone(), shown));
    }
    Ok(written)
}

/// Handle the set command - update settings
pub fn handle_set_command(fields: &[(String, String)]) -> Result<()> {
    log_version!();

    let mut store = config::open()?;
    let written = apply_assignments(&mut store, fields)?;

    log_block_start!("Updated settings");
    for (field, value) in &written {
        log_indented!("{field} = {value}");
    }
    if let Ok(path) = config::get_settings_path() {
        log_indented!("in {}", crate::common::utils::private_path(&path));
    }

    if let Some(pid) = lock::read_running_pid(&lock::lock_path()) {
        match signals::send_to_instance(pid, AppSignal::Reload) {
            Ok(()) => log_block_start!("Asked the running instance (PID: {pid}) to reload"),
            Err(e) => {
                log_pipe!();
                log_warning!("Could not signal the running instance: {e}");
                log_indented!("It still reloads once its file watcher sees the change");
            }
        }
    } else {
        log_block_start!("Start switchr to apply the new settings");
    }

    log_end!();
    Ok(())
}

/// Display help for the set command
pub fn display_help() {
    log_version!();
    log_block_start!("set - Update setting values");
    log_block_start!("Usage: switchr set [OPTIONS] <field>=<value> [<field>=<value>...]");
    log_block_start!("Fields:");
    log_indented!("enabled=<bool>          Follow the daily schedule");
    log_indented!("light=<HH:MM>           Light mode start");
    log_indented!("dark=<HH:MM>            Dark mode start");
    log_indented!("show_on_launch=<bool>   Show the settings summary on start");
    log_indented!("lightModeHour=<0-23>    Any persisted name is accepted as well");
    log_block_start!("Examples:");
    log_indented!("switchr set enabled=true");
    log_indented!("switchr set light=06:30 dark=21:00");
    log_end!();
}
