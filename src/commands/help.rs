//! Help command implementation for switchr.
//!
//! This module provides a dispatcher for the help command that shows
//! command-specific help or general help based on the arguments provided.

use anyhow::Result;

/// Run the help command (dispatcher)
///
/// # Arguments
/// * `command` - Optional command name to get help for (None = general help)
pub fn run_help_command(command: Option<&str>) -> Result<()> {
    match command {
        None => display_general_help(),
        Some("get") | Some("g") => super::get::display_help(),
        Some("help") | Some("h") => display_help_help(),
        Some("set") | Some("s") => super::set::display_help(),
        Some("status") | Some("st") => super::status::display_help(),
        Some("toggle") | Some("t") | Some("dark") | Some("light") => {
            super::mode::display_help()
        }
        Some("run") => display_run_help(),
        Some(unknown) => {
            log_warning_standalone!("Unknown command: {}", unknown);
            display_general_help();
        }
    }
    Ok(())
}

/// Display general help focused on commands (for the help command)
fn display_general_help() {
    log_version!();
    log_block_start!("Available Commands:");
    log_indented!("run                     Follow the schedule (default)");
    log_indented!("toggle, t               Switch to the opposite mode");
    log_indented!("dark | light            Switch to the given mode");
    log_indented!("status, st              Show current mode and schedule");
    log_indented!("get, g <field>          Read setting(s)");
    log_indented!("set, s <field>=<value>  Update setting(s)");
    log_indented!("help, h [COMMAND]       Show detailed help for a command");
    log_pipe!();
    log_info!("Use 'switchr help <command>' to see detailed help for a specific command.");
    log_indented!("Use 'switchr --help' to see all options and general usage.");
    log_end!();
}

fn display_run_help() {
    log_version!();
    log_block_start!("run - Follow the light/dark schedule");
    log_block_start!("Usage: switchr [run] [OPTIONS]");
    log_block_start!("Options:");
    log_indented!("-c, --config <dir>  Use custom configuration directory");
    log_indented!("-d, --debug         Log every check and timestamp output");
    log_indented!("-l, --log <file>    Write output to a file instead of the terminal");
    log_block_start!("Signals:");
    log_indented!("SIGUSR1   Toggle the current mode");
    log_indented!("SIGUSR2   Reload settings.toml");
    log_indented!("SIGTERM, SIGINT, SIGHUP  Stop");
    log_end!();
}

/// Display help for the help command itself
fn display_help_help() {
    log_version!();
    log_block_start!("help - Display help information");
    log_block_start!("Usage: switchr help [COMMAND]");
    log_block_start!("Arguments:");
    log_indented!("COMMAND  Optional command to get help for");
    log_indented!("         If omitted, shows general help");
    log_block_start!("Examples:");
    log_indented!("# Show general help");
    log_indented!("switchr help");
    log_pipe!();
    log_indented!("# Show help for specific commands");
    log_indented!("switchr help set");
    log_indented!("switchr help status");
    log_end!();
}
