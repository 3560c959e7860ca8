//! Main entry point for switchr.
//!
//! Parses the command line and dispatches to the daemon or a one-shot command.

use anyhow::Result;
use switchr::args::{self, CliAction, ParsedArgs};
use switchr::commands;
use switchr::common::constants::{EXIT_FAILURE, EXIT_SUCCESS};
use switchr::config;
use switchr::logger::Log;
use switchr::{Switchr, log_error_exit, log_pipe};

fn main() {
    let code = match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            Log::set_enabled(true);
            log_pipe!();
            log_error_exit!("{e:#}");
            EXIT_FAILURE
        }
    };
    std::process::exit(code);
}

fn run() -> Result<()> {
    let parsed_args = ParsedArgs::from_env();

    match parsed_args.action {
        CliAction::ShowVersion => {
            args::display_version_info();
            Ok(())
        }
        CliAction::ShowHelp => {
            args::display_help();
            Ok(())
        }
        CliAction::ShowHelpDueToError => {
            args::display_help();
            std::process::exit(EXIT_FAILURE);
        }
        CliAction::Run {
            debug_enabled,
            config_dir,
            log_file,
        } => {
            config::set_config_dir(config_dir)?;
            Switchr::new(debug_enabled).with_log_file(log_file).run()
        }
        CliAction::ModeCommand {
            debug_enabled,
            config_dir,
            request,
        } => {
            config::set_config_dir(config_dir)?;
            commands::mode::handle_mode_command(request, debug_enabled)
        }
        CliAction::StatusCommand { config_dir, json } => {
            config::set_config_dir(config_dir)?;
            // Keep backend warnings out of machine-readable output
            Log::set_enabled(!json);
            commands::status::handle_status_command(json)
        }
        CliAction::GetCommand {
            config_dir,
            fields,
            json,
        } => {
            config::set_config_dir(config_dir)?;
            Log::set_enabled(!json);
            commands::get::handle_get_command(&fields, json)
        }
        CliAction::SetCommand { config_dir, fields } => {
            config::set_config_dir(config_dir)?;
            commands::set::handle_set_command(&fields)
        }
        CliAction::HelpCommand { command } => commands::help::run_help_command(command.as_deref()),
    }
}
