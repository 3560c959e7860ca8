//! Command-line argument parsing and processing.
//!
//! This module handles parsing of command-line arguments and provides a clean
//! interface for the main application logic. Global flags may appear anywhere
//! on the command line; the first non-flag argument selects the command.

use crate::schedule::Mode;

/// Manual mode change requested from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeRequest {
    Toggle,
    Set(Mode),
}

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Run the scheduling daemon
    Run {
        debug_enabled: bool,
        config_dir: Option<String>,
        log_file: Option<String>,
    },
    /// Toggle or set the mode once and exit
    ModeCommand {
        debug_enabled: bool,
        config_dir: Option<String>,
        request: ModeRequest,
    },
    /// Show the current mode and schedule
    StatusCommand {
        config_dir: Option<String>,
        json: bool,
    },
    /// Read settings
    GetCommand {
        config_dir: Option<String>,
        fields: Vec<String>,
        json: bool,
    },
    /// Write settings
    SetCommand {
        config_dir: Option<String>,
        fields: Vec<(String, String)>,
    },
    /// Detailed help for one command
    HelpCommand { command: Option<String> },

    /// Display help information and exit
    ShowHelp,
    /// Display version information and exit
    ShowVersion,
    /// Show help due to unknown arguments and exit
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

impl ParsedArgs {
    /// Parse command-line arguments into a structured result.
    ///
    /// # Arguments
    /// * `args` - Iterator over command-line arguments (typically from std::env::args())
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut debug_enabled = false;
        let mut display_help = false;
        let mut display_version = false;
        let mut json = false;
        let mut config_dir: Option<String> = None;
        let mut log_file: Option<String> = None;
        let mut positionals: Vec<String> = Vec::new();

        let args_vec: Vec<String> = args
            .into_iter()
            .skip(1)
            .map(|s| s.as_ref().to_string())
            .collect();

        let mut iter = args_vec.into_iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--debug" | "-d" => debug_enabled = true,
                "--help" | "-h" => display_help = true,
                "--version" | "-V" | "-v" => display_version = true,
                "--json" | "-j" => json = true,
                "--config" | "-c" => match iter.next() {
                    Some(dir) => config_dir = Some(dir),
                    None => {
                        log_warning_standalone!("Missing directory for {arg}");
                        return Self::error();
                    }
                },
                "--log" | "-l" => match iter.next() {
                    Some(path) => log_file = Some(path),
                    None => {
                        log_warning_standalone!("Missing file path for {arg}");
                        return Self::error();
                    }
                },
                flag if flag.starts_with('-') && flag.len() > 1 => {
                    log_warning_standalone!("Unknown argument: {flag}");
                    return Self::error();
                }
                _ => positionals.push(arg),
            }
        }

        if display_version {
            return ParsedArgs {
                action: CliAction::ShowVersion,
            };
        }

        let (command, rest) = match positionals.split_first() {
            Some((command, rest)) => (Some(command.as_str()), rest),
            None => (None, &positionals[..]),
        };

        if display_help {
            let action = match command {
                Some("help") | Some("h") | None => CliAction::ShowHelp,
                Some(command) => CliAction::HelpCommand {
                    command: Some(command.to_string()),
                },
            };
            return ParsedArgs { action };
        }

        let action = match command {
            None | Some("run") => {
                if let Some(extra) = rest.first() {
                    log_warning_standalone!("Unexpected argument for run: {extra}");
                    return Self::error();
                }
                CliAction::Run {
                    debug_enabled,
                    config_dir,
                    log_file,
                }
            }
            Some(name @ ("toggle" | "t" | "dark" | "light")) => {
                if let Some(extra) = rest.first() {
                    log_warning_standalone!("Unexpected argument for {name}: {extra}");
                    return Self::error();
                }
                let request = match name {
                    "dark" => ModeRequest::Set(Mode::Dark),
                    "light" => ModeRequest::Set(Mode::Light),
                    _ => ModeRequest::Toggle,
                };
                CliAction::ModeCommand {
                    debug_enabled,
                    config_dir,
                    request,
                }
            }
            Some("status" | "st") => CliAction::StatusCommand { config_dir, json },
            Some("get" | "g") => {
                if rest.is_empty() {
                    log_warning_standalone!("Missing field name. Usage: switchr get <field>...");
                    return Self::error();
                }
                CliAction::GetCommand {
                    config_dir,
                    fields: rest.to_vec(),
                    json,
                }
            }
            Some("set" | "s") => {
                if rest.is_empty() {
                    log_warning_standalone!(
                        "Missing assignment. Usage: switchr set <field>=<value>..."
                    );
                    return Self::error();
                }
                let mut fields = Vec::with_capacity(rest.len());
                for assignment in rest {
                    match assignment.split_once('=') {
                        Some((field, value)) if !field.is_empty() && !value.is_empty() => {
                            fields.push((field.to_string(), value.to_string()));
                        }
                        _ => {
                            log_warning_standalone!(
                                "Invalid assignment '{assignment}', expected <field>=<value>"
                            );
                            return Self::error();
                        }
                    }
                }
                CliAction::SetCommand { config_dir, fields }
            }
            Some("help" | "h") => CliAction::HelpCommand {
                command: rest.first().cloned(),
            },
            Some(unknown) => {
                log_warning_standalone!("Unknown command: {unknown}");
                return Self::error();
            }
        };

        ParsedArgs { action }
    }

    fn error() -> ParsedArgs {
        ParsedArgs {
            action: CliAction::ShowHelpDueToError,
        }
    }

    /// Convenience method to parse from std::env::args()
    pub fn from_env() -> ParsedArgs {
        Self::parse(std::env::args())
    }
}

/// Displays version information using custom logging style.
pub fn display_version_info() {
    log_version!();
    log_pipe!();
    crate::logger::write_output(&format!("┗ {}\n", env!("CARGO_PKG_DESCRIPTION")));
}

/// Displays custom help message using logger methods.
pub fn display_help() {
    log_version!();
    log_block_start!(env!("CARGO_PKG_DESCRIPTION"));
    log_block_start!("Usage:");
    log_indented!("switchr [OPTIONS] [COMMAND]");
    log_block_start!("Options:");
    log_indented!("-c, --config <dir>     Use custom configuration directory");
    log_indented!("-d, --debug            Enable detailed debug output");
    log_indented!("-h, --help             Print help information");
    log_indented!("-j, --json             JSON output for status and get");
    log_indented!("-l, --log <file>       Write daemon output to a file");
    log_indented!("-V, --version          Print version information");
    log_block_start!("Commands:");
    log_indented!("run                    Follow the schedule (default)");
    log_indented!("toggle, t              Switch to the opposite mode");
    log_indented!("dark | light           Switch to the given mode");
    log_indented!("status, st             Show current mode and schedule");
    log_indented!("get, g <field>...      Read setting(s)");
    log_indented!("set, s <field>=<value> [...] Update setting(s)");
    log_indented!("help, h [COMMAND]      Show detailed help for a command");
    log_end!();
}
