//! # Switchr Library
//!
//! Internal library for the switchr binary application
//!
//! This library exists to enable testing of the scheduling internals and to
//! keep a clean separation between CLI dispatch (main.rs) and application logic.
//!
//! ## Architecture
//!
//! - **Entry Point**: `Switchr` struct runs the daemon with resource management
//! - **Schedule**: `schedule` module maps a minute of the day to the desired mode
//! - **Core Logic**: `core` module owns the reconciliation loop and manual override
//! - **Appearance**: `appearance` module with the port trait and platform backends
//! - **Configuration**: `config` module for the flat settings store with hot-reload
//! - **Commands**: `commands` module for CLI subcommands (toggle, status, get, set)
//! - **Infrastructure**: Signal handling, lock file, events, logging, and utilities

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod logger;

// Public API modules
pub mod appearance;
pub mod args;
pub mod commands;
pub mod common;
pub mod config;
pub mod core;
pub mod events;
pub mod io;
pub mod schedule;
pub mod time_source;

// Internal modules
mod switchr;

// Re-export for binary
pub use switchr::Switchr;
