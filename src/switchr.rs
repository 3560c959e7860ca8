//! Application coordinator that manages the complete lifecycle of the daemon.
//!
//! This module handles resource acquisition, initialization, and orchestration
//! of the scheduler. It manages:
//! - File logging and the version header
//! - Lock file management for single-instance enforcement
//! - Settings loading and the launch summary
//! - Appearance backend detection
//! - Signal handler setup and the settings file watcher
//!
//! The `Switchr` struct uses a builder pattern:
//! - Normal startup: `Switchr::new(debug_enabled).run()`
//! - Logging to a file: `Switchr::new(debug_enabled).with_log_file(path).run()`

use anyhow::{Context, Result};
use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::thread;

use crate::appearance::{self, AppearancePort};
use crate::common::utils::private_path;
use crate::config;
use crate::core::{Scheduler, SchedulerHandle, SchedulerTiming};
use crate::events::{AppearanceEvent, EventBus};
use crate::io::lock::{self, LockStatus};
use crate::io::signals::{AppSignal, setup_signal_handler};
use crate::logger::Log;
use crate::schedule::Mode;
use crate::time_source::RealTimeSource;

/// Builder for configuring and running the switchr daemon.
///
/// # Examples
///
/// ```no_run
/// use switchr::Switchr;
///
/// # fn main() -> anyhow::Result<()> {
/// Switchr::new(false).run()?;
/// # Ok(())
/// # }
/// ```
pub struct Switchr {
    debug_enabled: bool,
    log_file: Option<String>,
}

impl Switchr {
    /// Create a new runner with defaults matching normal run
    pub fn new(debug_enabled: bool) -> Self {
        Self {
            debug_enabled,
            log_file: None,
        }
    }

    /// Route all output to a file instead of stdout
    pub fn with_log_file(mut self, log_file: Option<String>) -> Self {
        self.log_file = log_file;
        self
    }

    /// Run the daemon until a shutdown signal arrives.
    pub fn run(self) -> Result<()> {
        // Keep the writer thread alive until the very end
        let _log_guard = match self.log_file {
            Some(path) => Some(Log::start_file_logging(path)?),
            None => None,
        };
        if self.debug_enabled {
            Log::set_timestamps(true);
        }

        log_version!();

        let lock_path = lock::lock_path();
        let instance_lock = match lock::acquire_lock(&lock_path)? {
            LockStatus::Acquired(lock) => lock,
            LockStatus::HeldBy(Some(pid)) => {
                anyhow::bail!("switchr is already running (PID: {pid})")
            }
            LockStatus::HeldBy(None) => anyhow::bail!(
                "switchr is already running (lock held on {})",
                private_path(&lock_path)
            ),
        };

        if self.debug_enabled {
            log_pipe!();
            log_debug!("Holding instance lock {}", private_path(instance_lock.path()));
        }

        if let Some(custom_dir) = config::get_custom_config_dir() {
            log_block_start!("Base directory: {}", private_path(&custom_dir));
        }

        let store = config::open()?;
        if store.config().show_window_on_launch {
            store.config().log_config();
        }

        let port = appearance::detect_port()?;
        log_block_start!("Using {} appearance backend", port.name());

        let events = EventBus::new();
        spawn_change_logger(events.subscribe(), Arc::clone(&port))?;

        let enabled = store.config().enabled;
        let mut scheduler = Scheduler::new(
            store,
            port,
            Arc::new(RealTimeSource),
            events,
            SchedulerTiming::default(),
        )
        .with_debug(self.debug_enabled);
        let handle = scheduler.handle();

        let signals = setup_signal_handler(self.debug_enabled)?;

        let settings_path = config::get_settings_path()?;
        if let Err(e) = config::start_config_watcher(handle.clone(), settings_path, self.debug_enabled)
        {
            log_pipe!();
            log_warning!("Settings hot reload unavailable: {e}");
            log_indented!("Send SIGUSR2 to reload manually");
        }

        scheduler.start()?;
        if enabled {
            log_block_start!("Following the schedule");
        } else {
            log_block_start!("Schedule disabled, waiting for changes");
        }

        serve_signals(&signals, &handle);

        scheduler.stop();
        drop(instance_lock);
        log_block_start!("Shutting down switchr...");
        log_end!();
        Ok(())
    }
}

/// Forward signals to the scheduler until a shutdown is requested.
fn serve_signals(signals: &Receiver<AppSignal>, handle: &SchedulerHandle) {
    while let Ok(signal) = signals.recv() {
        let sent = match signal {
            AppSignal::Shutdown => break,
            AppSignal::Toggle => handle.toggle(),
            AppSignal::Reload => handle.reload(),
        };
        if let Err(e) = sent {
            log_pipe!();
            log_error!("{e}");
            break;
        }
    }
}

/// Log the mode the system reports after every completed change.
fn spawn_change_logger(
    changes: Receiver<AppearanceEvent>,
    port: Arc<dyn AppearancePort>,
) -> Result<()> {
    thread::Builder::new()
        .name("switchr-changes".to_string())
        .spawn(move || {
            for AppearanceEvent::Changed in changes {
                match port.read() {
                    Ok(dark) => log_decorated!("Appearance is now {}", Mode::from_dark(dark)),
                    Err(e) => {
                        log_pipe!();
                        log_warning!("Could not read appearance after change: {e}");
                    }
                }
            }
        })
        .context("Failed to spawn change logger thread")?;
    Ok(())
}
