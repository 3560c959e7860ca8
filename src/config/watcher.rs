//! File watching module for hot config reloading.
//!
//! Watches the settings directory and asks the scheduler to reload whenever
//! `settings.toml` is created, modified or removed. Bursts of events are
//! coalesced into one reload that fires once the file has gone quiet.
//!
//! The directory is watched rather than the file itself so that editors
//! replacing the file through a rename, and our own atomic saves, are both
//! picked up.

use anyhow::{Context, Result};
use notify::{
    Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher,
};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, RecvTimeoutError, channel};
use std::thread;
use std::time::{Duration, Instant};

use crate::common::constants::{SETTINGS_FILE_NAME, WATCHER_DEBOUNCE};
use crate::common::utils::private_path;
use crate::core::SchedulerHandle;

/// Settings file watcher that triggers scheduler reloads.
pub struct ConfigWatcher {
    handle: SchedulerHandle,
    settings_path: PathBuf,
    debounce: Duration,
    debug_enabled: bool,
}

impl ConfigWatcher {
    pub fn new(handle: SchedulerHandle, settings_path: PathBuf, debug_enabled: bool) -> Self {
        Self {
            handle,
            settings_path,
            debounce: WATCHER_DEBOUNCE,
            debug_enabled,
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Start watching on a background thread.
    ///
    /// The settings directory is created if needed so a first save can be seen.
    pub fn start(self) -> Result<()> {
        let dir = self
            .settings_path
            .parent()
            .context("Settings path has no parent directory")?
            .to_path_buf();
        std::fs::create_dir_all(&dir).with_context(|| {
            format!("Failed to create settings directory {}", private_path(&dir))
        })?;

        let (tx, rx) = channel();
        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| {
                if let Ok(event) = res
                    && matches!(
                        event.kind,
                        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                    )
                {
                    let _ = tx.send(event);
                }
            },
            NotifyConfig::default(),
        )
        .context("Failed to create file watcher")?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch directory: {}", private_path(&dir)))?;

        if self.debug_enabled {
            log_pipe!();
            log_debug!("Watching {} for changes", private_path(&self.settings_path));
        }

        thread::Builder::new()
            .name("switchr-config-watcher".to_string())
            .spawn(move || {
                // Keep the watcher alive for as long as the thread runs
                let _watcher = watcher;
                self.serve(&rx);
            })
            .context("Failed to spawn config watcher thread")?;

        Ok(())
    }

    /// Reload once per burst of changes, after the file has been quiet for `debounce`.
    ///
    /// A multi-key save renames the file several times in a row; reloading on
    /// the last event of the burst makes the scheduler see the final content.
    fn serve(&self, rx: &Receiver<Event>) {
        loop {
            match rx.recv() {
                Ok(event) if touches_settings(&event) => {}
                Ok(_) => continue,
                Err(_) => return,
            }

            if self.debug_enabled {
                log_pipe!();
                log_debug!("Settings file change detected");
            }

            let mut quiet_at = Instant::now() + self.debounce;
            loop {
                let wait = quiet_at.saturating_duration_since(Instant::now());
                match rx.recv_timeout(wait) {
                    Ok(event) if touches_settings(&event) => {
                        quiet_at = Instant::now() + self.debounce;
                    }
                    Ok(_) => {}
                    Err(RecvTimeoutError::Timeout) => break,
                    Err(RecvTimeoutError::Disconnected) => return,
                }
            }

            if self.handle.reload().is_err() {
                return;
            }
        }
    }
}

fn touches_settings(event: &Event) -> bool {
    event.paths.iter().any(|path| is_settings_file(path))
}

fn is_settings_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name == SETTINGS_FILE_NAME)
}

/// Start the settings file watcher for the running scheduler.
pub fn start_config_watcher(
    handle: SchedulerHandle,
    settings_path: PathBuf,
    debug_enabled: bool,
) -> Result<()> {
    ConfigWatcher::new(handle, settings_path, debug_enabled).start()
}
