//! Appearance port abstraction over the platform light/dark setting.
//!
//! The core only needs two things from the platform: a fast synchronous read
//! of whether dark mode is active, and an asynchronous request to change it.
//! Both are expressed by the [`AppearancePort`] trait so the reconciliation
//! loop never depends on how a platform stores or flips the setting.
//!
//! ## Supported Platforms
//!
//! - **macOS**: [`macos::OsascriptPort`] reads the global `AppleInterfaceStyle`
//!   default and flips the mode through System Events with `osascript`.
//! - **Linux desktops**: [`freedesktop::FreedesktopPort`] reads the
//!   `color-scheme` preference from the XDG desktop portal over D-Bus and
//!   writes it with `gsettings`.
//!
//! ## Change Requests
//!
//! A change request never blocks the caller. The platform command runs on a
//! worker thread; its exit status is only logged, and the completion callback
//! fires once the command has exited, successful or not. Callers that need
//! to know the outcome re-read the state afterwards.

use anyhow::Result;
use std::sync::Arc;

pub mod command;
pub mod freedesktop;
pub mod macos;

#[cfg(any(test, feature = "testing-support"))]
pub mod testing;

/// Invoked once after an external change command has exited.
pub type CompletionCallback = Box<dyn FnOnce() + Send + 'static>;

/// Capability to observe and change the system appearance.
#[cfg_attr(test, mockall::automock)]
pub trait AppearancePort: Send + Sync {
    /// Human-readable backend name for logs.
    fn name(&self) -> &'static str;

    /// Whether dark mode is active right now.
    ///
    /// This queries the live system property and must return within a few
    /// milliseconds; no cached value is involved.
    fn read(&self) -> Result<bool>;

    /// Ask the platform to switch to the target mode without waiting for it.
    ///
    /// `on_complete` is invoked exactly once after the external command has
    /// exited, regardless of its exit status.
    fn request_change(&self, target_dark: bool, on_complete: CompletionCallback);

    /// Issue a harmless request that surfaces any pending permission prompt.
    ///
    /// The default does nothing; backends that need automation permission
    /// override it.
    fn warm_up(&self) {}
}

/// Pick the appearance backend for the platform this binary runs on.
pub fn detect_port() -> Result<Arc<dyn AppearancePort>> {
    if cfg!(target_os = "macos") {
        Ok(Arc::new(macos::OsascriptPort::new()))
    } else if cfg!(any(
        target_os = "linux",
        target_os = "freebsd",
        target_os = "openbsd",
        target_os = "netbsd"
    )) {
        Ok(Arc::new(freedesktop::FreedesktopPort::new()))
    } else {
        anyhow::bail!(
            "No appearance backend is available for {}",
            std::env::consts::OS
        )
    }
}
