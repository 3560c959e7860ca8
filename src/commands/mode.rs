//! Toggle, dark and light commands.
//!
//! These change the appearance once, outside the schedule. When the schedule
//! is enabled and disagrees with the new mode, a running daemon switches back
//! at its next tick; the command says so instead of pausing the schedule.
//!
//! `toggle` is delivered to a running daemon as `SIGUSR1` so the change goes
//! through its scheduler thread. `dark` and `light` have no signal and always
//! drive the backend from this process.

use anyhow::Result;
use std::sync::Arc;

use crate::appearance::{self, AppearancePort};
use crate::args::ModeRequest;
use crate::common::constants::COMMAND_COMPLETION_TIMEOUT;
use crate::config::ScheduleConfig;
use crate::core::{ManualOverride, OverrideOutcome};
use crate::events::EventBus;
use crate::io::lock;
use crate::io::signals::{self, AppSignal};
use crate::schedule::Mode;
use crate::time_source::{RealTimeSource, TimeSource};

/// Where a mode request is carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Route {
    /// Signal the daemon with this PID
    Daemon(u32),
    /// Call the backend directly
    InProcess,
}

pub(crate) fn route(request: ModeRequest, running_pid: Option<u32>) -> Route {
    match (request, running_pid) {
        (ModeRequest::Toggle, Some(pid)) => Route::Daemon(pid),
        _ => Route::InProcess,
    }
}

/// Handle `toggle`, `dark` and `light`.
pub fn handle_mode_command(request: ModeRequest, debug_enabled: bool) -> Result<()> {
    log_version!();

    if let Route::Daemon(pid) = route(request, lock::read_running_pid(&lock::lock_path())) {
        match signals::send_to_instance(pid, AppSignal::Toggle) {
            Ok(()) => {
                log_block_start!("Asked the running instance (PID: {pid}) to toggle");
                log_end!();
                return Ok(());
            }
            Err(e) => {
                log_pipe!();
                log_warning!("Could not signal the running instance: {e}");
                log_indented!("Toggling from this process instead");
            }
        }
    }

    let port = appearance::detect_port()?;
    if debug_enabled {
        log_block_start!("Using {} appearance backend", port.name());
    }

    let events = EventBus::new();
    let completed = events.subscribe();
    let manual = ManualOverride::new(Arc::clone(&port), events);

    let requested = match request {
        ModeRequest::Toggle => Some(manual.toggle()?),
        ModeRequest::Set(mode) => match manual.set_mode(mode) {
            OverrideOutcome::Requested => Some(mode),
            OverrideOutcome::AlreadySet => {
                log_block_start!("Already in {mode} mode");
                None
            }
        },
    };

    if let Some(mode) = requested {
        if !super::wait_for_completion(&completed, COMMAND_COMPLETION_TIMEOUT) {
            log_pipe!();
            log_warning!(
                "The change did not finish within {}s",
                COMMAND_COMPLETION_TIMEOUT.as_secs()
            );
        } else {
            report_result(port.as_ref(), mode);
        }

        if let Ok(store) = crate::config::open() {
            warn_if_schedule_disagrees(store.config(), mode, &RealTimeSource);
        }
    }

    log_end!();
    Ok(())
}

fn report_result(port: &dyn AppearancePort, mode: Mode) {
    match port.read() {
        Ok(dark) if dark == mode.is_dark() => log_decorated!("Now in {mode} mode"),
        Ok(_) => {
            log_pipe!();
            log_warning!("The system is still not in {mode} mode");
            log_indented!("The appearance command may lack permission to control the system");
        }
        Err(e) => {
            log_pipe!();
            log_warning!("Could not confirm the change: {e}");
        }
    }
}

/// Whether the active schedule wants a different mode right now.
pub(crate) fn schedule_conflict(config: &ScheduleConfig, mode: Mode, clock: &dyn TimeSource) -> bool {
    config.enabled && config.window().mode_at(clock.time_of_day()) != mode
}

fn warn_if_schedule_disagrees(config: &ScheduleConfig, mode: Mode, clock: &dyn TimeSource) {
    if !schedule_conflict(config, mode, clock) {
        return;
    }
    if let Some(pid) = lock::read_running_pid(&lock::lock_path()) {
        log_pipe!();
        log_info!("The schedule wants {} mode right now", mode.opposite());
        log_indented!("The running instance (PID: {pid}) will switch back within a minute");
    }
}

/// Display help for the mode commands
pub fn display_help() {
    log_version!();
    log_block_start!("toggle, dark, light - Change the appearance once");
    log_block_start!("Usage:");
    log_indented!("switchr toggle");
    log_indented!("switchr dark");
    log_indented!("switchr light");
    log_block_start!("Description:");
    log_indented!("Switches the system appearance right away, independent of the schedule.");
    log_indented!("While the schedule is enabled, a running switchr instance moves back");
    log_indented!("to the scheduled mode at its next check. When an instance is running,");
    log_indented!("toggle is sent to it as SIGUSR1.");
    log_block_start!("Examples:");
    log_indented!("# Flip between light and dark");
    log_indented!("switchr toggle");
    log_pipe!();
    log_indented!("# Force dark mode");
    log_indented!("switchr dark");
    log_end!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::TimeOfDay;
    use crate::time_source::FixedTimeSource;

    #[test]
    fn test_schedule_conflict() {
        let clock = FixedTimeSource::new(TimeOfDay::new(14, 0).unwrap());
        let mut config = ScheduleConfig::default();

        // Disabled schedule never conflicts
        assert!(!schedule_conflict(&config, Mode::Dark, &clock));

        config.enabled = true;
        assert!(schedule_conflict(&config, Mode::Dark, &clock));
        assert!(!schedule_conflict(&config, Mode::Light, &clock));
    }

    #[test]
    fn test_toggle_goes_through_running_instance() {
        assert_eq!(route(ModeRequest::Toggle, Some(4242)), Route::Daemon(4242));
        assert_eq!(route(ModeRequest::Toggle, None), Route::InProcess);
        assert_eq!(route(ModeRequest::Set(Mode::Dark), Some(4242)), Route::InProcess);
        assert_eq!(route(ModeRequest::Set(Mode::Light), None), Route::InProcess);
    }
}
