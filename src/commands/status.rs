//! Status command: current mode, schedule, and the next switch.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::appearance;
use crate::common::utils::format_duration;
use crate::config::{self, ScheduleConfig};
use crate::io::lock;
use crate::schedule::{Mode, TimeOfDay};
use crate::time_source::{RealTimeSource, TimeSource};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextSwitch {
    pub at: String,
    pub mode: Mode,
    pub in_minutes: u16,
}

/// Everything the status command reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub backend: Option<String>,
    /// `None` when the backend could not be read
    pub current_mode: Option<Mode>,
    pub schedule_enabled: bool,
    pub light_time: String,
    pub dark_time: String,
    pub scheduled_mode: Mode,
    pub next_switch: Option<NextSwitch>,
    pub daemon_pid: Option<u32>,
}

impl StatusReport {
    pub fn build(
        config: &ScheduleConfig,
        now: TimeOfDay,
        backend: Option<&str>,
        current_mode: Option<Mode>,
        daemon_pid: Option<u32>,
    ) -> Self {
        let window = config.window();
        let next_switch = window.next_boundary(now).map(|boundary| NextSwitch {
            at: boundary.at.to_string(),
            mode: boundary.mode,
            in_minutes: boundary.minutes_until,
        });

        Self {
            backend: backend.map(str::to_string),
            current_mode,
            schedule_enabled: config.enabled,
            light_time: config.light_time().to_string(),
            dark_time: config.dark_time().to_string(),
            scheduled_mode: window.mode_at(now),
            next_switch,
            daemon_pid,
        }
    }

    fn print(&self) {
        let current = self
            .current_mode
            .map(|mode| mode.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        println!("  Current mode: {current}");
        println!(
            "      Schedule: {} (light {} / dark {})",
            if self.schedule_enabled { "enabled" } else { "disabled" },
            self.light_time,
            self.dark_time
        );
        println!("Scheduled mode: {}", self.scheduled_mode);
        match &self.next_switch {
            Some(next) => println!(
                "   Next switch: {} mode at {} (in {})",
                next.mode,
                next.at,
                format_duration(u64::from(next.in_minutes) * 60)
            ),
            None => println!("   Next switch: none (light all day)"),
        }
        match self.daemon_pid {
            Some(pid) => println!("        Daemon: running (PID: {pid})"),
            None => println!("        Daemon: not running"),
        }
        if let Some(backend) = &self.backend {
            println!("       Backend: {backend}");
        }
    }
}

/// Handle the status command.
pub fn handle_status_command(json: bool) -> Result<()> {
    let store = config::open()?;

    let (backend, current_mode) = match appearance::detect_port() {
        Ok(port) => (Some(port.name()), port.read().ok().map(Mode::from_dark)),
        Err(_) => (None, None),
    };
    let daemon_pid = lock::read_running_pid(&lock::lock_path());

    let report = StatusReport::build(
        store.config(),
        RealTimeSource.time_of_day(),
        backend,
        current_mode,
        daemon_pid,
    );

    if json {
        let output =
            serde_json::to_string_pretty(&report).context("Failed to serialize status")?;
        println!("{output}");
    } else {
        report.print();
    }
    Ok(())
}

/// Display help for the status command
pub fn display_help() {
    log_version!();
    log_block_start!("status - Show the current mode and schedule");
    log_block_start!("Usage: switchr status [OPTIONS]");
    log_block_start!("Options:");
    log_indented!("-j, --json  Output as JSON");
    log_block_start!("Output:");
    log_indented!("Current mode    What the system shows right now");
    log_indented!("Schedule        Whether auto-switching is on and its switch points");
    log_indented!("Scheduled mode  What the schedule asks for at this minute");
    log_indented!("Next switch     The next switch point and the time until it");
    log_end!();
}
