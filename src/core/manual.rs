//! User-initiated mode changes outside the schedule.
//!
//! A manual change only touches the external appearance. The schedule is not
//! paused: while it is enabled, the next tick compares against the new actual
//! mode and switches back if the schedule disagrees.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::appearance::AppearancePort;
use crate::events::{AppearanceEvent, EventBus};
use crate::schedule::Mode;

/// What [`ManualOverride::set_mode`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideOutcome {
    /// The system already showed the target mode; nothing was sent
    AlreadySet,
    /// A change request was issued
    Requested,
}

pub struct ManualOverride {
    port: Arc<dyn AppearancePort>,
    events: EventBus,
}

impl ManualOverride {
    pub fn new(port: Arc<dyn AppearancePort>, events: EventBus) -> Self {
        Self { port, events }
    }

    pub fn current_mode(&self) -> Result<Mode> {
        let dark = self
            .port
            .read()
            .with_context(|| format!("Failed to read appearance from {}", self.port.name()))?;
        Ok(Mode::from_dark(dark))
    }

    /// Request the opposite of the current mode. Returns the requested mode.
    pub fn toggle(&self) -> Result<Mode> {
        let target = self.current_mode()?.opposite();
        self.request(target);
        Ok(target)
    }

    /// Request `mode`, skipping the external call when it is already active.
    ///
    /// An unreadable current mode does not block the request.
    pub fn set_mode(&self, mode: Mode) -> OverrideOutcome {
        match self.current_mode() {
            Ok(current) if current == mode => return OverrideOutcome::AlreadySet,
            Ok(_) => {}
            Err(e) => {
                log_pipe!();
                log_warning!("{e}, requesting {mode} mode anyway");
            }
        }
        self.request(mode);
        OverrideOutcome::Requested
    }

    pub fn set_dark(&self, dark: bool) -> OverrideOutcome {
        self.set_mode(Mode::from_dark(dark))
    }

    fn request(&self, mode: Mode) {
        log_block_start!("Switching to {mode} mode");
        let events = self.events.clone();
        self.port.request_change(
            mode.is_dark(),
            Box::new(move || {
                events.publish(AppearanceEvent::Changed);
            }),
        );
    }
}
