//! Single reconciliation step: compare desired and actual mode, correct once.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::appearance::AppearancePort;
use crate::config::{ConfigStore, ScheduleConfig};
use crate::events::{AppearanceEvent, EventBus};
use crate::schedule::Mode;
use crate::time_source::TimeSource;

/// Result of one [`Reconciler::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Schedule disabled, nothing evaluated
    Disabled,
    /// Actual mode already matches the schedule
    InSync { dark: bool },
    /// A change request towards the desired mode was issued
    Requested { dark: bool },
    /// A previously issued correction has not completed yet
    Pending,
    /// The current mode could not be read; retried next tick
    ReadFailed,
}

impl fmt::Display for TickOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TickOutcome::Disabled => f.write_str("schedule disabled"),
            TickOutcome::InSync { dark } => write!(f, "in sync ({})", Mode::from_dark(*dark)),
            TickOutcome::Requested { dark } => {
                write!(f, "requested {} mode", Mode::from_dark(*dark))
            }
            TickOutcome::Pending => f.write_str("previous correction still running"),
            TickOutcome::ReadFailed => f.write_str("could not read current mode"),
        }
    }
}

/// Owns everything one tick needs. Lives on the scheduler thread.
pub struct Reconciler {
    config: ConfigStore,
    port: Arc<dyn AppearancePort>,
    clock: Arc<dyn TimeSource>,
    events: EventBus,
    in_flight: Arc<AtomicBool>,
    debug_enabled: bool,
}

impl Reconciler {
    pub fn new(
        config: ConfigStore,
        port: Arc<dyn AppearancePort>,
        clock: Arc<dyn TimeSource>,
        events: EventBus,
    ) -> Self {
        Self {
            config,
            port,
            clock,
            events,
            in_flight: Arc::new(AtomicBool::new(false)),
            debug_enabled: false,
        }
    }

    pub fn with_debug(mut self, debug_enabled: bool) -> Self {
        self.debug_enabled = debug_enabled;
        self
    }

    /// Desired mode for the current minute, ignoring whether the schedule is enabled.
    pub fn desired_mode(&self) -> Mode {
        self.config.config().window().mode_at(self.clock.time_of_day())
    }

    /// Evaluate the schedule once and issue at most one change request.
    ///
    /// The actual mode is re-read on every call. Nothing here blocks on the
    /// external command; its completion clears the in-flight marker and
    /// publishes [`AppearanceEvent::Changed`].
    pub fn tick(&self) -> TickOutcome {
        if !self.config.config().enabled {
            return TickOutcome::Disabled;
        }
        if self.in_flight.load(Ordering::SeqCst) {
            return TickOutcome::Pending;
        }

        let desired = self.desired_mode().is_dark();
        let actual = match self.port.read() {
            Ok(actual) => actual,
            Err(e) => {
                if self.debug_enabled {
                    log_pipe!();
                    log_debug!("Could not read appearance from {}: {e}", self.port.name());
                }
                return TickOutcome::ReadFailed;
            }
        };

        if desired == actual {
            return TickOutcome::InSync { dark: actual };
        }

        log_block_start!("Switching to {} mode on schedule", Mode::from_dark(desired));

        self.in_flight.store(true, Ordering::SeqCst);
        let in_flight = Arc::clone(&self.in_flight);
        let events = self.events.clone();
        self.port.request_change(
            desired,
            Box::new(move || {
                in_flight.store(false, Ordering::SeqCst);
                events.publish(AppearanceEvent::Changed);
            }),
        );

        TickOutcome::Requested { dark: desired }
    }

    /// Re-read the configuration from its store.
    pub fn reload(&mut self) -> ScheduleConfig {
        self.config.load()
    }

    pub fn config(&self) -> &ScheduleConfig {
        self.config.config()
    }

    pub fn config_store_mut(&mut self) -> &mut ConfigStore {
        &mut self.config
    }

    /// Surface any pending permission prompt of the port.
    pub fn warm_up(&self) {
        if self.debug_enabled {
            log_pipe!();
            log_debug!("Warming up {} appearance backend", self.port.name());
        }
        self.port.warm_up();
    }

    /// Whether a loop-issued correction is still running.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }
}
