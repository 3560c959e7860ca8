//! Reconciliation loop and its owning thread.
//!
//! The [`Scheduler`] runs a single thread that owns the configuration, the
//! reconciler and the manual override. Everything that reads the schedule or
//! talks to the appearance port from the loop happens on that thread, so two
//! reconciliations can never interleave. Other threads talk to it through a
//! [`SchedulerHandle`], which queues [`SchedulerMessage`]s on a channel:
//!
//! - Startup: warm up the port, wait `startup_delay`, then run the first tick
//! - Steady state: one tick every `interval`, messages served in between
//! - Shutdown: [`Scheduler::stop`] sends `Shutdown` and joins the thread
//!
//! The thread hands its state back when it exits, so a stopped scheduler can
//! be started again with the same configuration and handles.

pub mod manual;
pub mod reconcile;

use anyhow::{Context, Result};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, channel};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::appearance::AppearancePort;
use crate::common::constants::{STARTUP_DELAY, TICK_INTERVAL};
use crate::config::{ConfigStore, SettingKey, SettingValue};
use crate::events::EventBus;
use crate::schedule::Mode;
use crate::time_source::TimeSource;

pub use manual::{ManualOverride, OverrideOutcome};
pub use reconcile::{Reconciler, TickOutcome};

/// Requests served by the scheduler thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerMessage {
    /// Flip the current mode
    Toggle,
    /// Switch to a specific mode
    SetMode(Mode),
    /// Persist one setting, then reconcile
    UpdateSetting(SettingKey, SettingValue),
    /// Re-read the settings store, then reconcile
    Reload,
    /// Leave the loop
    Shutdown,
}

/// Loop timing. Tests shrink both values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerTiming {
    pub startup_delay: Duration,
    pub interval: Duration,
}

impl Default for SchedulerTiming {
    fn default() -> Self {
        Self {
            startup_delay: STARTUP_DELAY,
            interval: TICK_INTERVAL,
        }
    }
}

/// Cloneable sender side of the scheduler thread.
///
/// Stays valid for the whole lifetime of the [`Scheduler`], including while
/// it is stopped. Messages sent while stopped are served after the next start.
#[derive(Clone)]
pub struct SchedulerHandle {
    tx: Sender<SchedulerMessage>,
}

impl SchedulerHandle {
    fn send(&self, message: SchedulerMessage) -> Result<()> {
        self.tx
            .send(message)
            .map_err(|_| anyhow::anyhow!("Scheduler is no longer available"))
    }

    pub fn toggle(&self) -> Result<()> {
        self.send(SchedulerMessage::Toggle)
    }

    pub fn set_mode(&self, mode: Mode) -> Result<()> {
        self.send(SchedulerMessage::SetMode(mode))
    }

    pub fn set_dark(&self, dark: bool) -> Result<()> {
        self.set_mode(Mode::from_dark(dark))
    }

    pub fn update_setting(&self, key: SettingKey, value: SettingValue) -> Result<()> {
        self.send(SchedulerMessage::UpdateSetting(key, value))
    }

    pub fn reload(&self) -> Result<()> {
        self.send(SchedulerMessage::Reload)
    }
}

/// State owned by the scheduler thread while it runs.
struct LoopState {
    reconciler: Reconciler,
    manual: ManualOverride,
    rx: Receiver<SchedulerMessage>,
    timing: SchedulerTiming,
    debug_enabled: bool,
}

/// Owner of the reconciliation loop with an explicit start/stop lifecycle.
pub struct Scheduler {
    tx: Sender<SchedulerMessage>,
    state: Option<LoopState>,
    worker: Option<JoinHandle<LoopState>>,
}

impl Scheduler {
    pub fn new(
        config: ConfigStore,
        port: Arc<dyn AppearancePort>,
        clock: Arc<dyn TimeSource>,
        events: EventBus,
        timing: SchedulerTiming,
    ) -> Self {
        let (tx, rx) = channel();
        let manual = ManualOverride::new(Arc::clone(&port), events.clone());
        let reconciler = Reconciler::new(config, port, clock, events);
        Self {
            tx,
            state: Some(LoopState {
                reconciler,
                manual,
                rx,
                timing,
                debug_enabled: false,
            }),
            worker: None,
        }
    }

    /// Enable debug logging of every tick. Only effective before `start`.
    pub fn with_debug(mut self, debug_enabled: bool) -> Self {
        if let Some(state) = self.state.take() {
            self.state = Some(LoopState {
                reconciler: state.reconciler.with_debug(debug_enabled),
                debug_enabled,
                ..state
            });
        }
        self
    }

    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            tx: self.tx.clone(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Spawn the scheduler thread. Does nothing if it is already running.
    pub fn start(&mut self) -> Result<()> {
        if self.worker.is_some() {
            return Ok(());
        }
        let state = self
            .state
            .take()
            .context("Scheduler state was lost after a previous failure")?;

        let worker = thread::Builder::new()
            .name("switchr-scheduler".to_string())
            .spawn(move || run_loop(state))
            .context("Failed to spawn scheduler thread")?;
        self.worker = Some(worker);
        Ok(())
    }

    /// Stop the scheduler thread and wait for it to exit.
    ///
    /// No tick runs after this returns. Change requests already handed to the
    /// port keep running and still publish their completion. Does nothing if
    /// the scheduler is not running.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };

        // The thread owns the receiver, so this only fails if it already exited
        let _ = self.tx.send(SchedulerMessage::Shutdown);
        match worker.join() {
            Ok(state) => self.state = Some(state),
            Err(_) => {
                log_pipe!();
                log_critical!("Scheduler thread panicked, its state is lost");
            }
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_loop(mut state: LoopState) -> LoopState {
    state.reconciler.warm_up();

    let mut next_tick = Instant::now() + state.timing.startup_delay;
    loop {
        let timeout = next_tick.saturating_duration_since(Instant::now());
        match state.rx.recv_timeout(timeout) {
            Ok(SchedulerMessage::Shutdown) => break,
            Ok(message) => state.handle_message(message),
            Err(RecvTimeoutError::Timeout) => {
                state.run_tick();
                next_tick = Instant::now() + state.timing.interval;
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    if state.debug_enabled {
        log_pipe!();
        log_debug!("Scheduler thread stopped");
    }
    state
}

impl LoopState {
    fn run_tick(&self) -> TickOutcome {
        let outcome = self.reconciler.tick();
        if self.debug_enabled {
            log_pipe!();
            log_debug!("Tick: {outcome}");
        }
        outcome
    }

    fn handle_message(&mut self, message: SchedulerMessage) {
        match message {
            SchedulerMessage::Toggle => {
                if let Err(e) = self.manual.toggle() {
                    log_pipe!();
                    log_error!("Toggle failed: {e}");
                }
            }
            SchedulerMessage::SetMode(mode) => {
                if self.manual.set_mode(mode) == OverrideOutcome::AlreadySet {
                    log_block_start!("Already in {mode} mode");
                }
            }
            SchedulerMessage::UpdateSetting(key, value) => {
                match self.reconciler.config_store_mut().save(key, value) {
                    Ok(()) => {
                        log_block_start!("Updated {key} = {value}");
                        self.run_tick();
                    }
                    Err(e) => {
                        log_pipe!();
                        log_error!("Could not save {key}: {e}");
                    }
                }
            }
            SchedulerMessage::Reload => {
                let config = self.reconciler.reload();
                log_block_start!("Settings reloaded");
                if self.debug_enabled {
                    config.log_config();
                }
                self.run_tick();
            }
            // Handled by run_loop
            SchedulerMessage::Shutdown => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appearance::testing::FakeAppearance;
    use crate::common::constants::KEY_SCHEDULE_ENABLED;
    use crate::config::MemoryStore;
    use crate::schedule::TimeOfDay;
    use crate::time_source::FixedTimeSource;

    fn quick_timing() -> SchedulerTiming {
        SchedulerTiming {
            startup_delay: Duration::from_millis(10),
            interval: Duration::from_millis(20),
        }
    }

    fn scheduler_for(fake: &Arc<FakeAppearance>, store: MemoryStore, hour: u8) -> Scheduler {
        let clock = Arc::new(FixedTimeSource::new(TimeOfDay::new(hour, 0).unwrap()));
        Scheduler::new(
            ConfigStore::new(Box::new(store)),
            fake.clone(),
            clock,
            EventBus::new(),
            quick_timing(),
        )
    }

    fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        condition()
    }

    #[test]
    fn test_stop_before_start_is_harmless() {
        let fake = Arc::new(FakeAppearance::new(false));
        let mut scheduler = scheduler_for(&fake, MemoryStore::new(), 12);
        scheduler.stop();
        scheduler.stop();
        assert!(!scheduler.is_running());
    }

    #[test]
    fn test_start_is_idempotent_and_restartable() {
        let fake = Arc::new(FakeAppearance::new(false));
        let mut scheduler = scheduler_for(&fake, MemoryStore::new(), 12);

        scheduler.start().unwrap();
        scheduler.start().unwrap();
        assert!(scheduler.is_running());
        assert!(wait_until(|| fake.warm_up_count() == 1));

        scheduler.stop();
        assert!(!scheduler.is_running());

        scheduler.start().unwrap();
        assert!(wait_until(|| fake.warm_up_count() == 2));
        scheduler.stop();
    }

    #[test]
    fn test_loop_converges_to_schedule() {
        let fake = Arc::new(FakeAppearance::new(false));
        let store = MemoryStore::new().with(KEY_SCHEDULE_ENABLED, SettingValue::Bool(true));
        let mut scheduler = scheduler_for(&fake, store, 22);

        scheduler.start().unwrap();
        assert!(wait_until(|| fake.is_dark()));
        // Several more ticks pass without further requests
        thread::sleep(Duration::from_millis(100));
        scheduler.stop();
        assert_eq!(fake.requests(), vec![true]);
    }

    #[test]
    fn test_update_setting_persists_and_reconciles() {
        let fake = Arc::new(FakeAppearance::new(false));
        let store = MemoryStore::new();
        let mut scheduler = scheduler_for(&fake, store.clone(), 22);
        let handle = scheduler.handle();

        scheduler.start().unwrap();
        handle
            .update_setting(SettingKey::ScheduleEnabled, SettingValue::Bool(true))
            .unwrap();
        assert!(wait_until(|| fake.is_dark()));
        scheduler.stop();

        assert_eq!(
            store.snapshot().get(KEY_SCHEDULE_ENABLED),
            Some(&SettingValue::Bool(true))
        );
    }

    #[test]
    fn test_handle_survives_restart() {
        let fake = Arc::new(FakeAppearance::new(false));
        let mut scheduler = scheduler_for(&fake, MemoryStore::new(), 12);
        let handle = scheduler.handle();

        scheduler.start().unwrap();
        handle.toggle().unwrap();
        assert!(wait_until(|| fake.is_dark()));
        scheduler.stop();

        scheduler.start().unwrap();
        handle.set_dark(false).unwrap();
        assert!(wait_until(|| !fake.is_dark()));
        scheduler.stop();
    }
}
