//! In-memory appearance backend for tests.

use anyhow::Result;
use std::sync::Mutex;

use super::{AppearancePort, CompletionCallback};

/// What [`FakeAppearance`] does with a change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeBehavior {
    /// Apply the change and complete immediately
    Apply,
    /// Complete immediately without changing anything, like a denied permission
    Ignore,
    /// Keep the request outstanding until [`FakeAppearance::release_held`]
    Hold,
}

struct FakeState {
    is_dark: bool,
    behavior: FakeBehavior,
    read_fails: bool,
    requests: Vec<bool>,
    held: Vec<(bool, CompletionCallback)>,
    warm_ups: usize,
}

/// Appearance port backed by a single boolean.
///
/// Completion callbacks run synchronously on the requesting thread, after the
/// internal lock has been released.
pub struct FakeAppearance {
    state: Mutex<FakeState>,
}

impl FakeAppearance {
    pub fn new(is_dark: bool) -> Self {
        Self {
            state: Mutex::new(FakeState {
                is_dark,
                behavior: FakeBehavior::Apply,
                read_fails: false,
                requests: Vec::new(),
                held: Vec::new(),
                warm_ups: 0,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Change the mode out of band, as the user would from system settings.
    pub fn set_dark(&self, is_dark: bool) {
        self.lock().is_dark = is_dark;
    }

    pub fn is_dark(&self) -> bool {
        self.lock().is_dark
    }

    pub fn set_behavior(&self, behavior: FakeBehavior) {
        self.lock().behavior = behavior;
    }

    /// Make every subsequent read fail until called again with `false`.
    pub fn fail_reads(&self, fail: bool) {
        self.lock().read_fails = fail;
    }

    /// Target of every change request received so far, in order.
    pub fn requests(&self) -> Vec<bool> {
        self.lock().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    pub fn warm_up_count(&self) -> usize {
        self.lock().warm_ups
    }

    /// Apply and complete every held request. Returns how many were released.
    pub fn release_held(&self) -> usize {
        let held = {
            let mut state = self.lock();
            let held = std::mem::take(&mut state.held);
            if let Some((target, _)) = held.last() {
                state.is_dark = *target;
            }
            held
        };
        let released = held.len();
        for (_, callback) in held {
            callback();
        }
        released
    }
}

impl AppearancePort for FakeAppearance {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn read(&self) -> Result<bool> {
        let state = self.lock();
        if state.read_fails {
            anyhow::bail!("simulated read failure");
        }
        Ok(state.is_dark)
    }

    fn request_change(&self, target_dark: bool, on_complete: CompletionCallback) {
        let complete_now = {
            let mut state = self.lock();
            state.requests.push(target_dark);
            match state.behavior {
                FakeBehavior::Apply => {
                    state.is_dark = target_dark;
                    Some(on_complete)
                }
                FakeBehavior::Ignore => Some(on_complete),
                FakeBehavior::Hold => {
                    state.held.push((target_dark, on_complete));
                    None
                }
            }
        };
        if let Some(callback) = complete_now {
            callback();
        }
    }

    fn warm_up(&self) {
        self.lock().warm_ups += 1;
    }
}
