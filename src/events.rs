//! Appearance change notifications.
//!
//! The core publishes a single payload-free event after an appearance change
//! request completes. Subscribers (a status bar, a log, a waiting CLI
//! command) must re-query the port themselves to learn the new mode.

use serde::Serialize;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Arc, Mutex};

/// Events broadcast by the scheduler and manual overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum AppearanceEvent {
    /// An external change request finished; the appearance may have changed.
    Changed,
}

/// Fan-out channel for [`AppearanceEvent`]s.
///
/// Cloning shares the subscriber list. Publishing with no subscribers, or
/// after every subscriber has gone away, is a no-op; dead subscribers are
/// pruned on the next publish.
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<Sender<AppearanceEvent>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber.
    pub fn subscribe(&self) -> Receiver<AppearanceEvent> {
        let (tx, rx) = channel();
        self.lock().push(tx);
        rx
    }

    /// Deliver an event to every live subscriber, returning how many received it.
    pub fn publish(&self, event: AppearanceEvent) -> usize {
        let mut subscribers = self.lock();
        subscribers.retain(|tx| tx.send(event).is_ok());
        subscribers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Sender<AppearanceEvent>>> {
        self.subscribers.lock().unwrap_or_else(|e| e.into_inner())
    }
}
