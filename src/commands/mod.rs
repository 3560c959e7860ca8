//! Command-line command handlers for switchr.
//!
//! Each one-shot command lives in its own submodule together with its
//! `display_help`. Commands that change the appearance run the manual override
//! in this process and wait for the external command to finish before exiting.

pub mod get;
pub mod help;
pub mod mode;
pub mod set;
pub mod status;

use std::sync::mpsc::Receiver;
use std::time::Duration;

use crate::events::AppearanceEvent;

/// Block until a change event arrives or `timeout` elapses.
///
/// Returns `false` on timeout or when every publisher is gone.
pub fn wait_for_completion(rx: &Receiver<AppearanceEvent>, timeout: Duration) -> bool {
    matches!(rx.recv_timeout(timeout), Ok(AppearanceEvent::Changed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;

    #[test]
    fn test_wait_for_completion_sees_event() {
        let bus = EventBus::new();
        let rx = bus.subscribe();
        let publisher = bus.clone();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            publisher.publish(AppearanceEvent::Changed);
        });
        assert!(wait_for_completion(&rx, Duration::from_secs(5)));
    }

    #[test]
    fn test_wait_for_completion_times_out() {
        let bus = EventBus::new();
        let rx = bus.subscribe();
        assert!(!wait_for_completion(&rx, Duration::from_millis(20)));
    }
}
