//! Unix signal handling for the daemon.
//!
//! Signals are received on a dedicated thread and forwarded to the main loop
//! as [`AppSignal`] messages:
//!
//! - `SIGINT`, `SIGTERM`, `SIGHUP`: stop the scheduler and exit
//! - `SIGUSR1`: toggle the current mode
//! - `SIGUSR2`: reload `settings.toml`
//!
//! One-shot commands use [`send_to_instance`] to reach a running daemon.

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGTERM, SIGUSR1, SIGUSR2},
    iterator::Signals,
};
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use std::sync::mpsc::{Receiver, channel};
use std::thread;

/// Application-level meaning of a received signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppSignal {
    Shutdown,
    Toggle,
    Reload,
}

/// Map a raw signal number to its application meaning.
pub fn classify(signal: i32) -> Option<AppSignal> {
    match signal {
        SIGINT | SIGTERM | SIGHUP => Some(AppSignal::Shutdown),
        SIGUSR1 => Some(AppSignal::Toggle),
        SIGUSR2 => Some(AppSignal::Reload),
        _ => None,
    }
}

fn describe(signal: i32) -> &'static str {
    match signal {
        SIGINT => "interrupt signal",
        SIGTERM => "termination request",
        SIGHUP => "hangup signal",
        SIGUSR1 => "toggle request (SIGUSR1)",
        SIGUSR2 => "reload request (SIGUSR2)",
        _ => "unknown signal",
    }
}

fn signal_for(signal: AppSignal) -> Signal {
    match signal {
        AppSignal::Shutdown => Signal::SIGTERM,
        AppSignal::Toggle => Signal::SIGUSR1,
        AppSignal::Reload => Signal::SIGUSR2,
    }
}

/// Deliver `signal` to the running instance with the given PID.
pub fn send_to_instance(pid: u32, signal: AppSignal) -> Result<()> {
    let sig = signal_for(signal);
    let raw = i32::try_from(pid).with_context(|| format!("Invalid PID {pid}"))?;
    kill(Pid::from_raw(raw), sig)
        .with_context(|| format!("Failed to send {} to PID {pid}", sig.as_str()))
}

/// Register handlers and start the signal thread.
///
/// The thread exits after forwarding a shutdown, or once the receiver is gone.
pub fn setup_signal_handler(debug_enabled: bool) -> Result<Receiver<AppSignal>> {
    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP, SIGUSR1, SIGUSR2])
        .context("Failed to register signal handlers")?;
    let (tx, rx) = channel();

    thread::Builder::new()
        .name("switchr-signals".to_string())
        .spawn(move || {
            for sig in signals.forever() {
                let Some(message) = classify(sig) else {
                    continue;
                };

                log_pipe!();
                if message == AppSignal::Shutdown {
                    log_info!("Received {}, shutting down...", describe(sig));
                } else if debug_enabled {
                    log_debug!("Received {}", describe(sig));
                }

                if tx.send(message).is_err() || message == AppSignal::Shutdown {
                    break;
                }
            }
        })
        .context("Failed to spawn signal thread")?;

    Ok(rx)
}
