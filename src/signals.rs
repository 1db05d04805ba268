//! Signal-to-flag adapter.
//!
//! Translates process signals into [`SupervisorHandle`] calls:
//!
//! - `SIGHUP` reloads configuration, appending to existing files
//! - `SIGUSR1` reloads configuration and truncates the target files
//! - `SIGINT` / `SIGTERM` stop gracefully; a second one exits immediately

use crate::supervisor::SupervisorHandle;
use anyhow::Result;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Exit status used when a second stop signal forces an immediate exit.
const FORCED_EXIT_CODE: i32 = 130;

/// A process signal the generator reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Hangup,
    User1,
    Interrupt,
    Terminate,
    CtrlC,
}

impl Signal {
    pub fn name(self) -> &'static str {
        match self {
            Signal::Hangup => "SIGHUP",
            Signal::User1 => "SIGUSR1",
            Signal::Interrupt => "SIGINT",
            Signal::Terminate => "SIGTERM",
            Signal::CtrlC => "Ctrl-C",
        }
    }
}

/// Apply one received signal to the supervisor.
///
/// A stop signal arriving after a stop was already requested exits the
/// process immediately.
pub fn dispatch(handle: &SupervisorHandle, signal: Signal) {
    match signal {
        Signal::Hangup => {
            info!("Receiving SIGHUP, reloading config...");
            handle.trigger_reload();
        }
        Signal::User1 => {
            info!("Receiving SIGUSR1, reloading config and truncating files...");
            handle.trigger_truncating_reload();
        }
        Signal::Interrupt | Signal::Terminate | Signal::CtrlC => {
            if handle.is_running() {
                warn!("Receiving {}, exiting...", signal.name());
                handle.trigger_stop();
            } else {
                error!("Receiving {} again, exiting immediately", signal.name());
                std::process::exit(FORCED_EXIT_CODE);
            }
        }
    }
}

#[cfg(unix)]
pub fn install(handle: SupervisorHandle) -> Result<JoinHandle<()>> {
    use anyhow::Context;
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = signal(SignalKind::hangup()).context("Failed to install SIGHUP handler")?;
    let mut user1 =
        signal(SignalKind::user_defined1()).context("Failed to install SIGUSR1 handler")?;
    let mut interrupt =
        signal(SignalKind::interrupt()).context("Failed to install SIGINT handler")?;
    let mut terminate =
        signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;

    Ok(tokio::spawn(async move {
        loop {
            let received = tokio::select! {
                Some(()) = hangup.recv() => Signal::Hangup,
                Some(()) = user1.recv() => Signal::User1,
                Some(()) = interrupt.recv() => Signal::Interrupt,
                Some(()) = terminate.recv() => Signal::Terminate,
                else => break,
            };
            dispatch(&handle, received);
        }
    }))
}

#[cfg(not(unix))]
pub fn install(handle: SupervisorHandle) -> Result<JoinHandle<()>> {
    Ok(tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            dispatch(&handle, Signal::CtrlC);
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::supervisor::Supervisor;

    fn idle_handle() -> SupervisorHandle {
        let supervisor = Supervisor::new("/nonexistent", false);
        let handle = supervisor.handle();
        // The supervisor starts with a load pending; clear it by hand
        handle.clear_reload_for_test();
        handle
    }

    #[test]
    fn test_hangup_reloads_without_truncate() {
        let handle = idle_handle();
        dispatch(&handle, Signal::Hangup);

        assert!(handle.reload_requested());
        assert!(!handle.truncate_requested());
        assert!(handle.is_running());
    }

    #[test]
    fn test_user1_requests_truncating_reload() {
        let handle = idle_handle();
        dispatch(&handle, Signal::User1);

        assert!(handle.reload_requested());
        assert!(handle.truncate_requested());
        assert!(handle.is_running());
    }

    #[test]
    fn test_first_stop_signal_stops_gracefully() {
        for signal in [Signal::Interrupt, Signal::Terminate, Signal::CtrlC] {
            let handle = idle_handle();
            dispatch(&handle, signal);

            assert!(!handle.is_running(), "{} did not stop", signal.name());
            assert!(!handle.reload_requested());
        }
    }
}
