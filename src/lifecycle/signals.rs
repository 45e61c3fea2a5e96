//! OS signal handling.
//!
//! SIGINT (and SIGTERM on Unix) trigger graceful shutdown. A second signal
//! while draining exits immediately with status 1.

use std::io;

use tokio::task::JoinHandle;

use crate::lifecycle::Shutdown;

/// Installed shutdown signal handlers.
pub struct Signals {
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
}

impl Signals {
    /// Register handlers now, so a signal arriving before the first `recv`
    /// is not lost to the default disposition.
    pub fn install() -> io::Result<Self> {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            Ok(Self {
                terminate: signal(SignalKind::terminate())?,
            })
        }

        #[cfg(not(unix))]
        {
            Ok(Self {})
        }
    }

    /// Wait for the next interrupt or terminate signal.
    pub async fn recv(&mut self) -> io::Result<&'static str> {
        #[cfg(unix)]
        {
            tokio::select! {
                res = tokio::signal::ctrl_c() => res.map(|_| "SIGINT"),
                _ = self.terminate.recv() => Ok("SIGTERM"),
            }
        }

        #[cfg(not(unix))]
        {
            tokio::signal::ctrl_c().await.map(|_| "ctrl-c")
        }
    }
}

/// Install handlers and spawn a task that triggers `shutdown` on the first
/// signal and forces the process out on the second.
pub fn spawn_signal_listener(shutdown: Shutdown) -> io::Result<JoinHandle<()>> {
    let mut signals = Signals::install()?;

    Ok(tokio::spawn(async move {
        match signals.recv().await {
            Ok(name) => {
                tracing::info!(signal = name, pid = std::process::id(), "Shutdown signal received");
                shutdown.trigger();
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for signals");
                return;
            }
        }

        if let Ok(name) = signals.recv().await {
            tracing::warn!(signal = name, "Second signal received, exiting immediately");
            std::process::exit(1);
        }
    }))
}
